use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Command `{command}` exited with code {code}: {stderr}")]
    CommandError {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Unexpected output from `{command}`: {reason}")]
    UnexpectedOutputError { command: String, reason: String },

    #[error("Timed out after {elapsed_secs}s waiting for {waiting_for}")]
    TimeoutError {
        waiting_for: String,
        elapsed_secs: u64,
    },

    #[error("Plan '{plan}' reached status {status}")]
    PlanError { plan: String, status: String },

    #[error("Deployment check failed for service '{service}': {reason}")]
    DeploymentCheckError { service: String, reason: String },

    #[error("Repository '{name}' not found in the package repo list")]
    RepoNotFoundError { name: String },

    #[error("Operation not supported by this cluster: {message}")]
    UnsupportedError { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Cluster,
    Deployment,
    Packaging,
    System,
}

impl HarnessError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HarnessError::MissingConfigError { .. }
            | HarnessError::InvalidConfigValueError { .. }
            | HarnessError::ConfigError { .. }
            | HarnessError::UnsupportedError { .. } => ErrorCategory::Config,
            HarnessError::CommandError { .. }
            | HarnessError::UnexpectedOutputError { .. }
            | HarnessError::HttpError(_)
            | HarnessError::RepoNotFoundError { .. } => ErrorCategory::Cluster,
            HarnessError::TimeoutError { .. }
            | HarnessError::PlanError { .. }
            | HarnessError::DeploymentCheckError { .. } => ErrorCategory::Deployment,
            HarnessError::ZipError(_) => ErrorCategory::Packaging,
            HarnessError::IoError(_)
            | HarnessError::SerializationError(_)
            | HarnessError::TomlError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HarnessError::MissingConfigError { .. }
            | HarnessError::InvalidConfigValueError { .. }
            | HarnessError::ConfigError { .. }
            | HarnessError::UnsupportedError { .. } => ErrorSeverity::Critical,
            HarnessError::CommandError { .. } | HarnessError::HttpError(_) => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HarnessError::CommandError { command, code, .. } => {
                format!(
                    "The cluster CLI command `{}` failed (exit code {})",
                    command, code
                )
            }
            HarnessError::TimeoutError {
                waiting_for,
                elapsed_secs,
            } => {
                format!("Gave up waiting for {} after {}s", waiting_for, elapsed_secs)
            }
            HarnessError::PlanError { plan, status } => {
                format!("The '{}' plan ended in status {}", plan, status)
            }
            HarnessError::RepoNotFoundError { name } => {
                format!(
                    "The package repository '{}' is not configured on this cluster",
                    name
                )
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Config => {
                "Check the CLI flags and scenario file for typos or missing fields".to_string()
            }
            ErrorCategory::Cluster => {
                "Verify the cluster is reachable and the platform CLI is authenticated".to_string()
            }
            ErrorCategory::Deployment => {
                "Inspect the scheduler logs and the deploy plan, then re-run the harness"
                    .to_string()
            }
            ErrorCategory::Packaging => {
                "Confirm the artifact and configuration paths point at readable files".to_string()
            }
            ErrorCategory::System => "Check disk space and file permissions, then retry".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
