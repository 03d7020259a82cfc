#[cfg(feature = "cli")]
pub mod bundle;
pub mod toml_config;

use crate::core::DEPLOYMENT_TIMEOUT_SECONDS;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{HarnessError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_package_name, validate_positive_number, validate_range,
    validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(about = "Install/upgrade test harness for cluster-managed service packages")]
pub struct CliConfig {
    #[arg(long, help = "Package to exercise; required here or in the scenario file")]
    pub package: Option<String>,

    #[arg(long, help = "Service name; defaults to the package name")]
    pub service: Option<String>,

    #[arg(long, help = "Cluster base URL used for scheduler plan polling")]
    pub cluster_url: Option<String>,

    #[arg(long, help = "Platform CLI binary to drive")]
    pub cli_bin: Option<String>,

    #[arg(long)]
    pub expected_running_tasks: Option<usize>,

    #[arg(long, help = "JSON options document for the release install")]
    pub options_file: Option<String>,

    #[arg(long, help = "Separate JSON options document for the test-version step")]
    pub version_options_file: Option<String>,

    #[arg(long, help = "Deployment budget per step, in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Skip waiting for deployments after each step")]
    pub no_wait: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process cpu/memory usage during long waits")]
    pub monitor: bool,

    #[arg(long, help = "TOML scenario file; CLI flags override its values")]
    pub config: Option<String>,
}

/// Fully resolved harness configuration: CLI flags over scenario file over
/// defaults.
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub package: String,
    pub service: String,
    pub cluster_url: String,
    pub cli_bin: String,
    pub expected_running_tasks: usize,
    pub timeout: Duration,
    pub wait_for_deployment: bool,
    pub install_options: Option<serde_json::Value>,
    pub version_options: Option<serde_json::Value>,
    pub verbose: bool,
    pub monitor: bool,
}

impl HarnessSettings {
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        let file_cluster = file.cluster.as_ref();
        let file_package = file.package.as_ref();
        let file_timeouts = file.timeouts.as_ref();
        let file_options = file.options.as_ref();

        let package = cli
            .package
            .clone()
            .or_else(|| file_package.and_then(|p| p.name.clone()))
            .ok_or_else(|| HarnessError::MissingConfigError {
                field: "package".to_string(),
            })?;

        let service = cli
            .service
            .clone()
            .or_else(|| file_package.and_then(|p| p.service.clone()))
            .unwrap_or_else(|| package.clone());

        let install_options_path = cli
            .options_file
            .clone()
            .or_else(|| file_options.and_then(|o| o.install_file.clone()));
        let version_options_path = cli
            .version_options_file
            .clone()
            .or_else(|| file_options.and_then(|o| o.version_install_file.clone()));

        let settings = Self {
            package,
            service,
            cluster_url: cli
                .cluster_url
                .clone()
                .or_else(|| file_cluster.and_then(|c| c.url.clone()))
                .unwrap_or_else(|| "http://127.0.0.1".to_string()),
            cli_bin: cli
                .cli_bin
                .clone()
                .or_else(|| file_cluster.and_then(|c| c.cli_bin.clone()))
                .unwrap_or_else(|| "dcos".to_string()),
            expected_running_tasks: cli
                .expected_running_tasks
                .or_else(|| file_package.and_then(|p| p.expected_running_tasks))
                .unwrap_or(1),
            timeout: Duration::from_secs(
                cli.timeout_seconds
                    .or_else(|| file_timeouts.and_then(|t| t.deployment_seconds))
                    .unwrap_or(DEPLOYMENT_TIMEOUT_SECONDS),
            ),
            wait_for_deployment: if cli.no_wait {
                false
            } else {
                file_timeouts
                    .and_then(|t| t.wait_for_deployment)
                    .unwrap_or(true)
            },
            install_options: install_options_path
                .map(|path| load_options_document(&path))
                .transpose()?,
            version_options: version_options_path
                .map(|path| load_options_document(&path))
                .transpose()?,
            verbose: cli.verbose,
            monitor: cli.monitor,
        };
        Ok(settings)
    }
}

fn load_options_document(path: &str) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| HarnessError::InvalidConfigValueError {
            field: "options_file".to_string(),
            value: path.to_string(),
            reason: format!("Not a valid JSON document: {}", e),
        })?;
    if !value.is_object() {
        return Err(HarnessError::InvalidConfigValueError {
            field: "options_file".to_string(),
            value: path.to_string(),
            reason: "Options document must be a JSON object".to_string(),
        });
    }
    Ok(value)
}

impl ConfigProvider for HarnessSettings {
    fn package_name(&self) -> &str {
        &self.package
    }

    fn service_name(&self) -> &str {
        &self.service
    }

    fn cluster_url(&self) -> &str {
        &self.cluster_url
    }

    fn expected_running_tasks(&self) -> usize {
        self.expected_running_tasks
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn wait_for_deployment(&self) -> bool {
        self.wait_for_deployment
    }

    fn install_options(&self) -> Option<&serde_json::Value> {
        self.install_options.as_ref()
    }

    fn version_options(&self) -> Option<&serde_json::Value> {
        self.version_options
            .as_ref()
            .or(self.install_options.as_ref())
    }
}

impl Validate for HarnessSettings {
    fn validate(&self) -> Result<()> {
        validate_package_name("package", &self.package)?;
        validate_package_name("service", &self.service)?;
        validate_url("cluster_url", &self.cluster_url)?;
        validate_non_empty_string("cli_bin", &self.cli_bin)?;
        validate_positive_number("expected_running_tasks", self.expected_running_tasks, 1)?;
        validate_range("timeout_seconds", self.timeout.as_secs(), 1, 86_400)?;
        Ok(())
    }
}
