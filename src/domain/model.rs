use serde::{Deserialize, Serialize};

/// One entry of `package repo list --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRepo {
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoList {
    pub repositories: Vec<PackageRepo>,
}

/// Output of `package describe`. Newer CLIs nest the version under
/// `package.version`; older ones expose a top-level `version`.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDescription {
    #[serde(default)]
    pub package: Option<PackageInfo>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageDescription {
    pub fn version(&self) -> Option<&str> {
        self.package
            .as_ref()
            .and_then(|p| p.version.as_deref())
            .or(self.version.as_deref())
    }
}

/// One entry of `task --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl TaskInfo {
    pub fn is_running(&self) -> bool {
        self.state.as_deref() == Some("TASK_RUNNING")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Complete,
    InProgress,
    Starting,
    Waiting,
    Pending,
    Error,
    #[serde(other)]
    Unknown,
}

/// Scheduler deployment plan, as served at `/v1/plans/deploy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub status: PlanStatus,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub status: PlanStatus,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub status: PlanStatus,
}

impl Plan {
    /// Short human-readable progress line for the wait loop.
    pub fn progress(&self) -> String {
        let done = self
            .phases
            .iter()
            .filter(|p| p.status == PlanStatus::Complete)
            .count();
        format!("{:?} ({}/{} phases complete)", self.status, done, self.phases.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterVariant {
    Open,
    Enterprise,
}

/// Output of `cluster info --json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    pub version: String,
    #[serde(default = "ClusterInfo::default_variant")]
    pub variant: ClusterVariant,
}

impl ClusterInfo {
    fn default_variant() -> ClusterVariant {
        ClusterVariant::Open
    }
}

/// Active service configuration as reported by `debug config target`.
/// Compared structurally to decide whether an update should restart tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig(pub serde_json::Value);

/// Metadata file written into the distributable bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub package: String,
    pub version: String,
    pub entry_point: String,
    pub artifact: String,
    pub config: String,
    pub built_at: String,
}
