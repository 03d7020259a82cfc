use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

/// Scenario file for repeatable harness runs. Every field is optional; CLI
/// flags override anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub harness: Option<HarnessSection>,
    pub cluster: Option<ClusterSection>,
    pub package: Option<PackageSection>,
    pub timeouts: Option<TimeoutSection>,
    pub options: Option<OptionsSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessSection {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSection {
    pub url: Option<String>,
    pub cli_bin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    pub name: Option<String>,
    pub service: Option<String>,
    pub expected_running_tasks: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSection {
    pub deployment_seconds: Option<u64>,
    pub wait_for_deployment: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsSection {
    /// Path to the JSON options document for the release install.
    pub install_file: Option<String>,
    /// Path to a separate options document for the test-version step.
    pub version_install_file: Option<String>,
}

impl TomlConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
