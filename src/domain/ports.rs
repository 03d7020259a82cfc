use crate::utils::error::{HarnessError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Captured result of one platform CLI invocation.
#[derive(Debug, Clone)]
pub struct CliOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn require_success(self, command: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(HarnessError::CommandError {
                command: command.to_string(),
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

/// Seam to the platform CLI. Production uses a spawned process; tests script
/// the outputs.
#[async_trait]
pub trait ClusterCli: Send + Sync {
    async fn run(&self, args: &[&str]) -> Result<CliOutput>;
}

/// Output sink for produced artifacts. The bundle flow only ever writes.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn package_name(&self) -> &str;
    fn service_name(&self) -> &str;
    fn cluster_url(&self) -> &str;
    fn expected_running_tasks(&self) -> usize;
    fn timeout(&self) -> Duration;
    fn wait_for_deployment(&self) -> bool;
    fn install_options(&self) -> Option<&serde_json::Value>;
    /// Options for the test-version step; falls back to `install_options`
    /// when unset.
    fn version_options(&self) -> Option<&serde_json::Value> {
        self.install_options()
    }
}

#[async_trait]
pub trait Workflow: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> Result<String>;
}
