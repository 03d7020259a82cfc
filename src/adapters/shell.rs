use crate::domain::ports::{CliOutput, ClusterCli};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::process::Command;

/// Runs the platform CLI binary (`dcos` by default) as a child process.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    program: String,
}

impl ShellRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("dcos")
    }
}

#[async_trait]
impl ClusterCli for ShellRunner {
    async fn run(&self, args: &[&str]) -> Result<CliOutput> {
        tracing::debug!("Running `{} {}`", self.program, args.join(" "));

        let output = Command::new(&self.program).args(args).output().await?;

        let result = CliOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            tracing::debug!(
                "`{} {}` exited with code {}: {}",
                self.program,
                args.join(" "),
                result.code,
                result.stderr.trim()
            );
        }

        Ok(result)
    }
}
