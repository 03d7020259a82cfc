use crate::core::run_checked;
use crate::domain::model::PackageDescription;
use crate::domain::ports::ClusterCli;
use crate::utils::error::Result;
use crate::utils::retry::{self, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;

/// Package catalog operations: version discovery and CLI subcommand installs.
pub struct PackageManager<C> {
    cli: Arc<C>,
}

impl<C: ClusterCli> PackageManager<C> {
    pub fn new(cli: Arc<C>) -> Self {
        Self { cli }
    }

    /// Returns the version the catalog currently resolves `package` to.
    /// Transient describe failures are retried for a short window because the
    /// catalog needs a moment to settle after repo changes.
    pub async fn version(&self, package: &str) -> Result<String> {
        let policy = RetryPolicy::new(Duration::from_secs(1), Duration::from_secs(10));
        let cli = &*self.cli;

        retry::poll(
            &format!("version of package {}", package),
            policy,
            move || async move {
                let args = ["package", "describe", package];
                // Only surface output when something goes wrong.
                let output = match cli.run(&args).await {
                    Ok(output) => output,
                    Err(e) => {
                        tracing::warn!("`package describe {}` failed to run: {}", package, e);
                        return Ok(None);
                    }
                };

                if !output.success() {
                    tracing::warn!(
                        "`package describe {}` exited {}:\nSTDOUT:\n{}\nSTDERR:\n{}",
                        package,
                        output.code,
                        output.stdout,
                        output.stderr
                    );
                    return Ok(None);
                }

                match serde_json::from_str::<PackageDescription>(&output.stdout) {
                    Ok(describe) => match describe.version() {
                        Some(version) => Ok(Some(version.to_string())),
                        None => {
                            tracing::warn!(
                                "No version field in `package describe {}` output: {}",
                                package,
                                output.stdout
                            );
                            Ok(None)
                        }
                    },
                    Err(e) => {
                        tracing::warn!(
                            "Failed to parse `package describe {}` output: {}\n{}",
                            package,
                            e,
                            output.stdout
                        );
                        Ok(None)
                    }
                }
            },
        )
        .await
    }

    /// Polls until the catalog reports a version different from `prev`.
    /// Repo reordering takes effect asynchronously.
    pub async fn wait_for_new_version(&self, package: &str, prev: &str) -> Result<String> {
        let policy = RetryPolicy::new(Duration::from_secs(1), Duration::from_secs(60));
        let mgr = self;

        retry::poll(
            &format!("version of {} to change from {}", package, prev),
            policy,
            move || async move {
                match mgr.version(package).await {
                    Ok(current) => {
                        tracing::info!("Current version of {} is: {}", package, current);
                        if current != prev {
                            Ok(Some(current))
                        } else {
                            Ok(None)
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Could not determine version of {}: {}", package, e);
                        Ok(None)
                    }
                }
            },
        )
        .await
    }

    /// Installs the package's CLI subcommand. The update flow has to do this
    /// manually after a version change; the main CLI will not replace a
    /// package CLI on its own.
    pub async fn install_cli(&self, package: &str, version: Option<&str>) -> Result<()> {
        let version_arg;
        let mut args = vec!["package", "install", "--cli", "--yes"];
        if let Some(version) = version {
            version_arg = format!("--package-version={}", version);
            args.push(&version_arg);
        }
        args.push(package);

        run_checked(&*self.cli, &args).await?;
        Ok(())
    }
}
