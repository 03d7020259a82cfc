use crate::core::run_checked;
use crate::domain::model::{TargetConfig, TaskInfo};
use crate::domain::ports::{CliOutput, ClusterCli};
use crate::utils::error::{HarnessError, Result};
use crate::utils::retry::{self, RetryPolicy};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Service lifecycle operations driven through the platform CLI: install,
/// uninstall, task snapshots, and target-config queries.
pub struct ServiceManager<C> {
    cli: Arc<C>,
}

/// Parameters for one service install.
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    pub package: &'a str,
    pub service: &'a str,
    pub version: Option<&'a str>,
    pub options: Option<&'a serde_json::Value>,
}

impl<C: ClusterCli> ServiceManager<C> {
    pub fn new(cli: Arc<C>) -> Self {
        Self { cli }
    }

    /// Runs a service-scoped CLI subcommand (`<package> --name=<service> ...`).
    /// The caller decides how to treat a nonzero exit.
    pub async fn run_svc(
        &self,
        package: &str,
        service: &str,
        tail: &[&str],
    ) -> Result<CliOutput> {
        let name_arg = format!("--name={}", service);
        let mut args = vec![package, name_arg.as_str()];
        args.extend_from_slice(tail);
        self.cli.run(&args).await
    }

    /// Installs the service. The service name is always injected into the
    /// options document so the scheduler registers under the expected name.
    pub async fn install(&self, req: &InstallRequest<'_>) -> Result<()> {
        let options = merged_options(req.options, req.service)?;
        let options_file = options_tempfile(&options)?;
        let options_arg = format!("--options={}", options_file.path().display());

        let version_arg;
        let mut args = vec!["package", "install", req.package, "--app", "--yes"];
        args.push(&options_arg);
        if let Some(version) = req.version {
            version_arg = format!("--package-version={}", version);
            args.push(&version_arg);
        }

        tracing::info!(
            "Installing {}={} as service '{}'",
            req.package,
            req.version.unwrap_or("<default>"),
            req.service
        );
        run_checked(&*self.cli, &args).await?;
        Ok(())
    }

    /// Removes the service. A service that was never installed is not an
    /// error; the upgrade flow uninstalls defensively before starting.
    pub async fn uninstall(&self, package: &str, service: &str) -> Result<()> {
        let app_id_arg = format!("--app-id={}", service);
        let args = ["package", "uninstall", package, app_id_arg.as_str(), "--yes"];
        let output = self.cli.run(&args).await?;

        if output.success() {
            tracing::info!("Uninstalled {} (service '{}')", package, service);
            return Ok(());
        }
        if output.stderr.to_lowercase().contains("not installed") {
            tracing::debug!("{} was not installed, nothing to remove", package);
            return Ok(());
        }
        Err(HarnessError::CommandError {
            command: args.join(" "),
            code: output.code,
            stderr: output.stderr,
        })
    }

    /// Tears down the scheduler app directly. Used by the fallback update
    /// path on clusters whose CLI cannot update in place.
    pub async fn destroy_app(&self, service: &str) -> Result<()> {
        run_checked(&*self.cli, &["marathon", "app", "remove", service]).await?;
        Ok(())
    }

    /// IDs of the service's tasks whose names contain `prefix`. An empty
    /// prefix selects every task of the service.
    pub async fn task_ids(&self, service: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .tasks(service)
            .await?
            .into_iter()
            .filter(|t| t.name.contains(prefix))
            .map(|t| t.id)
            .collect())
    }

    async fn tasks(&self, service: &str) -> Result<Vec<TaskInfo>> {
        let output = run_checked(&*self.cli, &["task", "--json"]).await?;
        let all: Vec<TaskInfo> = serde_json::from_str(&output.stdout)?;
        Ok(all
            .into_iter()
            .filter(|t| t.name.starts_with(service))
            .collect())
    }

    /// Waits until the expected number of service tasks report running.
    pub async fn wait_for_task_count(
        &self,
        service: &str,
        expected: usize,
        timeout: Duration,
    ) -> Result<()> {
        let policy = RetryPolicy::new(Duration::from_secs(5), timeout);
        let mgr = self;

        retry::poll(
            &format!("{} running task(s) for service '{}'", expected, service),
            policy,
            move || async move {
                match mgr.tasks(service).await {
                    Ok(tasks) => {
                        let running = tasks.iter().filter(|t| t.is_running()).count();
                        tracing::debug!(
                            "Service '{}' has {}/{} running task(s)",
                            service,
                            running,
                            expected
                        );
                        Ok(if running >= expected { Some(()) } else { None })
                    }
                    Err(e) => {
                        tracing::warn!("Task listing failed for '{}': {}", service, e);
                        Ok(None)
                    }
                }
            },
        )
        .await
    }

    /// Waits until none of the snapshotted task IDs are still present,
    /// proving every old task was replaced.
    pub async fn check_tasks_updated(
        &self,
        service: &str,
        prefix: &str,
        old_ids: &[String],
        timeout: Duration,
    ) -> Result<()> {
        let policy = RetryPolicy::new(Duration::from_secs(5), timeout);
        let mgr = self;

        retry::poll(
            &format!("tasks of '{}' to be replaced", service),
            policy,
            move || async move {
                let current = match mgr.task_ids(service, prefix).await {
                    Ok(ids) => ids,
                    Err(e) => {
                        tracing::warn!("Task listing failed for '{}': {}", service, e);
                        return Ok(None);
                    }
                };
                let stale = current.iter().filter(|id| old_ids.contains(id)).count();
                if stale == 0 && !current.is_empty() {
                    Ok(Some(()))
                } else {
                    tracing::debug!(
                        "Service '{}': {} stale task(s), {} total",
                        service,
                        stale,
                        current.len()
                    );
                    Ok(None)
                }
            },
        )
        .await
    }

    /// Verifies the snapshotted tasks are all still present, proving a no-op
    /// update did not bounce anything.
    pub async fn check_tasks_not_updated(
        &self,
        service: &str,
        prefix: &str,
        old_ids: &[String],
    ) -> Result<()> {
        let current = self.task_ids(service, prefix).await?;
        let missing: Vec<&String> = old_ids.iter().filter(|id| !current.contains(id)).collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::DeploymentCheckError {
                service: service.to_string(),
                reason: format!(
                    "{} task(s) were restarted without a config change: {:?}",
                    missing.len(),
                    missing
                ),
            })
        }
    }

    /// Fetches the scheduler's active target configuration. Retried at the
    /// upstream cadence (10s interval, 15 attempts) because the scheduler may
    /// still be coming up. The config body is kept out of the logs.
    pub async fn target_config(&self, package: &str, service: &str) -> Result<TargetConfig> {
        let policy = RetryPolicy::new(Duration::from_secs(10), Duration::from_secs(150));
        let mgr = self;

        retry::poll(
            &format!("target config of '{}'", service),
            policy,
            move || async move {
                let output = match mgr
                    .run_svc(package, service, &["debug", "config", "target"])
                    .await
                {
                    Ok(output) => output,
                    Err(e) => {
                        tracing::error!("Could not determine target config: {}", e);
                        return Ok(None);
                    }
                };
                if !output.success() {
                    tracing::error!(
                        "Target config fetch exited {}: {}",
                        output.code,
                        output.stderr.trim()
                    );
                    return Ok(None);
                }
                match serde_json::from_str(&output.stdout) {
                    Ok(value) => Ok(Some(TargetConfig(value))),
                    Err(e) => {
                        tracing::error!("Could not parse target config: {}", e);
                        Ok(None)
                    }
                }
            },
        )
        .await
    }
}

fn merged_options(
    options: Option<&serde_json::Value>,
    service: &str,
) -> Result<serde_json::Value> {
    let mut merged = match options {
        Some(value) if value.is_object() => value.clone(),
        Some(value) => {
            return Err(HarnessError::InvalidConfigValueError {
                field: "options".to_string(),
                value: value.to_string(),
                reason: "Options document must be a JSON object".to_string(),
            })
        }
        None => json!({}),
    };
    if let Some(root) = merged.as_object_mut() {
        let service_section = root.entry("service").or_insert_with(|| json!({}));
        if let Some(section) = service_section.as_object_mut() {
            section.entry("name").or_insert_with(|| json!(service));
        }
    }
    Ok(merged)
}

/// Writes an options document to a flushed temp file for `--options=` handoff.
pub(crate) fn options_tempfile(options: &serde_json::Value) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, options)?;
    file.flush()?;
    Ok(file)
}
