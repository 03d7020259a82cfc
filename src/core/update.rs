use crate::core::capabilities::Capabilities;
use crate::core::package::PackageManager;
use crate::core::plan::PlanWatcher;
use crate::core::service::{options_tempfile, InstallRequest, ServiceManager};
use crate::domain::model::TargetConfig;
use crate::domain::ports::ClusterCli;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Parameters for one update, upgrade, or downgrade step.
#[derive(Debug, Clone, Copy)]
pub struct UpdateRequest<'a> {
    pub package: &'a str,
    pub service: &'a str,
    pub to_version: Option<&'a str>,
    pub options: Option<&'a serde_json::Value>,
    pub expected_running_tasks: usize,
    pub wait_for_deployment: bool,
    pub timeout: Duration,
}

/// Drives a service from one version/config to another, choosing between the
/// in-place `update start` flow and the destroy-and-reinstall fallback based
/// on what the cluster's CLI supports.
pub struct UpdateRunner<C> {
    packages: PackageManager<C>,
    services: ServiceManager<C>,
    capabilities: Capabilities,
    cluster_url: String,
}

impl<C: ClusterCli> UpdateRunner<C> {
    pub fn new(cli: Arc<C>, capabilities: Capabilities, cluster_url: impl Into<String>) -> Self {
        Self {
            packages: PackageManager::new(cli.clone()),
            services: ServiceManager::new(cli),
            capabilities,
            cluster_url: cluster_url.into(),
        }
    }

    pub fn services(&self) -> &ServiceManager<C> {
        &self.services
    }

    /// Fresh install, then (optionally) wait for the expected task count and
    /// a completed deploy plan.
    pub async fn install(&self, req: &UpdateRequest<'_>) -> Result<()> {
        self.services
            .install(&InstallRequest {
                package: req.package,
                service: req.service,
                version: req.to_version,
                options: req.options,
            })
            .await?;

        if req.wait_for_deployment {
            self.services
                .wait_for_task_count(req.service, req.expected_running_tasks, req.timeout)
                .await?;
            self.plan_watcher(req.service)
                .wait_for_completed_deployment(req.timeout)
                .await?;
        }
        Ok(())
    }

    /// The update-or-upgrade-or-downgrade step. Snapshots the target config
    /// and task IDs first so the deployment wait can verify whether tasks
    /// were supposed to restart.
    pub async fn run(&self, req: &UpdateRequest<'_>) -> Result<()> {
        let initial_config = self
            .services
            .target_config(req.package, req.service)
            .await?;
        let old_task_ids = self.services.task_ids(req.service, "").await?;

        let needs_replacement_flow = (req.to_version.is_some()
            && !self.capabilities.supports_version_upgrade())
            || (req.options.is_some() && !self.capabilities.supports_options_update());

        if needs_replacement_flow {
            tracing::info!(
                "Using app-replacement flow to move '{}' to version [{}]",
                req.service,
                req.to_version.unwrap_or("<current>")
            );
            self.services.destroy_app(req.service).await?;
            self.services
                .install(&InstallRequest {
                    package: req.package,
                    service: req.service,
                    version: req.to_version,
                    options: req.options,
                })
                .await?;
            if req.wait_for_deployment {
                self.services
                    .wait_for_task_count(req.service, req.expected_running_tasks, req.timeout)
                    .await?;
            }
        } else {
            self.update_with_cli(req).await?;
        }

        if req.wait_for_deployment {
            self.wait_for_deployment(req, &initial_config, &old_task_ids)
                .await?;
        }
        Ok(())
    }

    async fn update_with_cli(&self, req: &UpdateRequest<'_>) -> Result<()> {
        let mut tail: Vec<String> = vec!["update".to_string(), "start".to_string()];

        if let Some(version) = req.to_version {
            self.capabilities.ensure_version_upgrade()?;
            tail.push(format!("--package-version={}", version));
            tracing::info!("Using CLI to move '{}' to version [{}]", req.service, version);
        } else {
            tracing::info!("Using CLI to update '{}'", req.service);
        }

        // The temp file must outlive the CLI call.
        let mut _options_file = None;
        if let Some(options) = req.options {
            self.capabilities.ensure_options_update()?;
            let file = options_tempfile(options)?;
            tail.push(format!("--options={}", file.path().display()));
            _options_file = Some(file);
        }

        let tail_refs: Vec<&str> = tail.iter().map(String::as_str).collect();
        let output = self
            .services
            .run_svc(req.package, req.service, &tail_refs)
            .await?;
        output.require_success(&format!("{} --name={} update start", req.package, req.service))?;

        // The main CLI does not replace a package CLI on its own, so a
        // version change has to reinstall the subcommand explicitly.
        if let Some(version) = req.to_version {
            self.packages.install_cli(req.package, Some(version)).await?;
        }
        Ok(())
    }

    async fn wait_for_deployment(
        &self,
        req: &UpdateRequest<'_>,
        initial_config: &TargetConfig,
        old_task_ids: &[String],
    ) -> Result<()> {
        let updated_config = self
            .services
            .target_config(req.package, req.service)
            .await?;

        if updated_config == *initial_config {
            tracing::info!("No config change detected. Tasks should not be restarted");
            self.services
                .check_tasks_not_updated(req.service, "", old_task_ids)
                .await?;
        } else {
            tracing::info!("Checking that all tasks have restarted");
            self.services
                .check_tasks_updated(req.service, "", old_task_ids, req.timeout)
                .await?;
        }

        self.plan_watcher(req.service)
            .wait_for_completed_deployment(req.timeout)
            .await?;
        Ok(())
    }

    fn plan_watcher(&self, service: &str) -> PlanWatcher {
        PlanWatcher::new(&self.cluster_url, service)
    }
}
