use crate::domain::model::{Plan, PlanStatus};
use crate::utils::error::{HarnessError, Result};
use crate::utils::retry::{self, RetryPolicy};
use reqwest::Client;
use std::time::Duration;

/// Polls the scheduler's deploy plan over HTTP until it completes.
pub struct PlanWatcher {
    client: Client,
    plan_url: String,
    service: String,
}

impl PlanWatcher {
    pub fn new(cluster_url: &str, service: &str) -> Self {
        let plan_url = format!(
            "{}/service/{}/v1/plans/deploy",
            cluster_url.trim_end_matches('/'),
            service
        );
        Self {
            client: Client::new(),
            plan_url,
            service: service.to_string(),
        }
    }

    /// One fetch of the deploy plan. Schedulers report incomplete plans with
    /// a non-2xx status but still attach the plan body, so the body is parsed
    /// regardless of the HTTP status.
    pub async fn deploy_plan(&self) -> Result<Plan> {
        let response = self.client.get(&self.plan_url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| HarnessError::UnexpectedOutputError {
            command: format!("GET {}", self.plan_url),
            reason: format!("HTTP {} with unparseable plan body: {}", status, e),
        })
    }

    /// Waits for the deploy plan to reach COMPLETE. An ERROR status fails
    /// immediately rather than burning the rest of the timeout.
    pub async fn wait_for_completed_deployment(&self, timeout: Duration) -> Result<Plan> {
        tracing::info!(
            "Waiting for service '{}' to finish its deployment plan...",
            self.service
        );
        let policy = RetryPolicy::new(Duration::from_secs(5), timeout);
        let watcher = self;

        retry::poll(
            &format!("deploy plan of '{}' to complete", self.service),
            policy,
            move || async move {
                match watcher.deploy_plan().await {
                    Ok(plan) => match plan.status {
                        PlanStatus::Complete => Ok(Some(plan)),
                        PlanStatus::Error => Err(HarnessError::PlanError {
                            plan: "deploy".to_string(),
                            status: "ERROR".to_string(),
                        }),
                        _ => {
                            tracing::debug!(
                                "Service '{}' deploy plan: {}",
                                watcher.service,
                                plan.progress()
                            );
                            Ok(None)
                        }
                    },
                    Err(e) => {
                        // Scheduler restarts mid-deploy are expected; retry.
                        tracing::warn!(
                            "Deploy plan fetch for '{}' failed: {}",
                            watcher.service,
                            e
                        );
                        Ok(None)
                    }
                }
            },
        )
        .await
    }
}
