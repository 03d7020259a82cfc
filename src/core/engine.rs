use crate::domain::ports::Workflow;
use crate::utils::error::Result;

/// Runs a workflow with optional resource monitoring and summary logging.
pub struct HarnessEngine<W: Workflow> {
    workflow: W,
    monitor_enabled: bool,
}

impl<W: Workflow> HarnessEngine<W> {
    pub fn new(workflow: W) -> Self {
        Self {
            workflow,
            monitor_enabled: false,
        }
    }

    pub fn new_with_monitoring(workflow: W, monitor_enabled: bool) -> Self {
        Self {
            workflow,
            monitor_enabled,
        }
    }

    pub async fn run(&self) -> Result<String> {
        #[cfg(feature = "cli")]
        let monitor = std::sync::Arc::new(crate::utils::monitor::SystemMonitor::new(
            self.monitor_enabled,
        ));
        // Deployment waits run for tens of minutes; sample in the background
        // so the peak figures cover the whole workflow.
        #[cfg(feature = "cli")]
        let sampler = self.monitor_enabled.then(|| {
            let monitor = monitor.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(std::time::Duration::from_secs(30));
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    if let Some(stats) = monitor.stats() {
                        tracing::debug!(
                            "Resource sample: cpu={:.1}% mem={}MB peak={}MB",
                            stats.cpu_usage,
                            stats.memory_usage_mb,
                            stats.peak_memory_mb
                        );
                    }
                }
            })
        });
        #[cfg(not(feature = "cli"))]
        let _ = self.monitor_enabled;

        tracing::info!("Starting '{}' workflow", self.workflow.name());
        let started = std::time::Instant::now();

        let result = self.workflow.run().await;

        #[cfg(feature = "cli")]
        {
            if let Some(sampler) = sampler {
                sampler.abort();
            }
            monitor.log_summary();
        }

        let summary = result?;
        tracing::info!(
            "Workflow '{}' finished in {:?}",
            self.workflow.name(),
            started.elapsed()
        );
        Ok(summary)
    }
}
