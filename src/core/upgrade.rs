use crate::core::package::PackageManager;
use crate::core::repository::RepoManager;
use crate::core::update::{UpdateRequest, UpdateRunner};
use crate::core::{capabilities::Capabilities, STUB_VERSION, UNIVERSE_REPO};
use crate::domain::ports::{ClusterCli, ConfigProvider, Workflow};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Installs the release version of a package, then upgrades it to the locally
/// built test version:
///
/// 1. Uninstalls any test version of the service.
/// 2. Pins the Universe repo to the top and installs the release version.
/// 3. Restores repo ordering and upgrades to the test version.
pub struct UpgradeWorkflow<C, P> {
    repos: RepoManager<C>,
    packages: PackageManager<C>,
    runner: UpdateRunner<C>,
    config: P,
}

impl<C: ClusterCli, P: ConfigProvider> UpgradeWorkflow<C, P> {
    pub fn new(cli: Arc<C>, capabilities: Capabilities, config: P) -> Self {
        Self {
            repos: RepoManager::new(cli.clone()),
            packages: PackageManager::new(cli.clone()),
            runner: UpdateRunner::new(cli, capabilities, config.cluster_url()),
            config,
        }
    }

    fn request<'a>(
        &'a self,
        to_version: &'a str,
        options: Option<&'a serde_json::Value>,
    ) -> UpdateRequest<'a> {
        UpdateRequest {
            package: self.config.package_name(),
            service: self.config.service_name(),
            to_version: Some(to_version),
            options,
            expected_running_tasks: self.config.expected_running_tasks(),
            wait_for_deployment: self.config.wait_for_deployment(),
            timeout: self.config.timeout(),
        }
    }

    /// Puts the Universe repo back at the bottom of the list and waits for
    /// the test build to become the resolvable version again.
    async fn restore_universe_ordering(
        &self,
        universe_url: &str,
        universe_version: &str,
    ) -> Result<()> {
        let package = self.config.package_name();
        self.repos.remove(UNIVERSE_REPO).await?;
        self.repos.add(UNIVERSE_REPO, universe_url, None).await?;
        tracing::info!(
            "Waiting for test build version of {} to appear: version != {}",
            package,
            universe_version
        );
        self.packages
            .wait_for_new_version(package, universe_version)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<C: ClusterCli, P: ConfigProvider> Workflow for UpgradeWorkflow<C, P> {
    fn name(&self) -> &str {
        "upgrade"
    }

    async fn run(&self) -> Result<String> {
        let package = self.config.package_name();
        let service = self.config.service_name();

        self.runner.services().uninstall(package, service).await?;

        let test_version = self.packages.version(package).await?;
        tracing::info!("Found test version: {}", test_version);

        let universe_url = self.repos.universe_url().await?;

        // Pin the Universe repo to the top so the install resolves the
        // release version instead of the local build.
        self.repos.remove(UNIVERSE_REPO).await?;
        self.repos
            .add(UNIVERSE_REPO, &universe_url, Some(0))
            .await?;
        tracing::info!(
            "Waiting for Universe release version of {} to appear: version != {}",
            package,
            test_version
        );
        let universe_version = self
            .packages
            .wait_for_new_version(package, &test_version)
            .await?;

        tracing::info!(
            "Installing Universe version: {}={}",
            package,
            universe_version
        );
        let install_result = self
            .runner
            .install(&self.request(&universe_version, self.config.install_options()))
            .await;

        // Repo ordering is restored whether or not the install worked, but
        // an install failure is still the error to report.
        let restore_result = self
            .restore_universe_ordering(&universe_url, &universe_version)
            .await;
        install_result?;
        restore_result?;

        tracing::info!(
            "Upgrading {}: {} => {}",
            package,
            universe_version,
            test_version
        );
        self.runner
            .run(&self.request(&test_version, self.config.version_options()))
            .await?;

        Ok(format!(
            "{} upgraded from {} to {}",
            package, universe_version, test_version
        ))
    }
}

/// Soak-cluster cycle: the release version is assumed installed and the
/// Universe repo is assumed to be the default source, so no repo shuffling is
/// needed. Upgrades to the stub build, then downgrades back.
pub struct SoakWorkflow<C, P> {
    packages: PackageManager<C>,
    runner: UpdateRunner<C>,
    config: P,
}

impl<C: ClusterCli, P: ConfigProvider> SoakWorkflow<C, P> {
    pub fn new(cli: Arc<C>, capabilities: Capabilities, config: P) -> Self {
        Self {
            packages: PackageManager::new(cli.clone()),
            runner: UpdateRunner::new(cli, capabilities, config.cluster_url()),
            config,
        }
    }

    fn request<'a>(&'a self, to_version: &'a str) -> UpdateRequest<'a> {
        UpdateRequest {
            package: self.config.package_name(),
            service: self.config.service_name(),
            to_version: Some(to_version),
            options: self.config.install_options(),
            expected_running_tasks: self.config.expected_running_tasks(),
            wait_for_deployment: self.config.wait_for_deployment(),
            timeout: self.config.timeout(),
        }
    }
}

#[async_trait]
impl<C: ClusterCli, P: ConfigProvider> Workflow for SoakWorkflow<C, P> {
    fn name(&self) -> &str {
        "soak"
    }

    async fn run(&self) -> Result<String> {
        let package = self.config.package_name();

        self.packages.install_cli(package, None).await?;

        tracing::info!("Upgrading to test version: {} {}", package, STUB_VERSION);
        self.runner.run(&self.request(STUB_VERSION)).await?;

        let release_version = self.packages.version(package).await?;
        tracing::info!(
            "Downgrading to Universe version: {} {}",
            package,
            release_version
        );
        self.runner.run(&self.request(&release_version)).await?;

        Ok(format!(
            "{} soak cycle complete ({} -> {})",
            package, STUB_VERSION, release_version
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ClusterVariant;
    use crate::domain::ports::CliOutput;
    use crate::utils::error::HarnessError;
    use semver::Version;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockCli {
        responses: Mutex<VecDeque<CliOutput>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl MockCli {
        fn new(responses: Vec<CliOutput>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok(stdout: &str) -> CliOutput {
            CliOutput {
                code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }
        }

        fn fail(stderr: &str) -> CliOutput {
            CliOutput {
                code: 1,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClusterCli for MockCli {
        async fn run(&self, args: &[&str]) -> Result<CliOutput> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|s| s.to_string()).collect());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| MockCli::ok("")))
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn package_name(&self) -> &str {
            "keystore"
        }
        fn service_name(&self) -> &str {
            "keystore"
        }
        fn cluster_url(&self) -> &str {
            "http://127.0.0.1"
        }
        fn expected_running_tasks(&self) -> usize {
            1
        }
        fn timeout(&self) -> Duration {
            Duration::from_secs(30)
        }
        fn wait_for_deployment(&self) -> bool {
            false
        }
        fn install_options(&self) -> Option<&serde_json::Value> {
            None
        }
    }

    fn enterprise_caps() -> Capabilities {
        Capabilities::new(Version::new(1, 12, 0), ClusterVariant::Enterprise)
    }

    const REPO_JSON: &str =
        r#"{"repositories": [{"name": "Universe", "uri": "https://universe.example.com/repo"}]}"#;
    const TEST_DESCRIBE: &str = r#"{"package": {"version": "2.0.0-SNAPSHOT"}}"#;
    const RELEASE_DESCRIBE: &str = r#"{"package": {"version": "1.0.0"}}"#;
    const CONFIG_JSON: &str = r#"{"node": {"count": 3}}"#;
    const TASKS_JSON: &str =
        r#"[{"id": "keystore-0__a", "name": "keystore-0-node", "state": "TASK_RUNNING"}]"#;

    #[tokio::test]
    async fn test_upgrade_workflow_pins_and_restores_universe_repo() {
        let cli = Arc::new(MockCli::new(vec![
            MockCli::ok(""),               // package uninstall
            MockCli::ok(TEST_DESCRIBE),    // package describe (test version)
            MockCli::ok(REPO_JSON),        // package repo list
            MockCli::ok(""),               // repo remove
            MockCli::ok(""),               // repo add --index=0
            MockCli::ok(RELEASE_DESCRIBE), // describe: release version visible
            MockCli::ok(""),               // package install (release)
            MockCli::ok(""),               // repo remove (restore)
            MockCli::ok(""),               // repo add (restore, appended)
            MockCli::ok(TEST_DESCRIBE),    // describe: test version visible again
            MockCli::ok(CONFIG_JSON),      // debug config target
            MockCli::ok(TASKS_JSON),       // task --json
            MockCli::ok(""),               // update start
            MockCli::ok(""),               // package install --cli
        ]));
        let workflow = UpgradeWorkflow::new(cli.clone(), enterprise_caps(), MockConfig);

        let summary = workflow.run().await.unwrap();
        assert_eq!(summary, "keystore upgraded from 1.0.0 to 2.0.0-SNAPSHOT");

        let calls = cli.calls();
        // Pinned to the top for the release install...
        assert_eq!(
            calls[4],
            vec![
                "package",
                "repo",
                "add",
                "--index=0",
                "Universe",
                "https://universe.example.com/repo"
            ]
        );
        // ...and appended back afterwards.
        assert_eq!(
            calls[8],
            vec![
                "package",
                "repo",
                "add",
                "Universe",
                "https://universe.example.com/repo"
            ]
        );
        // The upgrade step targets the test build.
        assert!(calls[12].contains(&"--package-version=2.0.0-SNAPSHOT".to_string()));
    }

    #[tokio::test]
    async fn test_upgrade_workflow_restores_repo_when_install_fails() {
        let cli = Arc::new(MockCli::new(vec![
            MockCli::ok(""),
            MockCli::ok(TEST_DESCRIBE),
            MockCli::ok(REPO_JSON),
            MockCli::ok(""),
            MockCli::ok(""),
            MockCli::ok(RELEASE_DESCRIBE),
            MockCli::fail("install failed"), // release install blows up
            MockCli::ok(""),                 // repo remove (restore still runs)
            MockCli::ok(""),                 // repo add (restore still runs)
            MockCli::ok(TEST_DESCRIBE),      // describe after restore
        ]));
        let workflow = UpgradeWorkflow::new(cli.clone(), enterprise_caps(), MockConfig);

        let result = workflow.run().await;
        assert!(matches!(result, Err(HarnessError::CommandError { .. })));

        // The restore ran even though the install failed.
        let calls = cli.calls();
        let restore_add = &calls[8];
        assert_eq!(restore_add[0..3], ["package", "repo", "add"]);
        assert!(!restore_add.iter().any(|a| a.starts_with("--index")));
    }

    #[tokio::test]
    async fn test_soak_workflow_upgrades_then_downgrades() {
        let cli = Arc::new(MockCli::new(vec![
            MockCli::ok(""),               // package install --cli
            MockCli::ok(CONFIG_JSON),      // config (upgrade step)
            MockCli::ok(TASKS_JSON),       // tasks
            MockCli::ok(""),               // update start (stub-universe)
            MockCli::ok(""),               // package install --cli (stub)
            MockCli::ok(RELEASE_DESCRIBE), // describe: release version
            MockCli::ok(CONFIG_JSON),      // config (downgrade step)
            MockCli::ok(TASKS_JSON),       // tasks
            MockCli::ok(""),               // update start (release)
            MockCli::ok(""),               // package install --cli (release)
        ]));
        let workflow = SoakWorkflow::new(cli.clone(), enterprise_caps(), MockConfig);

        let summary = workflow.run().await.unwrap();
        assert_eq!(summary, "keystore soak cycle complete (stub-universe -> 1.0.0)");

        let calls = cli.calls();
        assert!(calls[3].contains(&"--package-version=stub-universe".to_string()));
        assert!(calls[8].contains(&"--package-version=1.0.0".to_string()));
    }
}
