use async_trait::async_trait;
use httpmock::prelude::*;
use semver::Version;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use upgrade_harness::core::Workflow;
use upgrade_harness::domain::model::ClusterVariant;
use upgrade_harness::domain::ports::{CliOutput, ClusterCli};
use upgrade_harness::utils::error::Result;
use upgrade_harness::{Capabilities, HarnessEngine, HarnessSettings, UpgradeWorkflow};

struct ScriptedCli {
    responses: Mutex<VecDeque<CliOutput>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedCli {
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

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterCli for ScriptedCli {
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
            .unwrap_or_else(|| ScriptedCli::ok("")))
    }
}

const REPO_JSON: &str =
    r#"{"repositories": [{"name": "Universe", "uri": "https://universe.example.com/repo"}]}"#;
const TEST_DESCRIBE: &str = r#"{"package": {"version": "2.0.0-SNAPSHOT"}}"#;
const RELEASE_DESCRIBE: &str = r#"{"package": {"version": "1.0.0"}}"#;
const CONFIG_V1: &str = r#"{"node": {"count": 3}, "version": "1.0.0"}"#;
const CONFIG_V2: &str = r#"{"node": {"count": 3}, "version": "2.0.0-SNAPSHOT"}"#;
const TASKS_OLD: &str =
    r#"[{"id": "keystore-0__old", "name": "keystore-0-node", "state": "TASK_RUNNING"}]"#;
const TASKS_NEW: &str =
    r#"[{"id": "keystore-0__new", "name": "keystore-0-node", "state": "TASK_RUNNING"}]"#;

fn settings(cluster_url: String) -> HarnessSettings {
    HarnessSettings {
        package: "keystore".to_string(),
        service: "keystore".to_string(),
        cluster_url,
        cli_bin: "dcos".to_string(),
        expected_running_tasks: 1,
        timeout: Duration::from_secs(15),
        wait_for_deployment: true,
        install_options: None,
        version_options: None,
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_end_to_end_upgrade_with_deployment_waits() {
    let server = MockServer::start();
    let plan_mock = server.mock(|when, then| {
        when.method(GET).path("/service/keystore/v1/plans/deploy");
        then.status(200).json_body(serde_json::json!({
            "status": "COMPLETE",
            "phases": [{"name": "node-deploy", "status": "COMPLETE", "steps": []}]
        }));
    });

    let cli = Arc::new(ScriptedCli::new(vec![
        ScriptedCli::ok(""),               // package uninstall
        ScriptedCli::ok(TEST_DESCRIBE),    // describe: local test version
        ScriptedCli::ok(REPO_JSON),        // package repo list
        ScriptedCli::ok(""),               // repo remove
        ScriptedCli::ok(""),               // repo add --index=0
        ScriptedCli::ok(RELEASE_DESCRIBE), // describe: release version appears
        ScriptedCli::ok(""),               // package install (release)
        ScriptedCli::ok(TASKS_OLD),        // task --json (task-count wait)
        ScriptedCli::ok(""),               // repo remove (restore)
        ScriptedCli::ok(""),               // repo add (restore)
        ScriptedCli::ok(TEST_DESCRIBE),    // describe: test version visible again
        ScriptedCli::ok(CONFIG_V1),        // debug config target (initial)
        ScriptedCli::ok(TASKS_OLD),        // task --json (snapshot)
        ScriptedCli::ok(""),               // update start --package-version
        ScriptedCli::ok(""),               // package install --cli
        ScriptedCli::ok(CONFIG_V2),        // debug config target (updated)
        ScriptedCli::ok(TASKS_NEW),        // task --json (replacement check)
    ]));

    let capabilities = Capabilities::new(Version::new(1, 12, 0), ClusterVariant::Enterprise);
    let workflow = UpgradeWorkflow::new(cli.clone(), capabilities, settings(server.url("")));
    let engine = HarnessEngine::new(workflow);

    let summary = engine.run().await.unwrap();
    assert_eq!(summary, "keystore upgraded from 1.0.0 to 2.0.0-SNAPSHOT");

    // Deploy plan polled after the release install and after the upgrade.
    assert_eq!(plan_mock.hits(), 2);

    let calls = cli.calls();
    assert_eq!(calls[0][0..2], ["package", "uninstall"]);
    assert!(calls[4].contains(&"--index=0".to_string()));
    assert!(calls[6]
        .iter()
        .any(|a| a == "--package-version=1.0.0"));
    assert!(calls[13]
        .iter()
        .any(|a| a == "--package-version=2.0.0-SNAPSHOT"));
    assert!(calls[14].contains(&"--cli".to_string()));
}

#[tokio::test]
async fn test_upgrade_fails_when_deploy_plan_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/service/keystore/v1/plans/deploy");
        then.status(200)
            .json_body(serde_json::json!({"status": "ERROR", "phases": []}));
    });

    let cli = Arc::new(ScriptedCli::new(vec![
        ScriptedCli::ok(""),
        ScriptedCli::ok(TEST_DESCRIBE),
        ScriptedCli::ok(REPO_JSON),
        ScriptedCli::ok(""),
        ScriptedCli::ok(""),
        ScriptedCli::ok(RELEASE_DESCRIBE),
        ScriptedCli::ok(""),        // package install (release)
        ScriptedCli::ok(TASKS_OLD), // task --json (task-count wait)
        // The failing plan aborts the install wait; the repo restore still
        // consumes its responses afterwards.
        ScriptedCli::ok(""),
        ScriptedCli::ok(""),
        ScriptedCli::ok(TEST_DESCRIBE),
    ]));

    let capabilities = Capabilities::new(Version::new(1, 12, 0), ClusterVariant::Enterprise);
    let workflow = UpgradeWorkflow::new(cli.clone(), capabilities, settings(server.url("")));

    let result = workflow.run().await;
    assert!(result.is_err());

    // Repo ordering was restored despite the failure.
    let calls = cli.calls();
    let restores: Vec<&Vec<String>> = calls
        .iter()
        .filter(|c| c.len() >= 3 && c[0..3] == ["package", "repo", "add"])
        .collect();
    assert_eq!(restores.len(), 2);
    assert!(!restores[1].iter().any(|a| a.starts_with("--index")));
}
