use clap::Parser;
use std::io::Read;
use tempfile::TempDir;
use upgrade_harness::core::{BundleManifest, Workflow};
use upgrade_harness::utils::validation::Validate;
use upgrade_harness::{BundleBuilder, BundleCliConfig, HarnessEngine, LocalStorage};

fn write_inputs(dir: &TempDir) -> (String, String) {
    let artifact = dir.path().join("keystore-scheduler.jar");
    let config = dir.path().join("svc.yml");
    std::fs::write(&artifact, b"jar-bytes").unwrap();
    std::fs::write(&config, b"name: keystore\n").unwrap();
    (
        artifact.to_str().unwrap().to_string(),
        config.to_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_bundle_binary_flow_writes_archive_to_output_dir() {
    let inputs = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let (artifact, config) = write_inputs(&inputs);

    let cli = BundleCliConfig::parse_from([
        "bundle",
        "--package",
        "keystore",
        "--version",
        "2.0.0-SNAPSHOT",
        "--entry-point",
        "com.example.keystore.Main",
        "--artifact",
        &artifact,
        "--config",
        &config,
        "--output-path",
        output.path().to_str().unwrap(),
    ]);
    cli.validate().unwrap();

    let storage = LocalStorage::new(cli.output_path.clone());
    let engine = HarnessEngine::new(BundleBuilder::new(storage, cli.bundle_spec()));

    let archive_name = engine.run().await.unwrap();
    assert_eq!(archive_name, "keystore-bundle.zip");

    let archive_path = output.path().join(&archive_name);
    let file = std::fs::File::open(&archive_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();

    let mut entries: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    entries.sort();
    assert_eq!(
        entries,
        vec!["keystore-scheduler.jar", "manifest.json", "svc.yml"]
    );

    let manifest: BundleManifest = {
        let mut entry = archive.by_name("manifest.json").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        serde_json::from_str(&content).unwrap()
    };
    assert_eq!(manifest.package, "keystore");
    assert_eq!(manifest.version, "2.0.0-SNAPSHOT");
    assert_eq!(manifest.entry_point, "com.example.keystore.Main");

    let mut config_entry = archive.by_name("svc.yml").unwrap();
    let mut config_content = String::new();
    config_entry.read_to_string(&mut config_content).unwrap();
    assert_eq!(config_content, "name: keystore\n");
}

#[tokio::test]
async fn test_bundle_flow_rejects_missing_artifact() {
    let inputs = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let (_, config) = write_inputs(&inputs);
    let absent = inputs.path().join("absent.jar");

    let cli = BundleCliConfig::parse_from([
        "bundle",
        "--package",
        "keystore",
        "--version",
        "2.0.0-SNAPSHOT",
        "--entry-point",
        "com.example.keystore.Main",
        "--artifact",
        absent.to_str().unwrap(),
        "--config",
        &config,
        "--output-path",
        output.path().to_str().unwrap(),
    ]);

    let storage = LocalStorage::new(cli.output_path.clone());
    let builder = BundleBuilder::new(storage, cli.bundle_spec());

    assert!(builder.run().await.is_err());
    assert!(!output.path().join("keystore-bundle.zip").exists());
}
