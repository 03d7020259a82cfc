use crate::domain::model::BundleManifest;
use crate::domain::ports::{Storage, Workflow};
use crate::utils::error::{HarnessError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};

/// What goes into the distributable archive.
#[derive(Debug, Clone)]
pub struct BundleSpec {
    pub package: String,
    pub version: String,
    pub entry_point: String,
    pub artifact_path: PathBuf,
    pub config_path: PathBuf,
    pub archive_name: String,
}

/// Builds the distributable bundle: the built artifact, the integration-test
/// configuration file, and a generated manifest naming the entry point.
pub struct BundleBuilder<S: Storage> {
    storage: S,
    spec: BundleSpec,
}

impl<S: Storage> BundleBuilder<S> {
    pub fn new(storage: S, spec: BundleSpec) -> Self {
        Self { storage, spec }
    }
}

#[async_trait]
impl<S: Storage> Workflow for BundleBuilder<S> {
    fn name(&self) -> &str {
        "bundle"
    }

    async fn run(&self) -> Result<String> {
        let artifact = std::fs::read(&self.spec.artifact_path)?;
        if artifact.is_empty() {
            return Err(HarnessError::InvalidConfigValueError {
                field: "artifact".to_string(),
                value: self.spec.artifact_path.display().to_string(),
                reason: "Artifact file is empty".to_string(),
            });
        }
        let config = std::fs::read(&self.spec.config_path)?;

        let artifact_name = file_name(&self.spec.artifact_path, "artifact")?;
        let config_name = file_name(&self.spec.config_path, "config")?;

        let manifest = BundleManifest {
            package: self.spec.package.clone(),
            version: self.spec.version.clone(),
            entry_point: self.spec.entry_point.clone(),
            artifact: artifact_name.clone(),
            config: config_name.clone(),
            built_at: chrono::Utc::now().to_rfc3339(),
        };

        tracing::debug!(
            "Creating bundle {} ({} + {} + manifest.json)",
            self.spec.archive_name,
            artifact_name,
            config_name
        );

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(artifact_name.as_str(), FileOptions::default())?;
            zip.write_all(&artifact)?;

            zip.start_file::<_, ()>(config_name.as_str(), FileOptions::default())?;
            zip.write_all(&config)?;

            zip.start_file::<_, ()>("manifest.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing bundle ({} bytes) to storage", zip_data.len());
        self.storage
            .write_file(&self.spec.archive_name, &zip_data)
            .await?;

        Ok(self.spec.archive_name.clone())
    }
}

fn file_name(path: &Path, field: &str) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| HarnessError::InvalidConfigValueError {
            field: field.to_string(),
            value: path.display().to_string(),
            reason: "Path has no usable file name".to_string(),
        })
}
