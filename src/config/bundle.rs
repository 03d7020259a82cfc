use crate::core::bundle::BundleSpec;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_package_name, validate_path,
    Validate,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(about = "Builds the distributable bundle: artifact + test config + manifest")]
pub struct BundleCliConfig {
    #[arg(long)]
    pub package: String,

    #[arg(long)]
    pub version: String,

    #[arg(long, help = "Application entry point recorded in the manifest")]
    pub entry_point: String,

    #[arg(long, help = "Path to the built artifact")]
    pub artifact: String,

    #[arg(long, help = "Path to the integration-test configuration file")]
    pub config: String,

    #[arg(long, default_value = "./dist")]
    pub output_path: String,

    #[arg(long, help = "Archive file name; defaults to <package>-bundle.zip")]
    pub archive_name: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl BundleCliConfig {
    pub fn archive_name(&self) -> String {
        self.archive_name
            .clone()
            .unwrap_or_else(|| format!("{}-bundle.zip", self.package))
    }

    pub fn bundle_spec(&self) -> BundleSpec {
        BundleSpec {
            package: self.package.clone(),
            version: self.version.clone(),
            entry_point: self.entry_point.clone(),
            artifact_path: PathBuf::from(&self.artifact),
            config_path: PathBuf::from(&self.config),
            archive_name: self.archive_name(),
        }
    }
}

impl Validate for BundleCliConfig {
    fn validate(&self) -> Result<()> {
        validate_package_name("package", &self.package)?;
        validate_non_empty_string("version", &self.version)?;
        validate_non_empty_string("entry_point", &self.entry_point)?;
        validate_path("artifact", &self.artifact)?;
        validate_path("config", &self.config)?;
        validate_file_extensions(
            "config",
            std::slice::from_ref(&self.config),
            &["yml", "yaml", "json"],
        )?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}
