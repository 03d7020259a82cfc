use crate::core::run_checked;
use crate::domain::model::{ClusterInfo, ClusterVariant};
use crate::domain::ports::ClusterCli;
use crate::utils::error::{HarnessError, Result};
use semver::Version;

/// What the connected cluster's CLI can do in place. Older CLIs cannot update
/// a running service, which forces the destroy-and-reinstall fallback.
#[derive(Debug, Clone)]
pub struct Capabilities {
    version: Version,
    variant: ClusterVariant,
}

impl Capabilities {
    pub fn new(version: Version, variant: ClusterVariant) -> Self {
        Self { version, variant }
    }

    pub async fn detect<C: ClusterCli>(cli: &C) -> Result<Self> {
        let output = run_checked(cli, &["cluster", "info", "--json"]).await?;
        let info: ClusterInfo = serde_json::from_str(&output.stdout)?;
        let version = parse_cluster_version(&info.version)?;
        tracing::debug!(
            "Cluster reports version {} ({:?})",
            version,
            info.variant
        );
        Ok(Self::new(version, info.variant))
    }

    /// Service options updates landed in Enterprise 1.9 and Open 1.11.
    pub fn supports_options_update(&self) -> bool {
        match self.variant {
            ClusterVariant::Enterprise => self.version >= Version::new(1, 9, 0),
            ClusterVariant::Open => self.version >= Version::new(1, 11, 0),
        }
    }

    /// Version upgrades additionally require the enterprise variant.
    pub fn supports_version_upgrade(&self) -> bool {
        self.supports_options_update() && self.variant == ClusterVariant::Enterprise
    }

    pub fn ensure_options_update(&self) -> Result<()> {
        if self.supports_options_update() {
            Ok(())
        } else {
            Err(HarnessError::UnsupportedError {
                message: format!(
                    "service options updates need Enterprise 1.9+ or Open 1.11+, cluster is {} ({:?})",
                    self.version, self.variant
                ),
            })
        }
    }

    pub fn ensure_version_upgrade(&self) -> Result<()> {
        if self.supports_version_upgrade() {
            Ok(())
        } else {
            Err(HarnessError::UnsupportedError {
                message: format!(
                    "in-place version upgrades need Enterprise 1.9+, cluster is {} ({:?})",
                    self.version, self.variant
                ),
            })
        }
    }
}

/// Cluster versions are often reported as two components ("1.11"); pad to a
/// full semver triple before parsing.
fn parse_cluster_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim().trim_start_matches('v');
    let numeric: &str = trimmed
        .split(|c: char| c == '-' || c == '+')
        .next()
        .unwrap_or(trimmed);

    let padded = match numeric.matches('.').count() {
        0 => format!("{}.0.0", numeric),
        1 => format!("{}.0", numeric),
        _ => numeric.to_string(),
    };

    Version::parse(&padded).map_err(|e| HarnessError::UnexpectedOutputError {
        command: "cluster info --json".to_string(),
        reason: format!("unparseable cluster version '{}': {}", raw, e),
    })
}
