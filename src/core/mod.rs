pub mod bundle;
pub mod capabilities;
pub mod engine;
pub mod package;
pub mod plan;
pub mod repository;
pub mod service;
pub mod update;
pub mod upgrade;

pub use crate::domain::model::{
    BundleManifest, ClusterInfo, ClusterVariant, PackageRepo, Plan, PlanStatus, TargetConfig,
    TaskInfo,
};
pub use crate::domain::ports::{CliOutput, ClusterCli, ConfigProvider, Storage, Workflow};
pub use crate::utils::error::Result;

/// Default budget for a full install or upgrade deployment, from the upstream
/// test suites: 25 minutes.
pub const DEPLOYMENT_TIMEOUT_SECONDS: u64 = 25 * 60;

/// Name of the release package repository.
pub const UNIVERSE_REPO: &str = "Universe";

/// Version label that resolves to the locally built stub package.
pub const STUB_VERSION: &str = "stub-universe";

pub(crate) async fn run_checked<C: ClusterCli + ?Sized>(cli: &C, args: &[&str]) -> Result<CliOutput> {
    let output = cli.run(args).await?;
    output.require_success(&args.join(" "))
}
