pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::bundle::BundleCliConfig;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, ShellRunner};
pub use config::HarnessSettings;
pub use core::bundle::{BundleBuilder, BundleSpec};
pub use core::capabilities::Capabilities;
pub use core::engine::HarnessEngine;
pub use core::upgrade::{SoakWorkflow, UpgradeWorkflow};
pub use utils::error::{HarnessError, Result};
