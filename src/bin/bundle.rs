use clap::Parser;
use upgrade_harness::utils::error::{ErrorSeverity, HarnessError};
use upgrade_harness::utils::{logger, validation::Validate};
use upgrade_harness::{BundleBuilder, BundleCliConfig, HarnessEngine, LocalStorage};

/// Packaging entry point: produces the distributable archive bundling the
/// built artifact with the integration-test configuration file.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BundleCliConfig::parse();
    logger::init_cli_logger(config.verbose);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let builder = BundleBuilder::new(storage, config.bundle_spec());
    let engine = HarnessEngine::new(builder);

    match engine.run().await {
        Ok(archive_name) => {
            let output = format!("{}/{}", config.output_path.trim_end_matches('/'), archive_name);
            tracing::info!("✅ Bundle created successfully!");
            println!("✅ Bundle created successfully!");
            println!("📁 Output saved to: {}", output);
        }
        Err(e) => report_failure_and_exit(e),
    }

    Ok(())
}

fn report_failure_and_exit(e: HarnessError) -> ! {
    tracing::error!(
        "❌ Bundle build failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
