use clap::Parser;
use std::sync::Arc;
use upgrade_harness::utils::error::{ErrorSeverity, HarnessError};
use upgrade_harness::utils::{logger, validation::Validate};
use upgrade_harness::{
    Capabilities, CliConfig, HarnessEngine, HarnessSettings, ShellRunner, SoakWorkflow,
};

/// Soak-cluster entry point: upgrade the already-installed release version to
/// the stub build, then downgrade back.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if std::env::var("HARNESS_LOG_JSON").is_ok() {
        logger::init_ci_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting soak upgrade/downgrade");

    let settings = match HarnessSettings::resolve(&cli).and_then(|s| {
        s.validate()?;
        Ok(s)
    }) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let monitor_enabled = settings.monitor;
    let runner = Arc::new(ShellRunner::new(settings.cli_bin.clone()));

    let capabilities = match Capabilities::detect(runner.as_ref()).await {
        Ok(capabilities) => capabilities,
        Err(e) => report_failure_and_exit(e),
    };

    let workflow = SoakWorkflow::new(runner, capabilities, settings);
    let engine = HarnessEngine::new_with_monitoring(workflow, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Soak cycle completed successfully!");
            println!("✅ Soak cycle completed successfully!");
            println!("📋 {}", summary);
        }
        Err(e) => report_failure_and_exit(e),
    }

    Ok(())
}

fn report_failure_and_exit(e: HarnessError) -> ! {
    tracing::error!(
        "❌ Soak cycle failed: {} (Category: {:?}, Severity: {:?})",
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
