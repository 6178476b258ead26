// Hoopcast entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, stdout carries the report)
// 3. Load config, snapshot and run the analysis
// 4. Print the text or JSON report

use hoopcast_app::cli::{self, CliOptions};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

const DEFAULT_FILTER: &str =
    "hoopcast=info,hoopcast_app=info,hoopcast_core=info,hoopcast_basketball=info,warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let opts = CliOptions::parse();

    // 2. Initialize tracing
    init_tracing()?;
    info!("hoopcast starting up");

    // 3. Run
    let output = match cli::run(&opts).await {
        Ok(output) => output,
        Err(e) => {
            error!("run failed: {:#}", e);
            return Err(e);
        }
    };

    // 4. Print
    println!("{output}");
    info!("hoopcast finished");
    Ok(())
}

/// Initialize tracing to log to a file so stdout stays clean for the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("hoopcast.log"))
        .context("failed to create log file")?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
