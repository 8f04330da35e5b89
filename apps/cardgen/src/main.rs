mod batch;
mod config;
mod errors;
mod layout;
mod models;
mod render;
mod storage;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::batch::run_batch;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric settings)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cardgen v{}", env!("CARGO_PKG_VERSION"));
    info!(
        bank = %config.paths.question_bank.display(),
        output = %config.paths.output_dir.display(),
        batch_size = config.batch_size,
        "Flashcard batch configuration"
    );

    match run_batch(&config).await {
        Ok(report) => {
            if !report.failed.is_empty() {
                warn!(failed = ?report.failed, "Some cards were skipped");
            }
            if report.history_warnings > 0 {
                warn!(
                    count = report.history_warnings,
                    "History was not fully persisted; repeats are possible next run"
                );
            }
            info!(
                cards = report.cards.len(),
                manifest = %report.manifest_path.display(),
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "Batch aborted");
            Err(e.into())
        }
    }
}
