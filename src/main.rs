use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use webpic::{format_duration, setup_logging, CaptureOrchestrator, ChromiumSession, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    setup_logging(args.verbose)?;

    let config = args.to_config();
    config.validate()?;

    let urls = args.resolve_urls().await?;
    info!(
        "Capturing {} URLs against {} into {}",
        urls.len(),
        config.hostname,
        config.output_dir.display()
    );

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| {
            format!(
                "could not create output directory {}",
                config.output_dir.display()
            )
        })?;

    let session = Arc::new(ChromiumSession::launch(&config).await?);
    let orchestrator = CaptureOrchestrator::new(session.clone(), config);

    let started = Instant::now();
    let outcomes = orchestrator.run_batch(urls).await;
    session.shutdown().await;

    let failed = outcomes.iter().filter(|o| !o.success).count();
    info!(
        "Captured {}/{} URLs in {}",
        outcomes.len() - failed,
        outcomes.len(),
        format_duration(started.elapsed())
    );

    if failed > 0 {
        error!("{failed} URLs failed after exhausting retries");
        std::process::exit(1);
    }

    Ok(())
}
