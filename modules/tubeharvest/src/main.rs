use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tubeharvest::harvester::Harvester;
use tubeharvest::surface::LiveSurface;
use tubeharvest::templates;
use tubeharvest_common::Config;
use webdriver_client::BrowserSession;

/// Harvest a channel's videos and their comment threads into an HTML report.
#[derive(Parser, Debug)]
#[command(name = "tubeharvest")]
struct Args {
    /// Channel or listing URL to harvest.
    url: String,

    /// Where to write the HTML report.
    #[arg(long, default_value = "report.html")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tubeharvest=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    info!("Tubeharvest starting...");

    // Failing to acquire the browser is the one unrecoverable failure class;
    // everything past this point degrades instead of aborting.
    let session = BrowserSession::connect(
        &config.webdriver_url,
        config.headless,
        &config.accept_languages,
    )
    .await
    .context("Failed to acquire a WebDriver session")?;

    let page = LiveSurface::new(&session, config.settle);
    let harvester = Harvester::new(&page, &config);
    let harvested = harvester.harvest(&args.url).await;

    let videos = match harvested {
        Ok(videos) => videos,
        Err(err) => {
            let _ = session.quit().await;
            return Err(err);
        }
    };

    if videos.is_empty() {
        info!("Nothing harvested; no report written");
        let _ = session.quit().await;
        return Ok(());
    }

    let html = templates::render_report(&videos);
    std::fs::write(&args.out, html)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!(
        videos = videos.len(),
        out = %args.out.display(),
        "Report written"
    );

    if let Err(err) = session.quit().await {
        warn!(error = %err, "WebDriver session did not shut down cleanly");
    }

    Ok(())
}
