use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use launch_core::{HttpStatusPoller, LaunchRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod scene;

use config::load_settings;
use scene::Scene;

#[derive(Parser, Debug)]
#[command(about = "Night-sky launch visualizer driven by a polled status feed")]
struct Args {
    #[arg(long, default_value = "launchpad.toml")]
    config: PathBuf,
    #[arg(long)]
    status_url: Option<String>,
    #[arg(long)]
    stats_url: Option<String>,
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    settings.apply_cli(args.status_url, args.stats_url, args.log_filter);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let poller = HttpStatusPoller::new(settings.poller_config()?)
        .context("failed to build HTTP client")?;
    let scene = Scene::new(settings.star_count, settings.star_seed);
    let runtime = LaunchRuntime::new(scene, settings.runtime_config()?);

    info!(
        status_url = %settings.status_url,
        stats_url = settings.stats_url.as_deref().unwrap_or("-"),
        "launchpad starting"
    );
    let scene = runtime
        .run(Arc::new(poller), async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    info!(
        frames = scene.frame_count(),
        timeline = scene.timeline().name(),
        skyline = scene.skyline().asset_key(),
        rocket = scene.rocket().sprite.texture_name(),
        stars = scene.stars().stars().len(),
        stats = %scene.stats_text().success,
        "launchpad stopped"
    );
    Ok(())
}
