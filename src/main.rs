//! Tubeblog entry point.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubeblog::cli::{preflight, run_serve, Cli, Output};
use tubeblog::config::Settings;
use tubeblog::pipeline::BlogPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("tubeblog={},tower_http={}", log_level, log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    for problem in preflight::check_all() {
        Output::warning(&format!("{}. Channel searches will fail until it is installed.", problem));
    }

    let host = cli.host.clone().unwrap_or_else(|| settings.server.host.clone());
    let port = cli.port.unwrap_or(settings.server.port);

    let pipeline = BlogPipeline::new(settings)?;
    run_serve(&host, port, Arc::new(pipeline)).await?;

    Ok(())
}
