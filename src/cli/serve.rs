//! HTTP server for the converter page.

use crate::cli::Output;
use crate::pipeline::BlogGenerator;
use crate::web::{router, AppState};
use std::sync::Arc;
use tracing::info;

/// Run the web server until interrupted.
pub async fn run_serve(host: &str, port: u16, generator: Arc<dyn BlogGenerator>) -> anyhow::Result<()> {
    let app = router(Arc::new(AppState::new(generator)));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("YouTube to Blog Converter");
    println!();
    Output::success(&format!("Open http://{} in your browser", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Page", "GET  /");
    Output::kv("Generate (form)", "POST /generate");
    Output::kv("Generate (JSON)", "POST /api/generate");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
