// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::driver::SampleDriver;
use crate::application::graph::RealtimeGraph;
use crate::application::sample_source::SineSource;
use crate::infrastructure::config::{load_app_config, SourceKind};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    graph_state, graph_stream, graph_svg, health_check, index, pointer_leave, pointer_move,
    push_samples, resize, toggle_pause, update_settings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create the widget (application layer)
    let series = config.datasets.iter().map(|d| d.to_series()).collect();
    let graph = Arc::new(Mutex::new(RealtimeGraph::new(config.graph.to_options(), series)?));

    // Start the host timer that feeds samples into the widget
    let driver = match config.source.kind {
        SourceKind::Sine => {
            let source = SineSource::new(config.source.series.clone(), config.source.step);
            let interval = Duration::from_millis(config.source.interval_ms.max(1));
            Some(SampleDriver::spawn(graph.clone(), source, interval))
        }
        SourceKind::External => None,
    };

    // Create application state
    let state = Arc::new(AppState {
        graph,
        frame_interval: Duration::from_millis(config.server.frame_interval_ms.max(1)),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/graph.svg", get(graph_svg))
        .route("/graph/stream", get(graph_stream))
        .route("/graph/state", get(graph_state))
        .route("/graph/samples", post(push_samples))
        .route("/graph/pointer", post(pointer_move).delete(pointer_leave))
        .route("/graph/resize", post(resize))
        .route("/graph/pause", post(toggle_pause))
        .route("/graph/settings", post(update_settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting realtime-graph on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(driver) = driver {
        driver.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
