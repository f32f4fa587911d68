// HTTP request handlers
use crate::application::graph::{now_ms, GraphSummary, Mode, SettingsPatch};
use crate::application::registry::{IngestReport, ValueMap};
use crate::domain::error::GraphError;
use crate::infrastructure::frame_stream::stream_graph;
use crate::infrastructure::http_response::{accepts_brotli, svg_response};
use crate::infrastructure::svg_renderer::render_svg;
use crate::presentation::app_state::AppState;
use crate::presentation::page::INDEX_HTML;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

impl IntoResponse for GraphError {
    fn into_response(self) -> Response {
        tracing::warn!("Rejected graph request: {}", self);
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PointerRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct PointerResponse {
    pub inside: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub width: f64,
    pub height: f64,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Render the current frame as SVG
pub async fn graph_svg(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let frame = state.graph.lock().await.render(now_ms());

    let svg = match render_svg(&frame) {
        Ok(svg) => svg,
        Err(e) => {
            tracing::error!("SVG rendering failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match svg_response(svg, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream frames as multipart/x-mixed-replace
pub async fn graph_stream(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Opening frame stream ({:?} cadence)", state.frame_interval);
    stream_graph(state.graph.clone(), state.frame_interval)
}

pub async fn graph_state(State(state): State<Arc<AppState>>) -> Json<GraphSummary> {
    Json(state.graph.lock().await.summary())
}

/// Ingest a value map from an external producer
pub async fn push_samples(
    State(state): State<Arc<AppState>>,
    Json(values): Json<ValueMap>,
) -> Json<IngestReport> {
    let report = state.graph.lock().await.push(&values, now_ms());
    Json(report)
}

pub async fn pointer_move(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PointerRequest>,
) -> Json<PointerResponse> {
    let inside = state.graph.lock().await.pointer_move(req.x, req.y);
    Json(PointerResponse { inside })
}

pub async fn pointer_leave(State(state): State<Arc<AppState>>) -> StatusCode {
    state.graph.lock().await.pointer_leave();
    StatusCode::NO_CONTENT
}

pub async fn resize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResizeRequest>,
) -> Result<StatusCode, GraphError> {
    state.graph.lock().await.resize(req.width, req.height)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_pause(State(state): State<Arc<AppState>>) -> Json<Mode> {
    Json(state.graph.lock().await.toggle_pause(now_ms()))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<GraphSummary>, GraphError> {
    let mut graph = state.graph.lock().await;
    graph.update_settings(&patch)?;
    Ok(Json(graph.summary()))
}
