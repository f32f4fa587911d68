// Application state for HTTP handlers
use crate::application::graph::SharedGraph;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub graph: SharedGraph,
    pub frame_interval: Duration,
}
