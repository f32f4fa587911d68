// Infrastructure layer - Configuration, rendering and HTTP plumbing
pub mod config;
pub mod frame_stream;
pub mod http_response;
pub mod svg_renderer;
