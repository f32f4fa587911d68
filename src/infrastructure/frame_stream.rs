// Multipart SVG streaming: one `multipart/x-mixed-replace` part per rendered frame
use crate::application::graph::{now_ms, Frame, SharedGraph};
use crate::infrastructure::http_response::SVG_CONTENT_TYPE;
use crate::infrastructure::svg_renderer::render_svg;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const BOUNDARY: &str = "rg-frame";

/// Create a streaming response that replaces the displayed SVG on every part.
pub fn multipart_svg_stream<S>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Frame> + Send + 'static,
{
    let byte_stream = stream.map(|frame| serialize_part(&frame));
    let body = Body::from_stream(byte_stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/x-mixed-replace; boundary={}", BOUNDARY),
        )
        .header(header::CACHE_CONTROL, "no-store")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single frame to one multipart part.
fn serialize_part(frame: &Frame) -> Result<Bytes, std::io::Error> {
    let svg = render_svg(frame).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let head = format!(
        "--{}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        BOUNDARY,
        SVG_CONTENT_TYPE,
        svg.len()
    );
    let mut part = BytesMut::with_capacity(head.len() + svg.len() + 2);
    part.put_slice(head.as_bytes());
    part.put_slice(svg.as_bytes());
    part.put_slice(b"\r\n");

    Ok(part.freeze())
}

/// Render the shared graph on a fixed cadence for as long as the client stays connected.
pub fn frames_from_graph(graph: SharedGraph, interval: Duration) -> impl Stream<Item = Frame> + Send + 'static {
    async_stream::stream! {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let frame = graph.lock().await.render(now_ms());
            yield frame;
        }
    }
}

/// Helper to create the streaming response for a shared graph
pub fn stream_graph(graph: SharedGraph, interval: Duration) -> impl IntoResponse {
    match multipart_svg_stream(frames_from_graph(graph, interval)) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
