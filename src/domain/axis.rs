// Axis ticks and label formatting
use super::viewport::{PlotRect, RollingWindow, ValueRange};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    /// Pixel position along the axis (x for the time axis, y for the value axis).
    pub position: f64,
    /// Data value at the tick: time offset in window units, or the y value.
    pub value: f64,
    pub label: String,
}

/// Round half-up (towards positive infinity) to `places` decimals.
pub fn round_half_up(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    // magnitudes this large carry no fractional digits
    if !scaled.is_finite() {
        return value;
    }
    let rounded = (scaled + 0.5).floor() / factor;
    // -0.0 prints as "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Fixed-point formatting with exactly `places` decimals.
pub fn format_fixed(value: f64, places: u32) -> String {
    format!("{:.*}", places as usize, round_half_up(value, places))
}

/// Label for a time offset behind "now": `-10s`, `-1.5min`, and `0s` for the newest edge.
pub fn format_offset(magnitude: f64, suffix: &str) -> String {
    let rounded = round_half_up(magnitude.abs(), 1);
    if rounded == 0.0 {
        format!("0{}", suffix)
    } else {
        format!("-{}{}", rounded, suffix)
    }
}

/// Ticks along the time axis, right edge first (offset 0) then stepping back
/// in time towards the left edge.
pub fn x_ticks(rect: &PlotRect, window: &RollingWindow, count: usize) -> Vec<Tick> {
    let n = count.max(2);
    let step_px = rect.width / (n - 1) as f64;
    let step_value = window.duration / (n - 1) as f64;

    (0..n)
        .map(|i| {
            let value = step_value * i as f64;
            Tick {
                position: rect.right() - step_px * i as f64,
                value,
                label: format_offset(value, window.unit.suffix()),
            }
        })
        .collect()
}

/// Ticks along the value axis, bottom (min) first.
pub fn y_ticks(rect: &PlotRect, range: &ValueRange, count: usize, decimal_places: u32) -> Vec<Tick> {
    let n = count.max(2);
    let step_px = rect.height / (n - 1) as f64;
    let step_value = range.span() / (n - 1) as f64;

    (0..n)
        .map(|i| {
            let value = range.min + step_value * i as f64;
            Tick {
                position: rect.bottom() - step_px * i as f64,
                value,
                label: format_fixed(value, decimal_places),
            }
        })
        .collect()
}
