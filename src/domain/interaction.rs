// Pointer tracking and crosshair readout
use super::axis::{format_fixed, format_offset};
use super::viewport::{PlotRect, ViewportMapper, XUnit};
use serde::Serialize;

/// Pointer position relative to the plot rectangle's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
}

impl PointerState {
    /// Track a pointer given in surface coordinates. Positions outside the
    /// plot rectangle produce no pointer state.
    pub fn track(rect: &PlotRect, surface_x: f64, surface_y: f64) -> Option<Self> {
        if !surface_x.is_finite() || !surface_y.is_finite() || !rect.contains(surface_x, surface_y) {
            return None;
        }
        Some(Self {
            x: surface_x - rect.left,
            y: surface_y - rect.top,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    pub key: String,
    pub label: String,
    pub color: String,
    pub time_ms: i64,
    pub value: f64,
    pub value_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crosshair {
    /// Surface x of the vertical guide.
    pub x: f64,
    /// Surface y of the horizontal guide.
    pub y: f64,
    pub time_ms: f64,
    pub value: f64,
    pub time_label: String,
    pub value_label: String,
    pub readouts: Vec<Readout>,
}

impl Crosshair {
    pub fn derive(
        mapper: &ViewportMapper,
        pointer: &PointerState,
        unit: XUnit,
        decimal_places: u32,
    ) -> Self {
        let rect = mapper.rect();
        let x = rect.left + pointer.x;
        let y = rect.top + pointer.y;
        let time_ms = mapper.time_at(x);
        let value = mapper.value_at(y);
        let behind = (mapper.now_ms() as f64 - time_ms) / unit.millis();

        Self {
            x,
            y,
            time_ms,
            value,
            time_label: format_offset(behind, unit.suffix()),
            value_label: format_fixed(value, decimal_places),
            readouts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::viewport::ValueRange;

    #[test]
    fn test_track_inside_and_outside() {
        let rect = PlotRect::layout(1_000.0, 500.0, 0.8, 0.7).unwrap();
        let p = PointerState::track(&rect, 150.0, 100.0).unwrap();
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y - 25.0).abs() < 1e-9);
        assert!(PointerState::track(&rect, 50.0, 100.0).is_none());
        assert!(PointerState::track(&rect, 150.0, 480.0).is_none());
    }

    #[test]
    fn test_crosshair_reads_time_and_value() {
        let rect = PlotRect::layout(1_000.0, 500.0, 0.8, 0.7).unwrap();
        let mapper = ViewportMapper::new(rect, 70_000, 100_000, ValueRange::new(-1.0, 1.0).unwrap());
        // middle of the plot: 15s behind now, value 0
        let pointer = PointerState { x: 400.0, y: 175.0 };
        let c = Crosshair::derive(&mapper, &pointer, XUnit::Seconds, 2);

        assert_eq!((c.x, c.y), (500.0, 250.0));
        assert!((c.time_ms - 85_000.0).abs() < 1e-6);
        assert_eq!(c.time_label, "-15s");
        assert_eq!(c.value_label, "0.00");
    }
}
