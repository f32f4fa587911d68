// Realtime graph widget - Buffering, running/paused state and frame computation
use crate::application::registry::{DatasetRegistry, IngestReport, ValueMap};
use crate::domain::axis::{format_fixed, x_ticks, y_ticks, Tick};
use crate::domain::error::GraphError;
use crate::domain::interaction::{Crosshair, PointerState, Readout};
use crate::domain::sample::{downsample, Sample, Series};
use crate::domain::viewport::{PlotRect, RollingWindow, ValueRange, ViewportMapper, XUnit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedGraph = Arc<Mutex<RealtimeGraph>>;

/// Extra history kept behind the visible window before samples are evicted.
const RETENTION_MARGIN_MS: i64 = 1_000;
const MAX_DECIMAL_PLACES: u32 = 10;
const AUTO_Y_PADDING_FRAC: f64 = 0.05;
const AUTO_Y_MIN_PADDING: f64 = 1e-6;

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone)]
pub struct GraphOptions {
    pub title: String,
    pub x_duration: f64,
    pub x_unit: XUnit,
    pub y_min: f64,
    pub y_max: f64,
    pub auto_y: bool,
    pub decimal_places: u32,
    pub x_ticks: usize,
    pub y_ticks: usize,
    pub width_proportion: f64,
    pub height_proportion: f64,
    pub max_points_per_series: usize,
    pub width: f64,
    pub height: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_duration: 30.0,
            x_unit: XUnit::Seconds,
            y_min: -1.0,
            y_max: 1.0,
            auto_y: false,
            decimal_places: 2,
            x_ticks: 4,
            y_ticks: 4,
            width_proportion: 0.8,
            height_proportion: 0.7,
            max_points_per_series: 1_000,
            width: 800.0,
            height: 400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Mode {
    Running,
    Paused { since_ms: i64 },
}

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub x_duration: Option<f64>,
    pub x_unit: Option<XUnit>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub auto_y: Option<bool>,
    pub decimal_places: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPath {
    pub key: String,
    pub label: String,
    pub color: String,
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw the widget at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub title: String,
    pub subtitle: String,
    pub width: f64,
    pub height: f64,
    pub paused: bool,
    pub anchor_ms: i64,
    pub value_range: ValueRange,
    pub plot: Option<PlotRect>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub series: Vec<SeriesPath>,
    pub crosshair: Option<Crosshair>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub key: String,
    pub label: String,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub mode: Mode,
    pub window: RollingWindow,
    pub width: f64,
    pub height: f64,
    pub pointer: Option<PointerState>,
    pub series: Vec<SeriesSummary>,
}

#[derive(Debug)]
pub struct RealtimeGraph {
    title: String,
    registry: DatasetRegistry,
    window: RollingWindow,
    configured_range: ValueRange,
    auto_y: bool,
    decimal_places: u32,
    x_tick_count: usize,
    y_tick_count: usize,
    width_proportion: f64,
    height_proportion: f64,
    max_points_per_series: usize,
    width: f64,
    height: f64,
    pointer: Option<PointerState>,
    mode: Mode,
}

fn check_proportion(p: f64) -> Result<f64, GraphError> {
    if p.is_finite() && p > 0.0 && p <= 1.0 {
        Ok(p)
    } else {
        Err(GraphError::InvalidProportion(p))
    }
}

fn check_decimal_places(places: u32) -> Result<u32, GraphError> {
    if places > MAX_DECIMAL_PLACES {
        return Err(GraphError::InvalidDecimalPlaces {
            got: places,
            max: MAX_DECIMAL_PLACES,
        });
    }
    Ok(places)
}

fn check_dimensions(width: f64, height: f64) -> Result<(), GraphError> {
    let valid = width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0;
    if !valid {
        return Err(GraphError::InvalidDimensions { width, height });
    }
    Ok(())
}

impl RealtimeGraph {
    pub fn new(options: GraphOptions, series: Vec<Series>) -> Result<Self, GraphError> {
        check_dimensions(options.width, options.height)?;

        Ok(Self {
            window: RollingWindow::new(options.x_duration, options.x_unit)?,
            configured_range: ValueRange::new(options.y_min, options.y_max)?,
            decimal_places: check_decimal_places(options.decimal_places)?,
            width_proportion: check_proportion(options.width_proportion)?,
            height_proportion: check_proportion(options.height_proportion)?,
            title: options.title,
            registry: DatasetRegistry::new(series),
            auto_y: options.auto_y,
            x_tick_count: options.x_ticks,
            y_tick_count: options.y_ticks,
            max_points_per_series: options.max_points_per_series,
            width: options.width,
            height: options.height,
            pointer: None,
            mode: Mode::Running,
        })
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn pointer(&self) -> Option<PointerState> {
        self.pointer
    }

    pub fn window(&self) -> RollingWindow {
        self.window
    }

    pub fn plot_rect(&self) -> Option<PlotRect> {
        PlotRect::layout(self.width, self.height, self.width_proportion, self.height_proportion)
    }

    /// Append the latest values. Discarded while paused; otherwise samples
    /// that fell out of the window (plus a retention margin) are evicted.
    pub fn push(&mut self, values: &ValueMap, now_ms: i64) -> IngestReport {
        if let Mode::Paused { .. } = self.mode {
            return IngestReport {
                discarded_while_paused: values.len(),
                ..IngestReport::default()
            };
        }

        let mut report = self.registry.ingest(values, now_ms);
        let retention = self.window.millis().saturating_add(RETENTION_MARGIN_MS);
        let cutoff = now_ms.saturating_sub(retention);
        report.evicted = self.registry.evict_before(cutoff);
        report
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), GraphError> {
        check_dimensions(width, height)?;
        if (width, height) != (self.width, self.height) {
            tracing::debug!("Surface resized to {}x{}", width, height);
            self.width = width;
            self.height = height;
            self.pointer = None;
        }
        Ok(())
    }

    /// Track the pointer in surface coordinates. Returns whether it is over the plot.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.pointer = self
            .plot_rect()
            .and_then(|rect| PointerState::track(&rect, x, y));
        self.pointer.is_some()
    }

    pub fn pointer_leave(&mut self) {
        self.pointer = None;
    }

    pub fn toggle_pause(&mut self, now_ms: i64) -> Mode {
        self.mode = match self.mode {
            Mode::Running => Mode::Paused { since_ms: now_ms },
            Mode::Paused { .. } => Mode::Running,
        };
        tracing::info!("Graph mode changed to {:?}", self.mode);
        self.mode
    }

    /// Apply a settings patch atomically: either every field is valid and
    /// applied, or the graph is left untouched.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<(), GraphError> {
        let window = RollingWindow::new(
            patch.x_duration.unwrap_or(self.window.duration),
            patch.x_unit.unwrap_or(self.window.unit),
        )?;
        let range = ValueRange::new(
            patch.y_min.unwrap_or(self.configured_range.min),
            patch.y_max.unwrap_or(self.configured_range.max),
        )?;
        let decimal_places = check_decimal_places(patch.decimal_places.unwrap_or(self.decimal_places))?;

        self.window = window;
        self.configured_range = range;
        self.decimal_places = decimal_places;
        if let Some(auto_y) = patch.auto_y {
            self.auto_y = auto_y;
        }
        tracing::info!(
            "Graph settings updated: window={} {}, range=[{}, {}], auto_y={}",
            self.window.duration,
            self.window.unit,
            self.configured_range.min,
            self.configured_range.max,
            self.auto_y
        );
        Ok(())
    }

    /// Frames are anchored at the pause instant while paused, so the plot stops scrolling.
    fn anchor(&self, now_ms: i64) -> i64 {
        match self.mode {
            Mode::Running => now_ms,
            Mode::Paused { since_ms } => since_ms,
        }
    }

    fn value_range(&self, start_ms: i64, end_ms: i64) -> ValueRange {
        if !self.auto_y {
            return self.configured_range;
        }

        let (min, max) = self
            .registry
            .iter()
            .flat_map(|s| s.visible(start_ms, end_ms))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.value), hi.max(p.value))
            });

        if min > max {
            return self.configured_range;
        }

        let span = max - min;
        let fitted = if span == 0.0 {
            ValueRange::new(min - 0.5, max + 0.5)
        } else {
            let pad = (span * AUTO_Y_PADDING_FRAC).max(AUTO_Y_MIN_PADDING);
            ValueRange::new(min - pad, max + pad)
        };
        fitted.unwrap_or_else(|_| {
            tracing::debug!("Visible values [{}, {}] overflow the y axis, using configured range", min, max);
            self.configured_range
        })
    }

    fn readouts(&self, start_ms: i64, end_ms: i64, time_ms: f64) -> Vec<Readout> {
        self.registry
            .iter()
            .filter_map(|s| {
                let nearest = s
                    .visible(start_ms, end_ms)
                    .min_by(|a, b| {
                        let da = (a.time_ms as f64 - time_ms).abs();
                        let db = (b.time_ms as f64 - time_ms).abs();
                        da.total_cmp(&db)
                    })?;
                Some(Readout {
                    key: s.key.clone(),
                    label: s.label.clone(),
                    color: s.color.clone(),
                    time_ms: nearest.time_ms,
                    value: nearest.value,
                    value_label: format_fixed(nearest.value, self.decimal_places),
                })
            })
            .collect()
    }

    pub fn render(&self, now_ms: i64) -> Frame {
        let anchor = self.anchor(now_ms);
        let (start, end) = self.window.bounds(anchor);
        let value_range = self.value_range(start, end);

        let mut frame = Frame {
            title: self.title.clone(),
            subtitle: format!("(Showing past {} {} of data)", self.window.duration, self.window.unit),
            width: self.width,
            height: self.height,
            paused: matches!(self.mode, Mode::Paused { .. }),
            anchor_ms: anchor,
            value_range,
            plot: None,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            series: Vec::new(),
            crosshair: None,
        };

        let Some(rect) = self.plot_rect() else {
            tracing::trace!("Surface has no drawable area, skipping geometry");
            return frame;
        };

        let mapper = ViewportMapper::new(rect, start, end, value_range);
        frame.plot = Some(rect);
        frame.x_ticks = x_ticks(&rect, &self.window, self.x_tick_count);
        frame.y_ticks = y_ticks(&rect, &value_range, self.y_tick_count, self.decimal_places);
        frame.series = self
            .registry
            .iter()
            .map(|s| {
                let visible: Vec<Sample> = s.visible(start, end).copied().collect();
                let points = downsample(visible, self.max_points_per_series)
                    .iter()
                    .map(|p| mapper.project(p))
                    .collect();
                SeriesPath {
                    key: s.key.clone(),
                    label: s.label.clone(),
                    color: s.color.clone(),
                    points,
                }
            })
            .collect();
        frame.crosshair = self.pointer.map(|pointer| {
            let mut crosshair = Crosshair::derive(&mapper, &pointer, self.window.unit, self.decimal_places);
            crosshair.readouts = self.readouts(start, end, crosshair.time_ms);
            crosshair
        });

        frame
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            mode: self.mode,
            window: self.window,
            width: self.width,
            height: self.height,
            pointer: self.pointer,
            series: self
                .registry
                .iter()
                .map(|s| SeriesSummary {
                    key: s.key.clone(),
                    label: s.label.clone(),
                    samples: s.len(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn sine_graph(duration: f64) -> RealtimeGraph {
        let options = GraphOptions {
            title: "A graph of y = sin x".to_string(),
            x_duration: duration,
            width: 1_000.0,
            height: 500.0,
            ..GraphOptions::default()
        };
        let series = vec![Series::new("sin(x)".to_string(), "sin(x)".to_string(), "#399e41".to_string())];
        RealtimeGraph::new(options, series).unwrap()
    }

    fn values(v: f64) -> ValueMap {
        ValueMap::from([("sin(x)".to_string(), v)])
    }

    #[test]
    fn test_end_to_end_five_points_in_window() {
        let mut graph = sine_graph(10.0);
        for (i, v) in [0.0, 0.5, 1.0, 0.5, 0.0].into_iter().enumerate() {
            graph.push(&values(v), T0 + i as i64 * 1_000);
        }

        let frame = graph.render(T0 + 5_000);
        let rect = frame.plot.unwrap();
        let points = &frame.series[0].points;

        assert_eq!(points.len(), 5);
        assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(points.iter().all(|&(x, y)| {
            x >= rect.left && x <= rect.right() && y >= rect.top && y <= rect.bottom()
        }));
    }

    #[test]
    fn test_sample_on_window_start_is_visible() {
        let mut graph = sine_graph(10.0);
        graph.push(&values(0.25), T0);

        let frame = graph.render(T0 + 10_000);
        assert_eq!(frame.series[0].points.len(), 1);
        let (x, _) = frame.series[0].points[0];
        assert!((x - frame.plot.unwrap().left).abs() < 1e-9);

        let later = graph.render(T0 + 10_001);
        assert!(later.series[0].points.is_empty());
    }

    #[test]
    fn test_eviction_bounds_buffer_and_keeps_window() {
        let mut graph = sine_graph(10.0);
        for i in 0..100 {
            graph.push(&values(0.0), T0 + i * 500);
        }

        let now = T0 + 99 * 500;
        let series = graph.registry().get("sin(x)").unwrap();
        let oldest = series.samples().front().unwrap().time_ms;
        assert!(oldest >= now - 10_000 - RETENTION_MARGIN_MS);
        // every sample in [now - 10s, now] survives: 21 samples at 500ms spacing
        assert_eq!(series.visible(now - 10_000, now).count(), 21);
        assert!(series.len() <= 23);
    }

    #[test]
    fn test_pause_discards_samples_and_freezes_frame() {
        let mut graph = sine_graph(10.0);
        graph.push(&values(0.0), T0);
        graph.toggle_pause(T0 + 1_000);

        let report = graph.push(&values(1.0), T0 + 2_000);
        assert_eq!(report.discarded_while_paused, 1);
        assert_eq!(report.appended, 0);
        assert_eq!(graph.registry().get("sin(x)").unwrap().len(), 1);

        let a = graph.render(T0 + 3_000);
        let b = graph.render(T0 + 8_000);
        assert!(a.paused);
        assert_eq!(a.anchor_ms, T0 + 1_000);
        assert_eq!(a.series, b.series);

        assert_eq!(graph.toggle_pause(T0 + 9_000), Mode::Running);
        assert_eq!(graph.render(T0 + 9_000).anchor_ms, T0 + 9_000);
    }

    #[test]
    fn test_invalid_settings_leave_state_unchanged() {
        let mut graph = sine_graph(30.0);
        let bad = SettingsPatch {
            x_duration: Some(5.0),
            y_min: Some(2.0),
            y_max: Some(1.0),
            ..SettingsPatch::default()
        };

        assert!(matches!(
            graph.update_settings(&bad),
            Err(GraphError::InvalidValueRange { .. })
        ));
        assert_eq!(graph.window().duration, 30.0);

        let good = SettingsPatch {
            x_duration: Some(2.0),
            x_unit: Some(XUnit::Minutes),
            ..SettingsPatch::default()
        };
        graph.update_settings(&good).unwrap();
        let frame = graph.render(T0);
        assert_eq!(frame.subtitle, "(Showing past 2 minutes of data)");
        assert_eq!(frame.x_ticks.last().map(|t| t.label.as_str()), Some("-2min"));
    }

    #[test]
    fn test_auto_y_covers_visible_values() {
        let mut graph = sine_graph(10.0);
        graph
            .update_settings(&SettingsPatch {
                auto_y: Some(true),
                ..SettingsPatch::default()
            })
            .unwrap();
        graph.push(&values(5.0), T0);
        graph.push(&values(15.0), T0 + 1_000);

        let frame = graph.render(T0 + 2_000);
        assert!(frame.value_range.min < 5.0);
        assert!(frame.value_range.max > 15.0);
        assert_eq!(frame.y_ticks.len(), 4);
    }

    #[test]
    fn test_auto_y_widens_flat_series() {
        let mut graph = sine_graph(10.0);
        graph
            .update_settings(&SettingsPatch {
                auto_y: Some(true),
                ..SettingsPatch::default()
            })
            .unwrap();
        graph.push(&values(3.0), T0);
        graph.push(&values(3.0), T0 + 1_000);

        let frame = graph.render(T0 + 1_000);
        assert_eq!(frame.value_range, ValueRange { min: 2.5, max: 3.5 });
    }

    #[test]
    fn test_auto_y_with_extreme_values_stays_finite() {
        let mut graph = sine_graph(10.0);
        graph
            .update_settings(&SettingsPatch {
                auto_y: Some(true),
                ..SettingsPatch::default()
            })
            .unwrap();
        graph.push(&values(-1e308), T0);
        graph.push(&values(1e308), T0 + 1_000);

        let frame = graph.render(T0 + 2_000);
        assert_eq!(frame.value_range, ValueRange { min: -1.0, max: 1.0 });
        assert_eq!(frame.series[0].points.len(), 2);
        for (x, y) in &frame.series[0].points {
            assert!(x.is_finite() && y.is_finite());
        }
        for tick in &frame.y_ticks {
            assert!(tick.position.is_finite());
            assert!(!tick.label.contains("NaN") && !tick.label.contains("inf"));
        }
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let mut graph = sine_graph(30.0);
        let huge = SettingsPatch {
            x_duration: Some(1e300),
            ..SettingsPatch::default()
        };
        assert_eq!(graph.update_settings(&huge), Err(GraphError::InvalidWindow(1e300)));

        let unbounded_range = SettingsPatch {
            y_min: Some(-1e308),
            y_max: Some(1e308),
            ..SettingsPatch::default()
        };
        assert!(graph.update_settings(&unbounded_range).is_err());

        graph.push(&values(0.5), T0);
        assert_eq!(graph.registry().get("sin(x)").unwrap().len(), 1);
    }

    #[test]
    fn test_largest_window_keeps_samples() {
        let mut graph = sine_graph(9.2e15);
        let first = graph.push(&values(0.25), T0);
        let second = graph.push(&values(0.75), T0 + 1_000);

        assert_eq!((first.evicted, second.evicted), (0, 0));
        assert_eq!(graph.registry().get("sin(x)").unwrap().len(), 2);
        let frame = graph.render(T0 + 1_000);
        assert_eq!(frame.series[0].points.len(), 2);
        assert!(frame.series[0].points.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn test_degenerate_configured_range_stays_finite() {
        let options = GraphOptions {
            y_min: 0.0,
            y_max: 0.0,
            ..GraphOptions::default()
        };
        let series = vec![Series::new("a".to_string(), "a".to_string(), "#000".to_string())];
        let mut graph = RealtimeGraph::new(options, series).unwrap();
        graph.push(&ValueMap::from([("a".to_string(), 4.0)]), T0);

        let frame = graph.render(T0);
        let rect = frame.plot.unwrap();
        let (x, y) = frame.series[0].points[0];
        assert!(x.is_finite() && y.is_finite());
        assert!((y - (rect.top + rect.height / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_surface_renders_no_geometry() {
        let mut graph = sine_graph(10.0);
        graph.push(&values(0.5), T0);
        graph.resize(0.0, 0.0).unwrap();

        let frame = graph.render(T0);
        assert!(frame.plot.is_none());
        assert!(frame.x_ticks.is_empty());
        assert!(frame.series.is_empty());
        assert!(graph.resize(f64::NAN, 10.0).is_err());
        assert!(graph.resize(-1.0, 10.0).is_err());
    }

    #[test]
    fn test_crosshair_follows_pointer() {
        let mut graph = sine_graph(10.0);
        for i in 0..=10 {
            graph.push(&values(i as f64 / 10.0), T0 + i * 1_000);
        }

        assert!(!graph.pointer_move(10.0, 10.0));
        assert!(graph.render(T0 + 10_000).crosshair.is_none());

        // plot spans x 100..900, so 500 is 5s behind now
        assert!(graph.pointer_move(500.0, 250.0));
        let crosshair = graph.render(T0 + 10_000).crosshair.unwrap();
        assert_eq!(crosshair.time_label, "-5s");
        assert_eq!(crosshair.value_label, "0.00");
        assert_eq!(crosshair.readouts.len(), 1);
        assert_eq!(crosshair.readouts[0].time_ms, T0 + 5_000);
        assert_eq!(crosshair.readouts[0].value_label, "0.50");

        graph.pointer_leave();
        assert!(graph.render(T0 + 10_000).crosshair.is_none());
    }

    #[test]
    fn test_rendered_points_are_capped() {
        let options = GraphOptions {
            max_points_per_series: 50,
            ..GraphOptions::default()
        };
        let series = vec![Series::new("a".to_string(), "a".to_string(), "#000".to_string())];
        let mut graph = RealtimeGraph::new(options, series).unwrap();
        for i in 0..1_000 {
            graph.push(&ValueMap::from([("a".to_string(), 0.0)]), T0 + i * 20);
        }

        let frame = graph.render(T0 + 999 * 20);
        assert!(frame.series[0].points.len() <= 50);
        assert!(!frame.series[0].points.is_empty());
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let options = GraphOptions {
            width_proportion: 1.5,
            ..GraphOptions::default()
        };
        assert!(matches!(
            RealtimeGraph::new(options, Vec::new()),
            Err(GraphError::InvalidProportion(_))
        ));

        let options = GraphOptions {
            decimal_places: 42,
            ..GraphOptions::default()
        };
        assert!(RealtimeGraph::new(options, Vec::new()).is_err());
    }
}
