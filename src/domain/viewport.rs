// Viewport geometry: plot layout, rolling window and the (time, value) <-> pixel transform
use super::error::GraphError;
use super::sample::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XUnit {
    Seconds,
    Minutes,
}

impl XUnit {
    pub fn millis(self) -> f64 {
        match self {
            XUnit::Seconds => 1_000.0,
            XUnit::Minutes => 60_000.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            XUnit::Seconds => "s",
            XUnit::Minutes => "min",
        }
    }
}

impl fmt::Display for XUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XUnit::Seconds => f.write_str("seconds"),
            XUnit::Minutes => f.write_str("minutes"),
        }
    }
}

impl FromStr for XUnit {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seconds" => Ok(XUnit::Seconds),
            "minutes" => Ok(XUnit::Minutes),
            other => Err(GraphError::UnknownUnit(other.to_string())),
        }
    }
}

/// Trailing time span shown on the x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingWindow {
    pub duration: f64,
    pub unit: XUnit,
}

impl RollingWindow {
    /// Rejects non-positive durations and spans that do not fit in `i64` milliseconds.
    pub fn new(duration: f64, unit: XUnit) -> Result<Self, GraphError> {
        let fits = duration * unit.millis() < i64::MAX as f64;
        if !duration.is_finite() || duration <= 0.0 || !fits {
            return Err(GraphError::InvalidWindow(duration));
        }
        Ok(Self { duration, unit })
    }

    pub fn millis(&self) -> i64 {
        (self.duration * self.unit.millis()).round() as i64
    }

    /// `[now - D, now]`
    pub fn bounds(&self, now_ms: i64) -> (i64, i64) {
        (now_ms.saturating_sub(self.millis()), now_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Result<Self, GraphError> {
        if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
            return Err(GraphError::InvalidValueRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }
}

/// The white plotting rectangle inside the SVG surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    /// Center a `width_proportion x height_proportion` rectangle inside the
    /// surface. Returns `None` when the surface has no drawable area.
    pub fn layout(
        surface_width: f64,
        surface_height: f64,
        width_proportion: f64,
        height_proportion: f64,
    ) -> Option<Self> {
        let drawable = surface_width.is_finite()
            && surface_height.is_finite()
            && surface_width > 0.0
            && surface_height > 0.0;
        if !drawable {
            return None;
        }
        Some(Self {
            left: surface_width * (1.0 - width_proportion) / 2.0,
            top: surface_height * (1.0 - height_proportion) / 2.0,
            width: surface_width * width_proportion,
            height: surface_height * height_proportion,
        })
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

/// How many plot heights a projected point may sit beyond the value range.
const MAX_OVERSHOOT: f64 = 1e6;

/// Linear transform between the data domain and pixel space for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMapper {
    rect: PlotRect,
    window_start_ms: i64,
    now_ms: i64,
    range: ValueRange,
}

impl ViewportMapper {
    pub fn new(rect: PlotRect, window_start_ms: i64, now_ms: i64, range: ValueRange) -> Self {
        Self {
            rect,
            window_start_ms,
            now_ms,
            range,
        }
    }

    pub fn rect(&self) -> &PlotRect {
        &self.rect
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    fn time_span(&self) -> f64 {
        self.now_ms.saturating_sub(self.window_start_ms) as f64
    }

    pub fn x(&self, time_ms: f64) -> f64 {
        let span = self.time_span();
        if span <= 0.0 {
            return self.rect.right();
        }
        self.rect.left + self.rect.width * (time_ms - self.window_start_ms as f64) / span
    }

    /// Degenerate ranges (`max == min`) map to the vertical middle of the plot.
    pub fn y(&self, value: f64) -> f64 {
        if self.range.is_degenerate() {
            return self.rect.top + self.rect.height / 2.0;
        }
        self.rect.top + self.rect.height * (1.0 - self.value_fraction(value))
    }

    /// Position of `value` within the range, 0 at `min` and 1 at `max`.
    /// Values whose offset overflows are pinned a bounded distance outside the plot.
    fn value_fraction(&self, value: f64) -> f64 {
        let t = (value - self.range.min) / self.range.span();
        if t.is_nan() {
            return 0.5;
        }
        t.clamp(-MAX_OVERSHOOT, 1.0 + MAX_OVERSHOOT)
    }

    pub fn project(&self, sample: &Sample) -> (f64, f64) {
        (self.x(sample.time_ms as f64), self.y(sample.value))
    }

    pub fn time_at(&self, x: f64) -> f64 {
        let span = self.time_span();
        if span <= 0.0 || self.rect.width <= 0.0 {
            return self.now_ms as f64;
        }
        self.window_start_ms as f64 + (x - self.rect.left) / self.rect.width * span
    }

    pub fn value_at(&self, y: f64) -> f64 {
        if self.range.is_degenerate() || self.rect.height <= 0.0 {
            return self.range.min;
        }
        self.range.min + (1.0 - (y - self.rect.top) / self.rect.height) * self.range.span()
    }
}
