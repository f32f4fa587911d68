use crate::application::graph::GraphOptions;
use crate::domain::sample::Series;
use crate::domain::viewport::XUnit;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub graph: GraphSettings,
    #[serde(default = "default_datasets")]
    pub datasets: Vec<DatasetConfig>,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Cadence of the multipart SVG stream.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GraphSettings {
    pub title: String,
    pub default_x_duration: f64,
    pub default_x_unit: XUnit,
    pub default_y_min: f64,
    pub default_y_max: f64,
    pub default_auto_y: bool,
    pub decimal_places: u32,
    pub x_ticks: usize,
    pub y_ticks: usize,
    pub width_proportion: f64,
    pub height_proportion: f64,
    pub max_points_per_series: usize,
    pub initial_width: f64,
    pub initial_height: f64,
}

impl Default for GraphSettings {
    fn default() -> Self {
        let defaults = GraphOptions::default();
        Self {
            title: "A graph of y = sin x".to_string(),
            default_x_duration: defaults.x_duration,
            default_x_unit: defaults.x_unit,
            default_y_min: defaults.y_min,
            default_y_max: defaults.y_max,
            default_auto_y: defaults.auto_y,
            decimal_places: defaults.decimal_places,
            x_ticks: defaults.x_ticks,
            y_ticks: defaults.y_ticks,
            width_proportion: defaults.width_proportion,
            height_proportion: defaults.height_proportion,
            max_points_per_series: defaults.max_points_per_series,
            initial_width: defaults.width,
            initial_height: defaults.height,
        }
    }
}

impl GraphSettings {
    pub fn to_options(&self) -> GraphOptions {
        GraphOptions {
            title: self.title.clone(),
            x_duration: self.default_x_duration,
            x_unit: self.default_x_unit,
            y_min: self.default_y_min,
            y_max: self.default_y_max,
            auto_y: self.default_auto_y,
            decimal_places: self.decimal_places,
            x_ticks: self.x_ticks,
            y_ticks: self.y_ticks,
            width_proportion: self.width_proportion,
            height_proportion: self.height_proportion,
            max_points_per_series: self.max_points_per_series,
            width: self.initial_width,
            height: self.initial_height,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    pub key: String,
    pub label: Option<String>,
    pub color: String,
}

impl DatasetConfig {
    pub fn to_series(&self) -> Series {
        let label = self.label.clone().unwrap_or_else(|| self.key.clone());
        Series::new(self.key.clone(), label, self.color.clone())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Sine,
    /// No built-in producer; samples arrive over HTTP only.
    External,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub series: String,
    pub step: f64,
    pub interval_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Sine,
            series: "sin(x)".to_string(),
            // one degree in radians
            step: 0.0174533,
            interval_ms: 20,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_frame_interval_ms() -> u64 {
    50
}

fn default_datasets() -> Vec<DatasetConfig> {
    vec![DatasetConfig {
        key: "sin(x)".to_string(),
        label: None,
        color: "#399e41".to_string(),
    }]
}

/// Load `config/graph.*` (optional) layered under `GRAPH__*` environment overrides.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/graph").required(false))
        .add_source(config::Environment::with_prefix("GRAPH").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
