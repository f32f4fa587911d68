// Graph domain errors

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("surface dimensions must be finite and non-negative, got {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("rolling window must be a positive finite duration, got {0}")]
    InvalidWindow(f64),

    #[error("value range is invalid: min {min} must be finite and not exceed max {max}")]
    InvalidValueRange { min: f64, max: f64 },

    #[error("decimal places must be at most {max}, got {got}")]
    InvalidDecimalPlaces { got: u32, max: u32 },

    #[error("plot proportion must lie in (0, 1], got {0}")]
    InvalidProportion(f64),

    #[error("unknown x-axis unit `{0}`")]
    UnknownUnit(String),
}
