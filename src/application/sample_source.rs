// Sample source trait - Host side producer of live values
use crate::application::registry::ValueMap;
use async_trait::async_trait;

#[async_trait]
pub trait SampleSource: Send {
    /// Produce the current value for each series this source feeds.
    async fn next_values(&mut self) -> anyhow::Result<ValueMap>;
}

/// Demo source: `sin(x)`, advancing `x` by a fixed step on every tick.
#[derive(Debug, Clone)]
pub struct SineSource {
    series: String,
    x: f64,
    step: f64,
}

impl SineSource {
    pub fn new(series: String, step: f64) -> Self {
        Self { series, x: 0.0, step }
    }
}

#[async_trait]
impl SampleSource for SineSource {
    async fn next_values(&mut self) -> anyhow::Result<ValueMap> {
        let value = self.x.sin();
        self.x += self.step;
        Ok(ValueMap::from([(self.series.clone(), value)]))
    }
}
