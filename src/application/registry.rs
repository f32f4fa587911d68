// Dataset registry - Per-series sample buffers
use crate::domain::sample::Series;
use serde::Serialize;
use std::collections::BTreeMap;

/// Latest value per series key, as handed over by the sample source.
pub type ValueMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub appended: usize,
    pub unknown_keys: Vec<String>,
    pub non_finite: usize,
    pub discarded_while_paused: usize,
    pub evicted: usize,
}

/// Series seeded once at construction; never grows or shrinks afterwards.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    series: Vec<Series>,
}

impl DatasetRegistry {
    pub fn new(series: Vec<Series>) -> Self {
        let mut registry = Self { series: Vec::with_capacity(series.len()) };
        for s in series {
            if registry.get(&s.key).is_some() {
                tracing::warn!("Duplicate dataset key {} ignored", s.key);
                continue;
            }
            registry.series.push(s);
        }
        registry
    }

    pub fn get(&self, key: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.key == key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Series> {
        self.series.iter_mut().find(|s| s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Append one sample per known key, all stamped with `now_ms`.
    pub fn ingest(&mut self, values: &ValueMap, now_ms: i64) -> IngestReport {
        let mut report = IngestReport::default();

        for (key, &value) in values {
            if !value.is_finite() {
                tracing::debug!("Rejecting non-finite value for series {}", key);
                report.non_finite += 1;
                continue;
            }

            match self.get_mut(key) {
                Some(series) => {
                    series.append(now_ms, value);
                    report.appended += 1;
                }
                None => {
                    tracing::debug!("Skipping sample for unknown series {}", key);
                    report.unknown_keys.push(key.clone());
                }
            }
        }

        report
    }

    /// Drop samples older than `cutoff_ms` from every series.
    pub fn evict_before(&mut self, cutoff_ms: i64) -> usize {
        self.series.iter_mut().map(|s| s.evict_before(cutoff_ms)).sum()
    }
}
