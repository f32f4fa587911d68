// Sample and series domain models
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// One named data stream. Samples are kept in arrival order, which is also
/// time order: `append` never lets the sequence go backwards in time.
#[derive(Debug, Clone)]
pub struct Series {
    pub key: String,
    pub label: String,
    pub color: String,
    samples: VecDeque<Sample>,
}

impl Series {
    pub fn new(key: String, label: String, color: String) -> Self {
        Self {
            key,
            label,
            color,
            samples: VecDeque::new(),
        }
    }

    /// Append a sample stamped with `time_ms`. A timestamp older than the
    /// newest stored sample (clock stepping backwards) is clamped to it.
    pub fn append(&mut self, time_ms: i64, value: f64) -> Sample {
        let time_ms = match self.samples.back() {
            Some(last) if last.time_ms > time_ms => last.time_ms,
            _ => time_ms,
        };
        let sample = Sample::new(time_ms, value);
        self.samples.push_back(sample);
        sample
    }

    /// Drop every sample strictly older than `cutoff_ms`. Returns how many were dropped.
    pub fn evict_before(&mut self, cutoff_ms: i64) -> usize {
        let stale = self.samples.partition_point(|s| s.time_ms < cutoff_ms);
        self.samples.drain(..stale);
        stale
    }

    /// Samples with `start_ms <= time <= end_ms`. Both ends are inclusive.
    pub fn visible(&self, start_ms: i64, end_ms: i64) -> impl Iterator<Item = &Sample> {
        let lo = self.samples.partition_point(|s| s.time_ms < start_ms);
        let hi = self.samples.partition_point(|s| s.time_ms <= end_ms).max(lo);
        self.samples.range(lo..hi)
    }

    pub fn samples(&self) -> &VecDeque<Sample> {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Downsample samples using bucket averaging. Each bucket keeps its middle
/// sample's timestamp and the mean value, so time order is preserved.
pub fn downsample(samples: Vec<Sample>, max_points: usize) -> Vec<Sample> {
    if max_points == 0 || samples.len() <= max_points {
        return samples;
    }

    let bucket_size = (samples.len() as f64 / max_points as f64).ceil() as usize;
    let mut downsampled = Vec::with_capacity(max_points);

    for chunk in samples.chunks(bucket_size) {
        let mid_idx = chunk.len() / 2;
        let avg_value = chunk.iter().map(|s| s.value).sum::<f64>() / chunk.len() as f64;
        downsampled.push(Sample::new(chunk[mid_idx].time_ms, avg_value));
    }

    downsampled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Series {
        Series::new("a".to_string(), "A".to_string(), "#000000".to_string())
    }

    #[test]
    fn test_append_keeps_time_order() {
        let mut s = series();
        s.append(1_000, 0.0);
        s.append(2_000, 1.0);
        // clock stepped backwards
        let clamped = s.append(1_500, 2.0);
        s.append(3_000, 3.0);

        assert_eq!(clamped.time_ms, 2_000);
        let times: Vec<i64> = s.samples().iter().map(|p| p.time_ms).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_evict_before_drops_only_stale_samples() {
        let mut s = series();
        for t in 0..10 {
            s.append(t * 1_000, t as f64);
        }

        assert_eq!(s.evict_before(4_000), 4);
        assert_eq!(s.samples().front().map(|p| p.time_ms), Some(4_000));
        assert_eq!(s.evict_before(4_000), 0);
    }

    #[test]
    fn test_visible_includes_both_bounds() {
        let mut s = series();
        for t in 0..5 {
            s.append(t * 1_000, 0.0);
        }

        let times: Vec<i64> = s.visible(1_000, 3_000).map(|p| p.time_ms).collect();
        assert_eq!(times, vec![1_000, 2_000, 3_000]);
        assert_eq!(s.visible(10_000, 20_000).count(), 0);
    }

    #[test]
    fn test_downsample_caps_point_count() {
        let points: Vec<Sample> = (0..1_000).map(|i| Sample::new(i, 1.0)).collect();
        let reduced = downsample(points, 100);

        assert!(reduced.len() <= 100);
        assert!(reduced.iter().all(|p| p.value == 1.0));
        assert!(reduced.windows(2).all(|w| w[0].time_ms < w[1].time_ms));
    }

    #[test]
    fn test_downsample_leaves_small_input_alone() {
        let points = vec![Sample::new(0, 1.0), Sample::new(1, 2.0)];
        assert_eq!(downsample(points.clone(), 10), points);
        assert_eq!(downsample(points.clone(), 0), points);
    }
}
