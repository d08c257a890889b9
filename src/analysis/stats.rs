//! Descriptive statistics over lifespan series

use serde::{Deserialize, Serialize};

use crate::core::types::StepCount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifespanStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: StepCount,
    pub max: StepCount,
    /// Population standard deviation
    pub std_dev: f64,
    pub p25: f64,
    pub p75: f64,
}

impl LifespanStats {
    /// `None` for an empty series
    pub fn from_lifespans(lifespans: &[StepCount]) -> Option<Self> {
        if lifespans.is_empty() {
            return None;
        }

        let mut sorted = lifespans.to_vec();
        sorted.sort_unstable();

        let count = sorted.len();
        let mean = sorted.iter().map(|&l| l as f64).sum::<f64>() / count as f64;
        let variance = sorted
            .iter()
            .map(|&l| (l as f64 - mean).powi(2))
            .sum::<f64>()
            / count as f64;

        Some(Self {
            count,
            mean,
            median: percentile(&sorted, 50.0),
            min: sorted[0],
            max: sorted[count - 1],
            std_dev: variance.sqrt(),
            p25: percentile(&sorted, 25.0),
            p75: percentile(&sorted, 75.0),
        })
    }
}

/// Linear-interpolated percentile of an ascending, non-empty slice
pub fn percentile(sorted: &[StepCount], pct: f64) -> f64 {
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let lo_val = sorted[lo] as f64;
    let hi_val = sorted[hi] as f64;
    lo_val + (hi_val - lo_val) * (rank - lo as f64)
}

/// Window used by lifespan trend reports: a tenth of the run, capped at 50
pub fn default_window(len: usize) -> usize {
    (len / 10).clamp(1, 50)
}

/// Trailing moving average; only full windows are emitted
pub fn moving_average(values: &[StepCount], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }

    values
        .windows(window)
        .map(|w| w.iter().map(|&v| v as f64).sum::<f64>() / window as f64)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins between min and max; the last bin includes max
pub fn histogram(values: &[StepCount], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    if min == max {
        return vec![HistogramBin {
            lower: min as f64,
            upper: max as f64,
            count: values.len(),
        }];
    }

    let lower = min as f64;
    let width = (max - min) as f64 / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lower + width * i as f64,
            upper: lower + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - min) as f64 / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }

    out
}

/// Freedman-Diaconis bin count, clamped to 5..=100
///
/// Bin width is `2 * IQR / n^(1/3)`, falling back to unit width when the
/// interquartile range is zero. A single value gets a single bin.
pub fn freedman_diaconis_bins(values: &[StepCount]) -> usize {
    if values.len() <= 1 {
        return values.len();
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
    let bin_width = if iqr > 0.0 {
        2.0 * iqr * (sorted.len() as f64).powf(-1.0 / 3.0)
    } else {
        1.0
    };
    let range = (sorted[sorted.len() - 1] - sorted[0]) as f64;

    ((range / bin_width).ceil() as usize).clamp(5, 100)
}

/// Histogram with the bin count picked by [`freedman_diaconis_bins`]
pub fn lifespan_histogram(lifespans: &[StepCount]) -> Vec<HistogramBin> {
    histogram(lifespans, freedman_diaconis_bins(lifespans))
}
