//! Pure numeric primitives over in-memory series.
//!
//! Every aggregate is total: an empty series yields 0, never NaN, so a
//! report built from these values always serializes to valid JSON.

use crate::config::IQR_FENCE_MULTIPLIER;
use serde::{Deserialize, Serialize};

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Quantile with linear interpolation between the two nearest ranks
/// (`pos = q * (n - 1)`). `q` is clamped to `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Upper interquartile fence: `threshold = Q3 + 1.5 * (Q3 - Q1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IqrFence {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub threshold: f64,
}

impl IqrFence {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let q1 = quantile(values, 0.25);
        let q3 = quantile(values, 0.75);
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            iqr,
            threshold: q3 + IQR_FENCE_MULTIPLIER * iqr,
        }
    }

    pub fn exceeds(&self, value: f64) -> bool {
        value > self.threshold
    }
}

/// Positions of the values strictly above the upper fence of the series.
pub fn outlier_indices(values: &[f64]) -> (IqrFence, Vec<usize>) {
    let fence = IqrFence::from_values(values);
    let flagged = values
        .iter()
        .enumerate()
        .filter(|(_, v)| fence.exceeds(**v))
        .map(|(i, _)| i)
        .collect();
    (fence, flagged)
}

/// Rows whose key strictly exceeds the upper fence of the key series.
/// Rows are returned in their original order.
pub fn outliers<'a, T, F>(rows: &'a [T], key: F) -> (IqrFence, Vec<&'a T>)
where
    F: Fn(&T) -> f64,
{
    let values: Vec<f64> = rows.iter().map(key).collect();
    let (fence, flagged) = outlier_indices(&values);
    (fence, flagged.into_iter().map(|i| &rows[i]).collect())
}
