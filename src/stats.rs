use crate::models::Series;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub label: String,
    pub unit: String,
    pub count: usize,
    /// Most recent (year, value).
    pub latest: Option<(i32, f64)>,
    /// Latest minus the previous calendar year, when that year exists.
    /// Percentage points for rate units.
    pub change: Option<f64>,
    pub peak: Option<(i32, f64)>,
    pub trough: Option<(i32, f64)>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute the summary of a series.
pub fn summarize(label: &str, unit: &str, series: &Series) -> Summary {
    let mut vals: Vec<f64> = series.values().collect();
    vals.sort_by(|a, b| a.total_cmp(b));
    let count = vals.len();
    let mean = if count > 0 {
        Some(vals.iter().copied().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    let latest = series.last();
    let change = latest.and_then(|(y, v)| series.get(y - 1).map(|prev| v - prev));
    Summary {
        label: label.to_string(),
        unit: unit.to_string(),
        count,
        latest,
        change,
        peak: series.peak(),
        trough: series.trough(),
        mean,
        median,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Highest values first.
    Top,
    /// Lowest values first.
    Bottom,
}

/// The `n` highest (or lowest) entries of a cross-country snapshot.
/// Ties keep code order.
pub fn rank(values: &BTreeMap<String, f64>, n: usize, order: Order) -> Vec<(String, f64)> {
    let mut all: Vec<(String, f64)> = values.iter().map(|(k, v)| (k.clone(), *v)).collect();
    match order {
        Order::Top => all.sort_by(|a, b| b.1.total_cmp(&a.1)),
        Order::Bottom => all.sort_by(|a, b| a.1.total_cmp(&b.1)),
    }
    all.truncate(n);
    all
}
