//! Heuristic samples collected by an engine that ran out of search budget.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metric name -> ordered samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicStats {
    samples: BTreeMap<String, Vec<i64>>,
}

impl HeuristicStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample for `metric`
    pub fn record(&mut self, metric: &str, value: i64) {
        self.samples
            .entry(metric.to_string())
            .or_default()
            .push(value);
    }

    /// Number of metrics with at least one sample
    pub fn len(&self) -> usize {
        self.samples.values().filter(|v| !v.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, metric: &str) -> Option<&[i64]> {
        self.samples.get(metric).map(|v| v.as_slice())
    }

    /// Reduce every metric to the integer part of its median.
    ///
    /// Consumes the stats: the raw samples are only ever reduced once.
    /// Metrics without samples are dropped.
    pub fn into_medians(self) -> BTreeMap<String, i64> {
        self.samples
            .into_iter()
            .filter_map(|(metric, values)| median(&values).map(|m| (metric, m)))
            .collect()
    }
}

impl FromIterator<(String, Vec<i64>)> for HeuristicStats {
    fn from_iter<I: IntoIterator<Item = (String, Vec<i64>)>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Median truncated toward zero. Even-length inputs average the two middle
/// samples first.
pub fn median(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        let avg = (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0;
        Some(avg.trunc() as i64)
    }
}
