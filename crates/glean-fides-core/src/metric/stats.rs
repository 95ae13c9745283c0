use super::record::MetricSet;

/// Coverage of the `data_sensitivity` field across metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitivityStats {
    pub with_sensitivity: usize,
    pub without_sensitivity: usize,
    /// Names of the metrics that lack `data_sensitivity`
    pub missing: Vec<String>,
}

impl SensitivityStats {
    pub fn of(metrics: &MetricSet) -> Self {
        let mut stats = Self::default();
        for metric in metrics {
            if metric.data_sensitivity.is_some() {
                stats.with_sensitivity += 1;
            } else {
                stats.without_sensitivity += 1;
                stats.missing.push(metric.name.clone());
            }
        }
        stats
    }

    /// Fold another app's stats into a running total.
    pub fn merge(&mut self, other: &SensitivityStats) {
        self.with_sensitivity += other.with_sensitivity;
        self.without_sensitivity += other.without_sensitivity;
        self.missing.extend(other.missing.iter().cloned());
    }

    pub fn total(&self) -> usize {
        self.with_sensitivity + self.without_sensitivity
    }
}
