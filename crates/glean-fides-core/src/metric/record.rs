use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GleanFidesError, Result};

/// A Glean metric reduced to the fields the classifier looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub description: Option<String>,
    pub data_sensitivity: Option<Vec<String>>,
}

impl Metric {
    pub fn new(name: impl Into<String>, metric_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric_type: metric_type.into(),
            description: None,
            data_sensitivity: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sensitivity<I, S>(mut self, sensitivity: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_sensitivity = Some(sensitivity.into_iter().map(Into::into).collect());
        self
    }

    /// Reduce one raw Probe-Info record.
    ///
    /// Only the most recent revision counts: `description` and
    /// `data_sensitivity` come from the last `history` entry, and are `None`
    /// when there is no history at all.
    pub fn from_record(name: &str, record: &Value) -> Result<Self> {
        let malformed = |field: &str| GleanFidesError::MalformedRecord {
            record: name.to_string(),
            field: field.to_string(),
        };

        let metric_type = record
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("type"))?
            .to_string();

        let latest = match record.get("history") {
            None | Some(Value::Null) => None,
            Some(Value::Array(history)) => history.last(),
            Some(_) => return Err(malformed("history")),
        };

        let description = latest
            .and_then(|rev| rev.get("description"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let data_sensitivity = latest
            .and_then(|rev| rev.get("data_sensitivity"))
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            });

        Ok(Self {
            name: name.to_string(),
            metric_type,
            description,
            data_sensitivity,
        })
    }
}

/// Metrics of one application keyed by name, in the order they were received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSet {
    metrics: Vec<Metric>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce the raw `metric name -> record` object returned by Probe-Info.
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self> {
        raw.iter()
            .map(|(name, record)| Metric::from_record(name, record))
            .collect()
    }

    /// Insert a metric, replacing any existing metric of the same name in place.
    pub fn insert(&mut self, metric: Metric) {
        match self.metrics.iter_mut().find(|m| m.name == metric.name) {
            Some(existing) => *existing = metric,
            None => self.metrics.push(metric),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Metric> {
        self.metrics.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl FromIterator<Metric> for MetricSet {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        let mut set = Self::new();
        for metric in iter {
            set.insert(metric);
        }
        set
    }
}

impl<'a> IntoIterator for &'a MetricSet {
    type Item = &'a Metric;
    type IntoIter = std::slice::Iter<'a, Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.iter()
    }
}
