use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GleanFidesError, Result};
use crate::http::{build_client, join_url, send_json};

use super::record::MetricSet;

pub const DEFAULT_PROBE_INFO_URL: &str = "https://probeinfo.telemetry.mozilla.org/glean";

/// Source of per-application metric definitions.
pub trait MetricProvider {
    fn fetch_metrics(&self, app_name: &str) -> Result<MetricSet>;
}

/// A Glean application (repository) known to Probe-Info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

/// Client for the Probe-Info service.
pub struct ProbeInfoClient {
    client: Client,
    base_url: String,
}

impl ProbeInfoClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
        })
    }

    pub fn fetch_apps(&self) -> Result<Vec<AppInfo>> {
        let url = join_url(&self.base_url, "repositories");
        send_json(self.client.get(&url), &url)
    }

    /// `{base}/{app}/metrics`, with the app name encoded as one path segment.
    fn metrics_url(&self, app_name: &str) -> Result<String> {
        let invalid = |reason: String| GleanFidesError::Configuration {
            message: format!("Invalid Probe-Info URL '{}': {}", self.base_url, reason),
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push(app_name)
            .push("metrics");
        Ok(url.into())
    }
}

impl MetricProvider for ProbeInfoClient {
    fn fetch_metrics(&self, app_name: &str) -> Result<MetricSet> {
        let url = self.metrics_url(app_name)?;
        let raw: Map<String, Value> = send_json(self.client.get(&url), &url)?;
        MetricSet::from_raw(&raw)
    }
}
