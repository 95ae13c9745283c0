//! # Metric Module
//!
//! Glean metric definitions fetched from Probe-Info and reduced to the
//! fields used for classification.
//!
//! ```rust
//! use glean_fides_core::metric::MetricSet;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "login.attempt": {
//!         "type": "event",
//!         "history": [{"description": "User attempted to log in"}]
//!     }
//! });
//! let metrics = MetricSet::from_raw(raw.as_object().unwrap()).unwrap();
//! assert_eq!(metrics.names(), vec!["login.attempt"]);
//! ```

mod fetch;
mod record;
mod stats;

pub use fetch::{AppInfo, MetricProvider, ProbeInfoClient, DEFAULT_PROBE_INFO_URL};
pub use record::{Metric, MetricSet};
pub use stats::SensitivityStats;
