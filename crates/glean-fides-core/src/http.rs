//! Shared blocking HTTP helpers for the Fides and Probe-Info clients.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{GleanFidesError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("glean-fides/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| GleanFidesError::Configuration {
            message: format!("Failed to create HTTP client: {}", e),
        })
}

/// Send a prepared request and decode a JSON body.
///
/// Network errors, non-2xx statuses and undecodable bodies all surface as
/// `Transport` errors carrying the URL.
pub(crate) fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T> {
    log::debug!("GET {}", url);

    let response = request
        .send()
        .map_err(|e| GleanFidesError::transport(url, e))?;

    let status = response.status();
    log::debug!("{} -> {}", url, status);
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        log::error!("{} returned {}: {}", url, status, body);
        return Err(GleanFidesError::transport(
            url,
            format!("HTTP {}: {}", status, body.trim()),
        ));
    }

    response
        .json::<T>()
        .map_err(|e| GleanFidesError::transport(url, format!("Invalid response body: {}", e)))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(join_url("http://a/b/", "/c"), "http://a/b/c");
        assert_eq!(join_url("http://a/b", "c/d"), "http://a/b/c/d");
    }
}
