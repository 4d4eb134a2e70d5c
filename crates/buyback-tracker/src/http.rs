//! Shared HTTP client for explorer and price-feed requests

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::env;
use std::time::Duration;
use tracing::warn;

use crate::constants;

/// Build the client shared by every collaborator.
///
/// On some macOS environments, system proxy detection can panic, so it is
/// disabled there unless a proxy is configured explicitly.
pub fn build_client() -> reqwest::Client {
    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(constants::REQUEST_TIMEOUT_SECS));

    if should_disable_proxy() {
        builder = builder.no_proxy();
    }

    builder.build().unwrap_or_else(|err| {
        warn!("Failed to build HTTP client ({}); falling back to default client", err);
        reqwest::Client::new()
    })
}

/// GET `url` and decode the JSON body.
///
/// Non-2xx statuses are errors. Request errors are stripped of their URL so
/// API keys in query strings stay out of logs.
pub async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str, headers: &[(&str, &str)]) -> Result<T> {
    let mut request = client.get(url).header("Accept", "application/json");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| e.without_url())
        .context("Request failed")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("API returned status: {}", status);
    }

    let body = response
        .text()
        .await
        .map_err(|e| e.without_url())
        .context("Failed to read response body")?;

    serde_json::from_str(&body).context("Failed to parse response JSON")
}

const NO_PROXY_SWITCH: &str = "BUYBACK_TRACKER_NO_PROXY";
const USE_PROXY_SWITCH: &str = "BUYBACK_TRACKER_USE_PROXY";
const PROXY_VARS: [&str; 6] = ["HTTP_PROXY", "HTTPS_PROXY", "ALL_PROXY", "http_proxy", "https_proxy", "all_proxy"];

fn should_disable_proxy() -> bool {
    cfg!(target_os = "macos") && proxy_detection_off(|key| env::var_os(key).is_some())
}

/// Explicit switches win (`NO_PROXY` over `USE_PROXY`); otherwise detection is
/// only skipped when no proxy variable is set.
fn proxy_detection_off(is_set: impl Fn(&str) -> bool) -> bool {
    match (is_set(NO_PROXY_SWITCH), is_set(USE_PROXY_SWITCH)) {
        (true, _) => true,
        (false, true) => false,
        (false, false) => !PROXY_VARS.iter().any(|key| is_set(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(vars: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |key: &str| vars.iter().any(|var| *var == key)
    }

    #[test]
    fn test_proxy_switches() {
        assert!(proxy_detection_off(set(&[])));
        assert!(proxy_detection_off(set(&[NO_PROXY_SWITCH, USE_PROXY_SWITCH])));
        assert!(!proxy_detection_off(set(&[USE_PROXY_SWITCH])));
        assert!(!proxy_detection_off(set(&["https_proxy"])));
        assert!(proxy_detection_off(set(&[NO_PROXY_SWITCH, "HTTPS_PROXY"])));
    }
}
