//! Target validation applied before a target is stored or probed.

use anyhow::{Result, anyhow};
use url::Url;

use super::types::MAX_INTERVAL_MINUTES;

/// Validate that a target URL is an absolute http/https URL with a host
pub fn validate_target_url(target: &str) -> Result<Url> {
    if target.trim().is_empty() {
        return Err(anyhow!("Target URL cannot be empty"));
    }

    let url = Url::parse(target).map_err(|e| anyhow!("Invalid URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Invalid scheme for HTTP target: {}", other)),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(anyhow!("URL is missing a host: {}", target));
    }

    if url.port() == Some(0) {
        return Err(anyhow!("Port 0 is not valid"));
    }

    Ok(url)
}

/// Validate a polling interval in minutes
pub fn validate_interval_minutes(interval_minutes: u32) -> Result<()> {
    const MIN_INTERVAL: u32 = 1;

    if interval_minutes < MIN_INTERVAL {
        return Err(anyhow!(
            "Check interval too short: {} minutes (minimum: {})",
            interval_minutes,
            MIN_INTERVAL
        ));
    }

    if interval_minutes > MAX_INTERVAL_MINUTES {
        return Err(anyhow!(
            "Check interval too long: {} minutes (maximum: {})",
            interval_minutes,
            MAX_INTERVAL_MINUTES
        ));
    }

    Ok(())
}
