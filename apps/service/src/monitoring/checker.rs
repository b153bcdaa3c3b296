use anyhow::{Result, anyhow};
use std::time::Duration;

/// Default client identifier sent with every probe
pub const DEFAULT_USER_AGENT: &str = concat!("uptrack-background-worker/", env!("CARGO_PKG_VERSION"));

/// Checker trait for reachability probes
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Probe the target once and return the response status code.
    ///
    /// Any transport failure or non-success response is an `Err`.
    async fn check(&self, target: &str) -> Result<u16>;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout_seconds: u64, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, target: &str) -> Result<u16> {
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let status = response.status();

        // Consider 2xx and 3xx as success
        if status.is_success() || status.is_redirection() {
            Ok(status.as_u16())
        } else {
            Err(anyhow!("HTTP check failed with status code: {}", status.as_u16()))
        }
    }
}
