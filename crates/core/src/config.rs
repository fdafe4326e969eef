//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into clients and view
//! models. Nothing in this crate reads process-wide environment variables while a page is live;
//! binaries read them, hand the raw values to the parsers below, and build a [`CoreConfig`].

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
use crate::{OpsError, OpsResult};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    api_base_url: String,
    auth_token: Option<String>,
    request_timeout: Duration,
    poll_interval: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The base URL must be an absolute `http` or `https` URL. A trailing slash is dropped so
    /// collection paths can be joined with a single `/`.
    pub fn new(
        api_base_url: impl Into<String>,
        auth_token: Option<String>,
        request_timeout: Duration,
        poll_interval: Duration,
    ) -> OpsResult<Self> {
        let api_base_url = api_base_url.into();
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();

        if api_base_url.is_empty() {
            return Err(OpsError::InvalidInput(
                "api_base_url cannot be empty".into(),
            ));
        }
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(OpsError::InvalidInput(format!(
                "api_base_url must start with http:// or https:// (got {api_base_url})"
            )));
        }
        if request_timeout.is_zero() {
            return Err(OpsError::InvalidInput(
                "request_timeout must be greater than zero".into(),
            ));
        }
        if poll_interval.is_zero() {
            return Err(OpsError::InvalidInput(
                "poll_interval must be greater than zero".into(),
            ));
        }

        let auth_token = auth_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            api_base_url,
            auth_token,
            request_timeout,
            poll_interval,
        })
    }

    /// Configuration pointing at `api_base_url` with every other setting at its default.
    pub fn with_base_url(api_base_url: impl Into<String>) -> OpsResult<Self> {
        Self::new(
            api_base_url,
            None,
            DEFAULT_REQUEST_TIMEOUT,
            DEFAULT_POLL_INTERVAL,
        )
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            auth_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Resolve the API base URL from an optional raw value.
///
/// `None` or a blank value yields [`DEFAULT_API_BASE_URL`].
pub fn api_base_url_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.into())
}

/// Parse the polling interval (whole seconds) from an optional raw value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_POLL_INTERVAL`].
pub fn poll_interval_from_env_value(value: Option<String>) -> OpsResult<Duration> {
    seconds_from_env_value("HOPS_POLL_INTERVAL_SECS", value, DEFAULT_POLL_INTERVAL)
}

/// Parse the per-request timeout (whole seconds) from an optional raw value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_REQUEST_TIMEOUT`].
pub fn request_timeout_from_env_value(value: Option<String>) -> OpsResult<Duration> {
    seconds_from_env_value("HOPS_REQUEST_TIMEOUT_SECS", value, DEFAULT_REQUEST_TIMEOUT)
}

fn seconds_from_env_value(
    name: &str,
    value: Option<String>,
    default: Duration,
) -> OpsResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(default);
    };

    let secs: u64 = value
        .parse()
        .map_err(|_| OpsError::InvalidInput(format!("{name} must be a whole number of seconds")))?;
    if secs == 0 {
        return Err(OpsError::InvalidInput(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash_and_blank_token() {
        let cfg = CoreConfig::new(
            "http://localhost:5000/api/",
            Some("   ".into()),
            Duration::from_secs(5),
            Duration::from_secs(30),
        )
        .expect("valid config");

        assert_eq!(cfg.api_base_url(), "http://localhost:5000/api");
        assert_eq!(cfg.auth_token(), None);
    }

    #[test]
    fn new_rejects_non_http_urls() {
        let err = CoreConfig::with_base_url("ftp://example.org").expect_err("must reject");
        assert!(matches!(err, OpsError::InvalidInput(msg) if msg.contains("http://")));
    }

    #[test]
    fn new_rejects_zero_intervals() {
        let err = CoreConfig::new(
            "http://localhost",
            None,
            Duration::from_secs(1),
            Duration::ZERO,
        )
        .expect_err("must reject zero poll interval");
        assert!(matches!(err, OpsError::InvalidInput(msg) if msg.contains("poll_interval")));
    }

    #[test]
    fn poll_interval_defaults_when_unset_or_blank() {
        assert_eq!(
            poll_interval_from_env_value(None).expect("default"),
            DEFAULT_POLL_INTERVAL
        );
        assert_eq!(
            poll_interval_from_env_value(Some("  ".into())).expect("default"),
            DEFAULT_POLL_INTERVAL
        );
    }

    #[test]
    fn poll_interval_parses_seconds() {
        assert_eq!(
            poll_interval_from_env_value(Some("45".into())).expect("parse"),
            Duration::from_secs(45)
        );
    }

    #[test]
    fn request_timeout_rejects_garbage() {
        let err = request_timeout_from_env_value(Some("soon".into())).expect_err("must reject");
        assert!(matches!(err, OpsError::InvalidInput(msg) if msg.contains("HOPS_REQUEST_TIMEOUT_SECS")));
    }

    #[test]
    fn api_base_url_falls_back_to_default() {
        assert_eq!(api_base_url_from_env_value(None), DEFAULT_API_BASE_URL);
        assert_eq!(
            api_base_url_from_env_value(Some(" https://ops.example/api ".into())),
            "https://ops.example/api"
        );
    }
}
