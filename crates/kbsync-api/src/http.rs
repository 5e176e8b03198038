//! Blocking HTTP transport
//!
//! One authenticated `reqwest` client is reused for the whole run. Reads use
//! the long timeout, writes the short one. Connection failures are retried
//! with linear backoff up to the configured attempt count; every other
//! outcome is returned to the caller untouched.

use crate::config::{HelpdeskConfig, RetryPolicy};
use crate::error::{ApiError, ConfigError};
use crate::transport::{ApiRequest, ApiResponse, HelpdeskTransport, Method};
use reqwest::blocking::{Client, RequestBuilder};
use std::thread;
use std::time::Duration;

/// Password sent with the API key; the helpdesk ignores it
const BASIC_AUTH_PASSWORD: &str = "X";

/// Helpdesk transport over HTTPS
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
    read_timeout: Duration,
    write_timeout: Duration,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Build a transport from configuration
    pub fn new(config: &HelpdeskConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client: Client::builder().build()?,
            base_url: config.resolved_base_url()?,
            api_key: config.api_key.clone(),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            write_timeout: Duration::from_secs(config.write_timeout_secs),
            retry: config.retry,
        })
    }

    /// API base URL
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build(&self, request: &ApiRequest) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, request.endpoint.trim_start_matches('/'));
        let builder = match request.method {
            Method::Get => self.client.get(url).timeout(self.read_timeout),
            Method::Post => self.client.post(url).timeout(self.write_timeout),
            Method::Delete => self.client.delete(url).timeout(self.write_timeout),
        };
        let builder = builder
            .basic_auth(&self.api_key, Some(BASIC_AUTH_PASSWORD))
            .query(&request.query);
        match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }
}

impl HelpdeskTransport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.build(request).send() {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response
                        .text()
                        .map_err(|e| ApiError::ConnectionFailure(e.to_string()))?;
                    tracing::debug!(
                        method = %request.method,
                        endpoint = %request.endpoint,
                        status,
                        "helpdesk call"
                    );
                    return Ok(ApiResponse::new(status, body));
                }
                Err(err) if err.is_connect() && attempt < max_attempts => {
                    let backoff = self.retry.base_backoff_ms.saturating_mul(u64::from(attempt));
                    tracing::warn!(
                        endpoint = %request.endpoint,
                        attempt,
                        backoff_ms = backoff,
                        "connection failed, retrying: {err}"
                    );
                    thread::sleep(Duration::from_millis(backoff));
                }
                Err(err) => {
                    tracing::error!(
                        method = %request.method,
                        endpoint = %request.endpoint,
                        attempt,
                        "unable to reach helpdesk: {err}"
                    );
                    return Err(ApiError::ConnectionFailure(err.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_invalid_config() {
        assert!(matches!(
            HttpTransport::new(&HelpdeskConfig::default()),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn builds_urls_and_auth() {
        let transport = HttpTransport::new(&HelpdeskConfig::new("secret", "acme")).unwrap();
        assert_eq!(transport.base_url(), "https://acme.freshdesk.com/api/");

        let request = transport
            .build(&ApiRequest::get("/v2/solutions/categories").with_query("page", 3))
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://acme.freshdesk.com/api/v2/solutions/categories?page=3"
        );
        assert_eq!(request.timeout(), Some(&Duration::from_secs(10)));
        assert!(request.headers().contains_key(reqwest::header::AUTHORIZATION));

        let request = transport
            .build(&ApiRequest::delete("v2/solutions/folders/9"))
            .build()
            .unwrap();
        assert_eq!(request.method(), &reqwest::Method::DELETE);
        assert_eq!(request.timeout(), Some(&Duration::from_secs(5)));
    }

    #[test]
    fn unreachable_host_is_connection_failure() {
        let config = HelpdeskConfig::new("secret", "unused")
            .with_base_url("http://127.0.0.1:9/api/")
            .with_retry(RetryPolicy {
                max_attempts: 2,
                base_backoff_ms: 1,
            });
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport.send(&ApiRequest::get("v2/settings/helpdesk")).unwrap_err();
        assert!(matches!(err, ApiError::ConnectionFailure(_)));
    }
}
