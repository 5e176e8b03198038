//! Helpdesk client configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest page size the helpdesk accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Bounded retry for connection failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts per request, including the first
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` waits `n * base_backoff_ms`
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff_ms: 200,
        }
    }
}

/// Helpdesk connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpdeskConfig {
    /// API key (HTTP basic auth user)
    pub api_key: String,
    /// Helpdesk subdomain: `https://<domain>.freshdesk.com/api/`
    pub domain: String,
    /// Full API base URL; overrides `domain`
    pub base_url: Option<String>,
    /// Remote portals new categories are visible in
    pub portal_scope_ids: Vec<u64>,
    /// Timeout for read calls
    pub read_timeout_secs: u64,
    /// Timeout for mutating calls
    pub write_timeout_secs: u64,
    /// Connection retry policy
    pub retry: RetryPolicy,
    /// Page size for list calls (capped at 100)
    pub per_page: u32,
    /// Maximum pages fetched per list call
    pub max_depth: u32,
}

impl Default for HelpdeskConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            domain: String::new(),
            base_url: None,
            portal_scope_ids: Vec::new(),
            read_timeout_secs: 10,
            write_timeout_secs: 5,
            retry: RetryPolicy::default(),
            per_page: MAX_PER_PAGE,
            max_depth: 20,
        }
    }
}

impl HelpdeskConfig {
    /// Create configuration for a helpdesk subdomain
    #[must_use]
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// With explicit base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// With portal scope
    #[inline]
    #[must_use]
    pub fn with_portal_scope(mut self, ids: Vec<u64>) -> Self {
        self.portal_scope_ids = ids;
        self
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// With paging bounds
    #[inline]
    #[must_use]
    pub fn with_paging(mut self, per_page: u32, max_depth: u32) -> Self {
        self.per_page = per_page;
        self.max_depth = max_depth;
        self
    }

    /// Effective page size
    #[inline]
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// API base URL, always ending in `/`
    pub fn resolved_base_url(&self) -> Result<String, ConfigError> {
        let base = match &self.base_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ if !self.domain.trim().is_empty() => {
                format!("https://{}.freshdesk.com/api/", self.domain.trim())
            }
            _ => return Err(ConfigError::MissingDomain),
        };
        Ok(if base.ends_with('/') {
            base
        } else {
            format!("{base}/")
        })
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        self.resolved_base_url().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_from_domain_or_override() {
        let config = HelpdeskConfig::new("key", "acme");
        assert_eq!(
            config.resolved_base_url().unwrap(),
            "https://acme.freshdesk.com/api/"
        );
        let config = config.with_base_url("http://localhost:8080/api");
        assert_eq!(config.resolved_base_url().unwrap(), "http://localhost:8080/api/");
    }

    #[test]
    fn validation() {
        assert!(matches!(
            HelpdeskConfig::new("", "acme").validate(),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            HelpdeskConfig::new("key", " ").validate(),
            Err(ConfigError::MissingDomain)
        ));
        assert!(HelpdeskConfig::new("key", "acme").validate().is_ok());
    }

    #[test]
    fn page_size_is_capped() {
        assert_eq!(HelpdeskConfig::default().with_paging(500, 3).page_size(), 100);
        assert_eq!(HelpdeskConfig::default().with_paging(0, 3).page_size(), 1);
        assert_eq!(HelpdeskConfig::default().page_size(), 100);
    }
}
