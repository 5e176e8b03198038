//! kbsync Helpdesk Client
//!
//! Remote-call layer for the helpdesk knowledge base.
//!
//! # Components
//!
//! - [`HelpdeskTransport`]: sends one [`ApiRequest`]; [`HttpTransport`] is
//!   the blocking HTTPS implementation with bounded connection retry
//! - [`classify`]: the single status/body → [`ApiError`] mapping
//! - [`HelpdeskClient`]: pagination, settings and typed solution endpoints
//! - [`Hydrator`]: rebuilds a [`kbsync_model::Portal`] from remote state
//!
//! # Example
//!
//! ```rust,ignore
//! use kbsync_api::{HelpdeskClient, HelpdeskConfig, HttpTransport, Hydrator};
//!
//! let config = HelpdeskConfig::new(api_key, "acme");
//! let client = HelpdeskClient::connect(HttpTransport::new(&config)?, &config);
//! let portal = Hydrator::new(&client).hydrate("Help")?.portal;
//! ```

#![warn(unreachable_pub)]

mod client;
mod config;
mod error;
mod http;
mod hydrate;
mod payload;
mod transport;

pub use client::{HelpdeskClient, HelpdeskSettings, ResourceKind, SETTINGS_ENDPOINT};
pub use config::{HelpdeskConfig, RetryPolicy, MAX_PER_PAGE};
pub use error::{ApiError, ConfigError};
pub use http::HttpTransport;
pub use hydrate::{HydrateError, HydrateIssue, HydrateOptions, HydrateReport, Hydrator};
pub use payload::{
    ArticlePayload, ArticleTranslationPayload, CategoryPayload, FolderPayload,
    NamedTranslationPayload, RemoteArticle, RemoteCategory, RemoteFolder,
};
pub use transport::{classify, ApiRequest, ApiResponse, HelpdeskTransport, Method, DUPLICATE_VALUE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
