//! Transport seam and response classification
//!
//! A [`HelpdeskTransport`] moves one [`ApiRequest`] to the helpdesk and
//! returns the raw status and body. Only unreachable-remote failures are
//! errors at this level; turning statuses into outcomes is done by the pure
//! [`classify`] function so every caller branches on the same taxonomy.

use crate::error::ApiError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// HTTP method of a helpdesk call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read
    Get,
    /// Create
    Post,
    /// Delete
    Delete,
}

impl Method {
    /// Whether the call mutates remote state
    #[inline]
    #[must_use]
    pub const fn is_write(self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

/// One helpdesk call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Method
    pub method: Method,
    /// Path relative to the API base, e.g. `v2/solutions/categories`
    pub endpoint: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body for writes
    pub body: Option<Value>,
}

impl ApiRequest {
    /// GET request
    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// POST request with a JSON body
    #[must_use]
    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// DELETE request
    #[must_use]
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// With a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Value of a query parameter
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw helpdesk reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status
    pub status: u16,
    /// Response body text (may be empty)
    pub body: String,
}

impl ApiResponse {
    /// Create a response
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends helpdesk calls
pub trait HelpdeskTransport {
    /// Send one request; `Err` only for [`ApiError::ConnectionFailure`]
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

impl<T: HelpdeskTransport + ?Sized> HelpdeskTransport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request)
    }
}

impl<T: HelpdeskTransport + ?Sized> HelpdeskTransport for Box<T> {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    code: Option<String>,
}

/// Validation error code that marks a conflict as "already exists"
pub const DUPLICATE_VALUE: &str = "duplicate_value";

/// Classify a status and body
///
/// - 2xx → `Ok`
/// - 404 → [`ApiError::NotFound`]
/// - 405 → [`ApiError::MethodNotAllowed`]
/// - 409 whose first error code is `duplicate_value` → [`ApiError::AlreadyExists`]
/// - anything else → [`ApiError::Other`]
pub fn classify(status: u16, body: &str) -> Result<(), ApiError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound),
        405 => Err(ApiError::MethodNotAllowed),
        409 if first_error_code(body).as_deref() == Some(DUPLICATE_VALUE) => {
            Err(ApiError::AlreadyExists)
        }
        _ => Err(ApiError::Other {
            status,
            body: body.to_string(),
        }),
    }
}

fn first_error_code(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()?
        .errors
        .into_iter()
        .next()?
        .code
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn success_range() {
        assert_eq!(classify(200, ""), Ok(()));
        assert_eq!(classify(201, "{}"), Ok(()));
        assert_eq!(classify(204, ""), Ok(()));
    }

    #[test]
    fn distinguished_statuses() {
        assert_eq!(classify(404, "{}"), Err(ApiError::NotFound));
        assert_eq!(classify(405, ""), Err(ApiError::MethodNotAllowed));
        assert_eq!(
            classify(409, r#"{"errors":[{"code":"duplicate_value","field":"name"}]}"#),
            Err(ApiError::AlreadyExists)
        );
    }

    #[test]
    fn other_conflicts_are_other() {
        for body in [
            "",
            "not json",
            "{}",
            r#"{"errors":[]}"#,
            r#"{"errors":[{"code":"invalid_value"},{"code":"duplicate_value"}]}"#,
        ] {
            assert!(
                matches!(classify(409, body), Err(ApiError::Other { status: 409, .. })),
                "{body}"
            );
        }
    }

    #[test]
    fn request_builders() {
        let req = ApiRequest::get("v2/solutions/categories")
            .with_query("page", 2)
            .with_query("per_page", 100);
        assert_eq!(req.query_value("page"), Some("2"));
        assert!(!req.method.is_write());
        assert!(ApiRequest::delete("x").method.is_write());
    }

    proptest! {
        #[test]
        fn duplicate_value_conflict_is_always_already_exists(
            field in "[a-z_]{1,12}",
            message in "[ -~]{0,40}",
            extra in prop::collection::vec("[a-z_]{1,12}", 0..3),
        ) {
            let mut errors = vec![serde_json::json!({
                "code": DUPLICATE_VALUE,
                "field": field,
                "message": message,
            })];
            errors.extend(extra.into_iter().map(|code| serde_json::json!({ "code": code })));
            let body = serde_json::json!({ "description": "Validation failed", "errors": errors });
            prop_assert_eq!(classify(409, &body.to_string()), Err(ApiError::AlreadyExists));
        }

        #[test]
        fn other_first_codes_are_other(code in "[a-z_]{1,16}") {
            prop_assume!(code != DUPLICATE_VALUE);
            let body = serde_json::json!({ "errors": [{ "code": code }] }).to_string();
            let is_other = matches!(classify(409, &body), Err(ApiError::Other { status: 409, .. }));
            prop_assert!(is_other);
        }

        #[test]
        fn non_success_is_never_ok(status in 300u16..600) {
            prop_assert!(classify(status, "").is_err());
        }
    }
}
