//! Error types for the helpdesk client
//!
//! Remote calls never panic or abort the run: every failure is classified
//! into an [`ApiError`] value so callers can branch on it.

/// Classified outcome of a failed remote call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Transport unreachable or timed out
    #[error("unable to reach helpdesk: {0}")]
    ConnectionFailure(String),

    /// 404: resource or its parent does not exist
    #[error("not found")]
    NotFound,

    /// 409 with a `duplicate_value` validation error
    #[error("already exists")]
    AlreadyExists,

    /// 405: the resource refuses the method
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Any other non-success status
    #[error("helpdesk returned {status}: {body}")]
    Other { status: u16, body: String },

    /// Success status with a body that does not decode
    #[error("undecodable helpdesk response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Short name of the failure class, used in diagnostics
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            Self::ConnectionFailure(_) => "connection failure",
            Self::NotFound => "not found",
            Self::AlreadyExists => "already exists",
            Self::MethodNotAllowed => "method not allowed",
            Self::Other { .. } => "other",
            Self::Decode(_) => "decode",
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Invalid client configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No API key configured
    #[error("helpdesk api key is not set")]
    MissingApiKey,

    /// Neither a domain nor a base URL configured
    #[error("helpdesk domain is not set")]
    MissingDomain,

    /// HTTP client could not be built
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_status() {
        let err = ApiError::Other {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "helpdesk returned 500: boom");
        assert_eq!(err.class(), "other");
        assert_eq!(ApiError::AlreadyExists.class(), "already exists");
    }
}
