//! Error types for backend calls and configuration.

/// Errors produced while talking to the auth provider or the data API.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The service returned a non-success HTTP status.
    #[error("response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// A header value (API key or access token) is not valid ASCII.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

impl BackendError {
    /// Stable code used as a structured log field.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Request(_) => "E_REQUEST",
            Self::Response { .. } => "E_RESPONSE",
            Self::Parse(_) => "E_PARSE",
            Self::InvalidHeader(_) => "E_INVALID_HEADER",
        }
    }
}

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing config: env var {var} not set")]
    Missing { var: &'static str },

    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}
