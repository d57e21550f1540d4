//! Error types for Google service operations.
//!
//! One error type covers every service this crate talks to (Meet, Drive,
//! Gmail, Gemini, the OAuth endpoints). "No conference record found" is NOT
//! an error: the locator reports absence through its result type and this
//! module's `NotFound` is reserved for requests that name a concrete
//! resource.

use std::fmt;

use thiserror::Error;

/// High-level classification of a Google service error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoogleErrorCode {
    /// Authentication failed - credentials invalid, expired, or missing.
    AuthenticationFailed,
    /// Authorization failed - the user lacks permission for the resource.
    AuthorizationFailed,
    /// Network error - connection failed, timeout, DNS resolution.
    NetworkError,
    /// Rate limit exceeded.
    RateLimited,
    /// Server returned a 5xx status.
    ServerError,
    /// Response could not be parsed or had an unexpected shape.
    InvalidResponse,
    /// A named resource does not exist (404).
    NotFound,
    /// The request was rejected as malformed (400).
    BadRequest,
    /// Local configuration problem - unreadable credential file, bad paths.
    ConfigurationError,
    /// Unexpected internal state.
    InternalError,
}

impl GoogleErrorCode {
    /// Returns true if the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns a stable machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for GoogleErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error from one of the Google service clients.
#[derive(Debug, Error)]
pub struct GoogleError {
    code: GoogleErrorCode,
    message: String,
    /// The service that produced the error ("meet", "drive", "gmail",
    /// "gemini", "oauth").
    service: Option<&'static str>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GoogleError {
    /// Creates a new error with the given code and message.
    pub fn new(code: GoogleErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            service: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::ServerError, message)
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::InvalidResponse, message)
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::NotFound, message)
    }

    /// Creates a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::InternalError, message)
    }

    /// Tags the error with the originating service.
    pub fn with_service(mut self, service: &'static str) -> Self {
        self.service = Some(service);
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> GoogleErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the originating service, if tagged.
    pub fn service(&self) -> Option<&'static str> {
        self.service
    }

    /// Returns true if the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for GoogleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(service) = self.service {
            write!(f, "[{}] ", service)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for Google service operations.
pub type GoogleResult<T> = Result<T, GoogleError>;

/// Triages an HTTP status into an error, reading the body for context.
///
/// Callers handle success statuses before calling this.
pub(crate) async fn status_error(
    service: &'static str,
    response: reqwest::Response,
) -> GoogleError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let err = if status == reqwest::StatusCode::UNAUTHORIZED {
        GoogleError::authentication("access token expired or invalid")
    } else if status == reqwest::StatusCode::FORBIDDEN {
        GoogleError::authorization(format!("access denied: {}", body))
    } else if status == reqwest::StatusCode::NOT_FOUND {
        GoogleError::not_found(format!("resource not found: {}", body))
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        GoogleError::rate_limited("rate limit exceeded")
    } else if status.is_server_error() {
        GoogleError::server(format!("API error ({}): {}", status, body))
    } else {
        GoogleError::bad_request(format!("API error ({}): {}", status, body))
    };

    err.with_service(service)
}

/// Maps a reqwest transport error onto the taxonomy.
pub(crate) fn transport_error(service: &'static str, err: reqwest::Error) -> GoogleError {
    let message = if err.is_timeout() {
        "request timeout".to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        format!("request failed: {}", err)
    };
    GoogleError::network(message).with_source(err).with_service(service)
}
