//! Domain-level error taxonomy.
//!
//! These errors carry no transport detail. The HTTP adapter maps each
//! [`ErrorCode`] to a status and renders the message; internal errors are
//! redacted there before leaving the process.

use std::fmt;

use super::TraceId;

/// Failure category used by adapters to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Missing or malformed input.
    InvalidRequest,
    /// Registration with an email that already has an account.
    DuplicateEmail,
    /// Unknown email or wrong password. Deliberately indistinguishable.
    InvalidCredentials,
    /// A protected operation was called without a bearer token.
    Unauthorized,
    /// The bearer token is malformed, forged, or expired.
    Forbidden,
    /// Unknown user, unknown resource, or a stored file that has vanished.
    NotFound,
    /// The upload's extension is outside the accepted set.
    UnsupportedFileType,
    /// The upload exceeds the size ceiling.
    FileTooLarge,
    /// Anything else; never shown to clients verbatim.
    InternalError,
}

/// Domain error with a stable code and a client-facing message.
///
/// The trace identifier in scope at construction time is captured so the
/// adapter can echo it to the client.
///
/// # Examples
/// ```
/// use synapse::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Resource not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "Resource not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
}

impl Error {
    /// Create an error, capturing the current [`TraceId`] if one is in scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// The failure category.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message intended for the client.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Trace identifier captured at construction, if any.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Replace the captured trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Shorthand for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Shorthand for [`ErrorCode::DuplicateEmail`].
    pub fn duplicate_email(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateEmail, message)
    }

    /// Shorthand for [`ErrorCode::InvalidCredentials`].
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCredentials, message)
    }

    /// Shorthand for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Shorthand for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Shorthand for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Shorthand for [`ErrorCode::UnsupportedFileType`].
    pub fn unsupported_file_type(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnsupportedFileType, message)
    }

    /// Shorthand for [`ErrorCode::FileTooLarge`].
    pub fn file_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FileTooLarge, message)
    }

    /// Shorthand for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
