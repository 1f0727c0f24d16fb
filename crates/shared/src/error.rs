//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller-supplied data failed a precondition.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The uploaded file type is not accepted.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The uploaded payload exceeds the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::PayloadTooLarge(_) => 413,
            Self::UnsupportedMediaType(_) => 415,
            Self::Internal(_) => 500,
            Self::ExternalService(_) => 502,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnsupportedMediaType(_) => "UNSUPPORTED_FILE_TYPE",
            Self::PayloadTooLarge(_) => "FILE_TOO_LARGE",
            Self::Forbidden(_) => "ACCESS_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ExternalService(_) => "STORAGE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error was caused by the caller rather than by this service
    /// or one of its backends.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::Forbidden(String::new()), 403, "ACCESS_DENIED")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::PayloadTooLarge(String::new()), 413, "FILE_TOO_LARGE")]
    #[case(AppError::UnsupportedMediaType(String::new()), 415, "UNSUPPORTED_FILE_TYPE")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    #[case(AppError::ExternalService(String::new()), 502, "STORAGE_UNAVAILABLE")]
    fn test_status_and_error_codes(
        #[case] error: AppError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_client_errors() {
        assert!(AppError::Validation("msg".into()).is_client_error());
        assert!(AppError::UnsupportedMediaType("msg".into()).is_client_error());
        assert!(!AppError::ExternalService("msg".into()).is_client_error());
        assert!(!AppError::Internal("msg".into()).is_client_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::UnsupportedMediaType("msg".into()).to_string(),
            "Unsupported media type: msg"
        );
        assert_eq!(
            AppError::PayloadTooLarge("msg".into()).to_string(),
            "Payload too large: msg"
        );
        assert_eq!(
            AppError::Forbidden("msg".into()).to_string(),
            "Access denied: msg"
        );
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::ExternalService("msg".into()).to_string(),
            "External service error: msg"
        );
    }
}
