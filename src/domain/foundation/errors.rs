//! Domain error vocabulary.
//!
//! `ValidationError` is raised while building value objects from untrusted
//! input (wire payloads, config, commands). `DomainError` is what handlers
//! return; it carries a stable machine code plus free-form details.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required but was empty")]
    EmptyField { field: String },

    #[error("{field} is {actual}, expected {min}..={max}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField { field: field.into() }
    }

    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        let field = field.into();
        Self::OutOfRange { field, min, max, actual }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let (field, reason) = (field.into(), reason.into());
        Self::InvalidFormat { field, reason }
    }

    /// Name of the offending field, dotted for nested payload keys.
    pub fn field(&self) -> &str {
        match self {
            Self::EmptyField { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. } => field,
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyField { .. } => ErrorCode::EmptyField,
            Self::OutOfRange { .. } => ErrorCode::OutOfRange,
            Self::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        }
    }
}

/// Stable, machine-readable failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyField,
    OutOfRange,
    InvalidFormat,
    NotificationNotFound,
    NavigationFailed,
    TransportUnavailable,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyField => "EMPTY_FIELD",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::NotificationNotFound => "NOTIFICATION_NOT_FOUND",
            Self::NavigationFailed => "NAVIGATION_FAILED",
            Self::TransportUnavailable => "TRANSPORT_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure surfaced by application handlers.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Attaches a key/value pair for diagnostics.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_owned();
        DomainError::new(err.code(), err.to_string()).with_detail("field", field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_names_the_field() {
        let err = ValidationError::empty_field("content");
        assert_eq!(err.to_string(), "content is required but was empty");
    }

    #[test]
    fn out_of_range_reports_bounds() {
        let err = ValidationError::out_of_range("capacity", 1, 1000, 0);
        assert_eq!(err.to_string(), "capacity is 0, expected 1..=1000");
        assert_eq!(err.field(), "capacity");
    }

    #[test]
    fn domain_error_prefixes_code() {
        let err = DomainError::new(ErrorCode::NotificationNotFound, "no such notification");
        assert_eq!(err.to_string(), "[NOTIFICATION_NOT_FOUND] no such notification");
    }

    #[test]
    fn validation_maps_to_matching_code_and_keeps_field() {
        let err: DomainError = ValidationError::invalid_format("createdAt", "bad date").into();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert_eq!(err.details["field"], "createdAt");

        let err: DomainError = ValidationError::empty_field("recipientId").into();
        assert_eq!(err.code, ErrorCode::EmptyField);
    }

    #[test]
    fn details_accumulate() {
        let err = DomainError::new(ErrorCode::NavigationFailed, "router gone")
            .with_detail("route", "/chat/c1")
            .with_detail("attempt", "1");

        assert_eq!(err.details.len(), 2);
        assert_eq!(err.details["route"], "/chat/c1");
    }
}
