//! Controller-level error taxonomy.
//!
//! `SyncError` separates the failures a screen reacts to differently:
//! validation problems are shown next to their field, authorization failures
//! send the user to the login screen, and every other failure rolls the local
//! list back to the server's state.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::api::ApiError;

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// An empty set of errors.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// A single error on `field`.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Record an error on `field`, replacing any earlier one.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// The message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Errors returned by the collection controllers.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Input rejected before any request was sent.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The submission would duplicate an existing entry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The session is missing, expired, or lacks the required role.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[source] ApiError),

    /// The backend answered with a body that does not match the expected record.
    #[error("Malformed response: {0}")]
    Parse(#[source] ApiError),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other request failure.
    #[error("Operation failed: {0}")]
    Operation(#[source] ApiError),
}

impl SyncError {
    /// Whether this failure should send the user to the login screen.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Field errors, when this is a validation failure.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { .. } => Self::Unauthorized(err),
            ApiError::Parse(_) => Self::Parse(err),
            _ => Self::Operation(err),
        }
    }
}

impl From<FieldErrors> for SyncError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
