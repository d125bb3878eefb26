//! Error types for Surge.
//!
//! Every failure that can reach a caller is one of a small, closed set of
//! variants. The variant decides how the HTTP layer answers; the optional
//! `cause` keeps the original diagnostic for logs.
//!
//! Cache failures are deliberately absent: they are absorbed by the repository
//! and never become an [`Error`].
//!
//! # Example
//!
//! ```
//! use surge_core::{Error, ErrorKind, Result};
//!
//! fn parse_id(raw: &str) -> Result<i64> {
//!     raw.parse()
//!         .map_err(|_| Error::bad_input(format!("invalid user id '{raw}'")))
//! }
//!
//! let err = parse_id("abc").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::BadInput);
//! ```

use std::fmt;

use thiserror::Error as ThisError;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for Surge operations.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Malformed identity or request body. Not retryable.
    #[error("Bad input: {message}")]
    BadInput {
        /// What was wrong with the input
        message: String,
    },

    /// The requested entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name, e.g. "User"
        entity: &'static str,
        /// Identity that was looked up
        id: i64,
    },

    /// A unique field collided with an existing row.
    #[error("Conflict on '{field}': {message}")]
    Conflict {
        /// Field carrying the unique constraint
        field: String,
        /// Description of the collision
        message: String,
    },

    /// The store could not be reached, timed out or failed the query.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description of what went wrong
        message: String,
        /// Underlying error
        #[source]
        cause: Option<Cause>,
    },

    /// Anything else. Should not happen in practice.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure
        message: String,
        /// Underlying error
        #[source]
        cause: Option<Cause>,
    },
}

/// Stable, machine-readable error kind.
///
/// Automated clients should switch on this rather than on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadInput,
    NotFound,
    Conflict,
    StoreUnavailable,
    Internal,
}

impl ErrorKind {
    /// Returns the snake_case wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadInput => "bad_input",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::StoreUnavailable => "store_unavailable",
            Self::Internal => "internal",
        }
    }

    /// Returns true if the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    // ============================================
    // Convenience constructors
    // ============================================

    /// Creates a BadInput error.
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::BadInput {
            message: message.into(),
        }
    }

    /// Creates a NotFound error for a user identity.
    pub fn user_not_found(id: i64) -> Self {
        Self::NotFound { entity: "User", id }
    }

    /// Creates a Conflict error.
    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a StoreUnavailable error without a cause.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a StoreUnavailable error with a cause.
    pub fn store_unavailable_with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreUnavailable {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates an Internal error without a cause.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an Internal error with a cause.
    pub fn internal_with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    // ============================================
    // Query methods
    // ============================================

    /// Returns the stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadInput { .. } => ErrorKind::BadInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns true if this error indicates the entity was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a unique-constraint conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns true if the store failed.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Returns true if the caller sent something malformed.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::BadInput { .. })
    }
}

/// Type alias for Results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = Error::user_not_found(999);
        assert_eq!(error.to_string(), "User 999 not found");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::bad_input("x").kind(), ErrorKind::BadInput);
        assert_eq!(Error::user_not_found(1).kind(), ErrorKind::NotFound);
        assert_eq!(Error::conflict("email", "dup").kind(), ErrorKind::Conflict);
        assert_eq!(
            Error::store_unavailable("down").kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(Error::internal("boom").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_kind_wire_names_are_stable() {
        assert_eq!(ErrorKind::BadInput.as_str(), "bad_input");
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::Conflict.as_str(), "conflict");
        assert_eq!(ErrorKind::StoreUnavailable.as_str(), "store_unavailable");
        assert_eq!(ErrorKind::Internal.to_string(), "internal");
    }

    #[test]
    fn test_only_store_errors_are_retryable() {
        assert!(ErrorKind::StoreUnavailable.is_retryable());
        assert!(!ErrorKind::Conflict.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::BadInput.is_retryable());
    }

    #[test]
    fn test_store_error_keeps_cause() {
        let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = Error::store_unavailable_with_cause("connect failed", io_error);

        use std::error::Error as _;
        assert!(error.source().is_some());
        assert!(error.is_store_unavailable());
        assert!(error.to_string().contains("connect failed"));
    }

    #[test]
    fn test_result_with_question_mark() {
        fn inner() -> Result<()> {
            Err(Error::conflict("email", "already registered"))
        }

        fn outer() -> Result<String> {
            inner()?;
            Ok("unreachable".into())
        }

        assert!(outer().unwrap_err().is_conflict());
    }
}
