//! Unified error handling for the tablebook crate
//!
//! This module consolidates the domain-specific errors into a single `Error`
//! enum and classifies each one into the handling strategy the booking and
//! admin flows apply to it.
//!
//! # Architecture
//!
//! - [`TablebookErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use tablebook::error::{Error, ErrorCategory, TablebookErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     match err.category() {
//!         ErrorCategory::Auth => println!("Please log in again"),
//!         _ => eprintln!("{}", err.user_message()),
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::utils::error::{RemoteError, StoreError, ValidationError};

/// Common trait for tablebook error types
pub trait TablebookErrorTrait: std::error::Error {
    /// Check if this error can be resolved without re-authenticating or operator action
    fn is_recoverable(&self) -> bool;

    /// Text suitable for showing to the person who triggered the operation
    fn user_message(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or invalid user input
    Validation,
    /// Remote rejected the booking because the slot filled
    Conflict,
    /// Network or server failure
    Transient,
    /// Session invalid or expired
    Auth,
    /// Local store unreadable
    Corruption,
    /// Local store unwritable
    Storage,
    /// Client could not be configured
    Config,
}

impl ErrorCategory {
    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "invalid input",
            Self::Conflict => "slot no longer available",
            Self::Transient => "server unreachable",
            Self::Auth => "session expired",
            Self::Corruption => "local data unreadable",
            Self::Storage => "local storage error",
            Self::Config => "configuration error",
        }
    }
}

/// Unified error type for the tablebook crate
#[derive(Error, Debug)]
pub enum Error {
    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote authority errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Ledger and session store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Shown when the remote rejects a booking without saying why
pub const CONFLICT_FALLBACK_MESSAGE: &str = "Could not book. Try another time.";

/// Shown when an authenticated call is rejected
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

impl TablebookErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Conflict | ErrorCategory::Transient => true,
            // corrupt data is replaced by an empty store
            ErrorCategory::Corruption => true,
            ErrorCategory::Auth | ErrorCategory::Storage | ErrorCategory::Config => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Remote(RemoteError::Conflict { message }) => message
                .clone()
                .unwrap_or_else(|| CONFLICT_FALLBACK_MESSAGE.to_string()),
            Self::Remote(RemoteError::Unauthorized) => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Remote(e) => match e.server_message() {
                Some(msg) => msg.to_string(),
                None => "Could not reach the reservation server.".to_string(),
            },
            Self::Store(StoreError::Corrupt { path, .. }) => {
                format!("Local data in {} is unreadable", path.display())
            }
            Self::Store(e) => format!("Could not save locally: {e}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Remote(RemoteError::Conflict { .. }) => ErrorCategory::Conflict,
            Self::Remote(RemoteError::Unauthorized) => ErrorCategory::Auth,
            Self::Remote(RemoteError::Init(_)) => ErrorCategory::Config,
            Self::Remote(_) => ErrorCategory::Transient,
            Self::Store(StoreError::Corrupt { .. }) => ErrorCategory::Corruption,
            Self::Store(_) => ErrorCategory::Storage,
        }
    }
}

impl Error {
    /// True when the caller must drop its session and log in again
    pub fn requires_reauthentication(&self) -> bool {
        self.category() == ErrorCategory::Auth
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_category() {
        let err = Error::Validation(ValidationError::NameMissing);
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err = Error::Remote(RemoteError::Conflict { message: None });
        assert_eq!(err.category(), ErrorCategory::Conflict);

        let err = Error::Remote(RemoteError::Network("refused".into()));
        assert_eq!(err.category(), ErrorCategory::Transient);

        let err = Error::Remote(RemoteError::Unauthorized);
        assert_eq!(err.category(), ErrorCategory::Auth);

        let err = Error::Remote(RemoteError::Init("no TLS backend".into()));
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::Remote(RemoteError::Network("timeout".into())).is_recoverable());
        assert!(!Error::Remote(RemoteError::Unauthorized).is_recoverable());
        assert!(!Error::Remote(RemoteError::Init("bad".into())).is_recoverable());
    }

    #[test]
    fn test_user_message() {
        let err = Error::Remote(RemoteError::Conflict { message: None });
        assert_eq!(err.user_message(), CONFLICT_FALLBACK_MESSAGE);

        let err = Error::Remote(RemoteError::Conflict {
            message: Some("Slot full".into()),
        });
        assert_eq!(err.user_message(), "Slot full");

        let err = Error::Remote(RemoteError::Unauthorized);
        assert_eq!(err.user_message(), SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn test_requires_reauthentication() {
        assert!(Error::Remote(RemoteError::Unauthorized).requires_reauthentication());
        assert!(!Error::Validation(ValidationError::TimeMissing).requires_reauthentication());
    }

    #[test]
    fn test_error_conversion() {
        let unified: Error = ValidationError::PhoneMissing.into();
        assert!(matches!(unified, Error::Validation(_)));
    }

    #[test]
    fn test_store_errors_split_by_category() {
        let corrupt = Error::Store(StoreError::Corrupt {
            path: PathBuf::from("data/reservations.json"),
            source: serde_json::from_str::<u32>("{").unwrap_err(),
        });
        assert_eq!(corrupt.category(), ErrorCategory::Corruption);
        assert_eq!(corrupt.category().description(), "local data unreadable");
        assert!(corrupt.is_recoverable());

        let missing = Error::Store(StoreError::NotFound {
            date: "2025-03-10".into(),
            index: 4,
        });
        assert_eq!(missing.category(), ErrorCategory::Storage);
        assert!(!missing.is_recoverable());
    }
}
