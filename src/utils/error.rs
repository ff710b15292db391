//! Error types for the booking core
//!
//! This module defines the domain-specific error types used throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Missing or invalid user input; never contacts the remote authority
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The selected day is not bookable
    #[error("{0}")]
    DayClosed(String),

    /// No time slot selected
    #[error("Please pick a time")]
    TimeMissing,

    /// Empty name field
    #[error("Please enter your name")]
    NameMissing,

    /// Empty email field
    #[error("Please enter your email")]
    EmailMissing,

    /// Empty phone field
    #[error("Please enter your phone")]
    PhoneMissing,

    /// Party size outside the bookable range
    #[error("Party size must be between 1 and {max}")]
    PartySize { max: u32 },

    /// Zero-length booking
    #[error("A booking must span at least one slot")]
    Duration,

    /// Admin login with an empty username or password
    #[error("Please fill in both fields")]
    CredentialsMissing,

    /// Row id that is neither remote nor a well-formed local id
    #[error("Invalid reservation id: {0}")]
    InvalidRowId(String),
}

/// Errors reported by, or on the way to, the remote authority
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The requested slot filled up before the booking landed
    #[error("Slot full: {}", message.as_deref().unwrap_or("no message"))]
    Conflict { message: Option<String> },

    /// The session token is missing, invalid or expired
    #[error("Unauthorized")]
    Unauthorized,

    /// Any other non-success status
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// HTTP client construction failed
    #[error("Initialization error: {0}")]
    Init(String),
}

impl RemoteError {
    /// Slot became full on the remote side
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Session must be torn down
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Worth retrying an idempotent request
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Message supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Conflict { message } => message.as_deref(),
            Self::Http { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Errors writing the durable local slots (ledger, session)
#[derive(Error, Debug)]
pub enum StoreError {
    /// Creating the data directory failed
    #[error("Failed to create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or replacing a store file failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading an existing store file failed
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A store file exists but does not parse
    #[error("Unreadable store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory document could not be encoded
    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No record at the given position
    #[error("No ledger record at {date} #{index}")]
    NotFound { date: String, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::TimeMissing.to_string(), "Please pick a time");
        assert_eq!(
            ValidationError::DayClosed("We are closed on Tuesdays.".into()).to_string(),
            "We are closed on Tuesdays."
        );
    }

    #[test]
    fn test_remote_error_classification() {
        assert!(RemoteError::Conflict { message: None }.is_conflict());
        assert!(RemoteError::Unauthorized.is_unauthorized());
        assert!(RemoteError::Network("reset".into()).is_transient());
        assert!(RemoteError::Http {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!RemoteError::Http {
            status: 400,
            message: String::new()
        }
        .is_transient());
    }

    #[test]
    fn test_server_message() {
        let err = RemoteError::Conflict {
            message: Some("Slot full".into()),
        };
        assert_eq!(err.server_message(), Some("Slot full"));

        let err = RemoteError::Http {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.server_message(), None);
    }
}
