//! tablebook - restaurant table reservations with a local write-ahead ledger
//!
//! Guests pick a date, party size and duration, choose one of the times the
//! reservation server offers, and submit contact details. Every submission is
//! written to a local ledger before the server is asked, so a booking survives
//! network failures. Administrators list and cancel reservations, seeing local
//! ledger rows whenever the server cannot be reached.
//!
//! # Architecture
//!
//! - [`booking`] - form state, availability resolution and submission
//! - [`admin`] - login and the reconciled reservation listing
//! - [`remote`] - the reservation server seam and its HTTP client
//! - [`storage`] - the write-ahead ledger and the session token store
//! - [`models`] - core data structures and wire types
//! - [`config`] - configuration management and settings
//! - [`commands`] - command implementations used by the binary
//! - [`utils`] - common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tablebook::booking::AvailabilityResolver;
//! use tablebook::config::Config;
//! use tablebook::remote::HttpAuthority;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let authority = Arc::new(HttpAuthority::new(config.client_config())?);
//!     let resolver = AvailabilityResolver::new(authority, config.calendar()?);
//!     let mut form = tablebook::booking::BookingForm::new(
//!         chrono::Local::now().date_naive(),
//!         config.booking.max_party_size,
//!     );
//!     resolver.refresh(&mut form).await;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod booking;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::admin::{Authenticator, ReconciliationView, RowScope, RowSet};
    pub use crate::booking::{
        Availability, AvailabilityResolver, BookingForm, BookingSubmitter, ClosedReason,
        SubmitOutcome,
    };
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, TablebookErrorTrait};
    pub use crate::models::{AvailabilityQuery, BookingRequest, DisplayRow, LedgerRecord, Slot};
    pub use crate::remote::{HttpAuthority, ReservationAuthority};
    pub use crate::storage::{DualLedger, SessionStore};
}

// Direct re-exports for convenience
pub use models::{AvailabilityQuery, BookingRequest, DisplayRow, LedgerRecord, Slot};
