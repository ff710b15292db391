//! Administrative side: login and the reconciled reservation listing
//!
//! - [`auth`] - login, logout and session verification
//! - [`reconcile`] - remote/ledger reservation rows and cancellation

pub mod auth;
pub mod reconcile;

pub use auth::Authenticator;
pub use reconcile::{ReconciliationView, RowScope, RowSet, LOCAL_DATA_ADVISORY};
