//! Process-durable local state
//!
//! - [`ledger`] - write-ahead ledger of every booking attempt
//! - [`session`] - admin bearer token slot

pub mod ledger;
pub mod session;

pub use ledger::{DualLedger, STORE_NAME};
pub use session::SessionStore;
