//! Common test utilities

use chrono::NaiveDate;
use std::sync::Arc;
use tablebook::remote::{ClientConfig, HttpAuthority};
use tablebook::storage::{DualLedger, SessionStore};
use tempfile::TempDir;

/// Open weekday used by the booking scenarios (a Monday)
pub fn open_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

/// Non-operating weekday under the default calendar (a Tuesday)
#[allow(dead_code)]
pub fn closed_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
}

/// HTTP authority pointed at a mock server
pub fn authority(base_url: &str) -> Arc<HttpAuthority> {
    Arc::new(HttpAuthority::new(ClientConfig::new(base_url)).unwrap())
}

/// Ledger and session store in a fresh temporary directory
///
/// The `TempDir` must be kept alive for the duration of the test.
#[allow(dead_code)]
pub fn stores() -> (TempDir, Arc<DualLedger>, Arc<SessionStore>) {
    let dir = TempDir::new().unwrap();
    let ledger = DualLedger::open(dir.path()).unwrap();
    let sessions = SessionStore::open(dir.path()).unwrap();
    (dir, Arc::new(ledger), Arc::new(sessions))
}
