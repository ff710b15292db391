//! Command implementations for the tablebook binary

pub mod admin;
pub mod book;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::admin::{Authenticator, ReconciliationView};
use crate::booking::{AvailabilityResolver, BookingSubmitter};
use crate::config::Config;
use crate::remote::HttpAuthority;
use crate::storage::{DualLedger, SessionStore};

// Re-export command functions for convenience
pub use admin::{cancel, list, login, logout, ListParams};
pub use book::{book, slots, BookParams};

/// Everything a command needs, wired from one [`Config`]
pub struct AppContext {
    pub config: Config,
    pub authority: Arc<HttpAuthority>,
    pub ledger: Arc<DualLedger>,
    pub sessions: Arc<SessionStore>,
}

impl AppContext {
    /// Read configuration from a file if given, the environment otherwise
    pub fn read_config(config_path: Option<&Path>) -> Result<Config> {
        match config_path {
            Some(path) => Config::from_file(path),
            None => Config::from_env(),
        }
    }

    /// Wire components from an explicit configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let authority = HttpAuthority::new(config.client_config())
            .context("Failed to create reservation server client")?;
        let ledger = DualLedger::open(&config.storage.data_dir)?;
        let sessions = SessionStore::open(&config.storage.data_dir)?;

        tracing::debug!(
            base_url = %authority.base_url(),
            data_dir = %config.storage.data_dir.display(),
            "Application context ready"
        );

        Ok(Self {
            config,
            authority: Arc::new(authority),
            ledger: Arc::new(ledger),
            sessions: Arc::new(sessions),
        })
    }

    pub fn resolver(&self) -> Result<AvailabilityResolver<HttpAuthority>> {
        Ok(AvailabilityResolver::new(
            Arc::clone(&self.authority),
            self.config.calendar()?,
        ))
    }

    pub fn submitter(&self) -> BookingSubmitter<HttpAuthority> {
        BookingSubmitter::new(
            Arc::clone(&self.authority),
            Arc::clone(&self.ledger),
            self.config.booking_settings(),
        )
    }

    pub fn authenticator(&self) -> Authenticator<HttpAuthority> {
        Authenticator::new(Arc::clone(&self.authority), Arc::clone(&self.sessions))
    }

    pub fn reconciliation(&self) -> ReconciliationView<HttpAuthority> {
        ReconciliationView::new(
            Arc::clone(&self.authority),
            Arc::clone(&self.ledger),
            Arc::clone(&self.sessions),
        )
    }
}
