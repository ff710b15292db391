//! Durable slot holding the admin bearer token

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::utils::error::StoreError;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Serialize, Deserialize)]
struct SessionDocument {
    token: String,
}

/// File-backed token storage
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Open the session slot inside `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::CreateDir {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: data_dir.join(SESSION_FILE),
        })
    }

    /// Current token, if a session exists
    ///
    /// An unreadable session file counts as no session.
    pub fn token(&self) -> Option<String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Session file unreadable");
                return None;
            }
        };

        match serde_json::from_str::<SessionDocument>(&content) {
            Ok(doc) if !doc.token.is_empty() => Some(doc.token),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Session file corrupt");
                None
            }
        }
    }

    /// True when a token is stored
    pub fn is_present(&self) -> bool {
        self.token().is_some()
    }

    /// Persist a new token
    pub fn save(&self, token: &str) -> Result<(), StoreError> {
        let doc = SessionDocument {
            token: token.to_string(),
        };
        let json = serde_json::to_string(&doc)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "Session token saved");
        Ok(())
    }

    /// Drop the stored token
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Admin session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
