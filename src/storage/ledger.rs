//! Local write-ahead ledger of booking attempts
//!
//! Every booking attempt is appended here before the remote authority is
//! contacted, and stays here whatever the remote outcome. The whole
//! [`LedgerStore`] lives in one JSON document named after [`STORE_NAME`].
//!
//! Reads never fail: a missing document is an empty store, and a corrupt
//! one is logged and treated as empty. Writes replace the document through a
//! temp file and rename, so a crash mid-write leaves the previous version.
//!
//! # Example
//!
//! ```no_run
//! use tablebook::storage::DualLedger;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), tablebook::error::StoreError> {
//! let ledger = DualLedger::open(Path::new("./data"))?;
//! let all = ledger.read_all();
//! println!("{} booking attempts on record", all.len());
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, TablebookErrorTrait};
use crate::models::{LedgerRecord, LedgerStore};
use crate::utils::error::StoreError;

/// Name of the durable slot holding the ledger
pub const STORE_NAME: &str = "reservations";

/// Handle to the ledger document on disk
#[derive(Debug, Clone)]
pub struct DualLedger {
    path: PathBuf,
}

impl DualLedger {
    /// Open the ledger inside `data_dir`, creating the directory if needed
    ///
    /// The document itself is created lazily on first append.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::CreateDir {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(Self::at(data_dir.join(format!("{STORE_NAME}.json"))))
    }

    /// Use an explicit document path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the ledger document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store; missing or corrupt data reads as empty
    pub fn load(&self) -> LedgerStore {
        self.try_load().unwrap_or_else(|e| {
            let category = Error::from(e).category();
            tracing::warn!(
                path = %self.path.display(),
                category = category.description(),
                "Ledger unreadable, treating as empty"
            );
            LedgerStore::new()
        })
    }

    /// Read the whole store, reporting why an existing document can't be used
    ///
    /// A missing document is still an empty store.
    pub fn try_load(&self) -> Result<LedgerStore, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LedgerStore::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the stored document
    pub fn save(&self, store: &LedgerStore) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Write to temp file first, then rename
        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, store)?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        fs::rename(&temp_path, &self.path).map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), records = store.len(), "Ledger saved");
        Ok(())
    }

    /// Append a record for `date`; returns its index within the date
    pub fn append(&self, date: NaiveDate, record: LedgerRecord) -> Result<usize, StoreError> {
        let mut store = self.load();
        let index = store.append(date, record);
        self.save(&store)?;

        tracing::info!(%date, index, "Booking attempt recorded in ledger");
        Ok(index)
    }

    /// Records for one date, in booking order
    pub fn read_by_date(&self, date: NaiveDate) -> Vec<LedgerRecord> {
        self.load().by_date(date).to_vec()
    }

    /// Every record, keyed by date
    pub fn read_all(&self) -> LedgerStore {
        self.load()
    }

    /// Remove the record at `index` for `date`
    pub fn remove_at(&self, date: NaiveDate, index: usize) -> Result<LedgerRecord, StoreError> {
        let mut store = self.load();
        let removed = store
            .remove_at(date, index)
            .ok_or_else(|| StoreError::NotFound {
                date: date.to_string(),
                index,
            })?;
        self.save(&store)?;

        tracing::info!(%date, index, "Ledger record removed");
        Ok(removed)
    }
}
