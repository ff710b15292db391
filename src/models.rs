//! Core data structures shared by the booking and admin flows

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::booking::time;
use crate::utils::error::ValidationError;

// ============================================================================
// Slots and queries
// ============================================================================

/// One offerable booking time
///
/// `value` is the canonical `HH:MM` wire time; `label` is derived from it and
/// is what the guest selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Slot {
    value: String,
    label: String,
}

impl Slot {
    /// Build a slot from a wire time returned by the remote authority
    pub fn from_wire(value: impl Into<String>) -> Self {
        let value = value.into();
        let label = time::to_label(&value);
        Self { value, label }
    }

    /// Canonical `HH:MM`
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Localized 12-hour label
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Parameters of an availability query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub party_size: u32,
    pub duration_slots: u32,
}

impl AvailabilityQuery {
    /// Create a query
    pub fn new(date: NaiveDate, party_size: u32, duration_slots: u32) -> Self {
        Self {
            date,
            party_size,
            duration_slots,
        }
    }

    /// Check party size and duration bounds
    pub fn validate(&self, max_party_size: u32) -> Result<(), ValidationError> {
        if self.party_size == 0 || self.party_size > max_party_size {
            return Err(ValidationError::PartySize {
                max: max_party_size,
            });
        }
        if self.duration_slots == 0 {
            return Err(ValidationError::Duration);
        }
        Ok(())
    }
}

/// Noun for a party of `n`
pub fn party_noun(n: u32) -> &'static str {
    if n == 1 {
        "person"
    } else {
        "people"
    }
}

// ============================================================================
// Booking request
// ============================================================================

/// A booking attempt as sent to the remote authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub party_size: u32,
    pub date: NaiveDate,
    /// Canonical `HH:MM`
    pub time: String,
    pub duration_slots: u32,
}

// ============================================================================
// Local ledger
// ============================================================================

/// Durable record of one booking attempt, kept regardless of remote outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(rename = "people", default)]
    pub party_size: u32,

    /// Time label as the guest saw it
    #[serde(default)]
    pub time: String,

    /// Canonical `HH:MM` that was submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default = "default_duration_slots")]
    pub duration_slots: u32,

    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_duration_slots() -> u32 {
    1
}

impl LedgerRecord {
    /// Record for a request about to be submitted
    pub fn for_request(request: &BookingRequest, label: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            party_size: request.party_size,
            time: label.to_string(),
            value: Some(request.time.clone()),
            duration_slots: request.duration_slots,
            created_at: Some(created_at),
        }
    }
}

/// Every ledger record, keyed by ISO date, in booking order per date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerStore(BTreeMap<String, Vec<LedgerRecord>>);

impl LedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; returns its index within the date
    pub fn append(&mut self, date: NaiveDate, record: LedgerRecord) -> usize {
        let records = self.0.entry(date.to_string()).or_default();
        records.push(record);
        records.len() - 1
    }

    /// Records for one date, in booking order
    pub fn by_date(&self, date: NaiveDate) -> &[LedgerRecord] {
        self.0
            .get(&date.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove the record at `index` for `date`
    pub fn remove_at(&mut self, date: NaiveDate, index: usize) -> Option<LedgerRecord> {
        let records = self.0.get_mut(&date.to_string())?;
        if index >= records.len() {
            return None;
        }
        Some(records.remove(index))
    }

    /// Iterate `(date key, records)` in the store's key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LedgerRecord])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Remote records and admin rows
// ============================================================================

/// Authoritative reservation owned by the remote system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteReservation {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub party_size: u32,

    /// Either `YYYY-MM-DD` or a full timestamp, depending on the server
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub time: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Where an admin row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSource {
    Remote,
    Local,
}

/// One row of the administrative reservation listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub party_size: u32,
    pub date: Option<NaiveDate>,
    pub time: String,
    /// As stored; `None` when the source record carries no creation time
    pub created_at: Option<DateTime<Utc>>,
    pub source: RowSource,
}

impl DisplayRow {
    /// Row for a remote reservation
    pub fn from_remote(reservation: RemoteReservation) -> Self {
        Self {
            date: normalize_date(&reservation.date),
            id: reservation.id,
            name: reservation.name,
            email: reservation.email,
            phone: reservation.phone,
            party_size: reservation.party_size,
            time: reservation.time,
            created_at: reservation.created_at,
            source: RowSource::Remote,
        }
    }

    /// Row for the ledger record at `index` within `date`
    pub fn from_local(date: NaiveDate, index: usize, record: &LedgerRecord) -> Self {
        Self {
            id: LocalRowId { date, index }.to_string(),
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            party_size: record.party_size,
            date: Some(date),
            time: record.time.clone(),
            created_at: record.created_at,
            source: RowSource::Local,
        }
    }

    /// Creation time for display; records without one show as `now`
    pub fn created_or(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.created_at.unwrap_or(now)
    }
}

/// Calendar date of a remote `date` field
///
/// Timestamps are reduced to their UTC calendar date. Unparsable input yields `None`.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Synthetic id of a ledger-sourced row: `ls_{date}_{index}`
///
/// Positional, so it shifts when a lower-indexed record on the same date is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalRowId {
    pub date: NaiveDate,
    pub index: usize,
}

const LOCAL_ROW_PREFIX: &str = "ls_";

impl fmt::Display for LocalRowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LOCAL_ROW_PREFIX}{}_{}", self.date, self.index)
    }
}

impl FromStr for LocalRowId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidRowId(s.to_string());

        let rest = s.strip_prefix(LOCAL_ROW_PREFIX).ok_or_else(invalid)?;
        let (date, index) = rest.rsplit_once('_').ok_or_else(invalid)?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
        let index = index.parse::<usize>().map_err(|_| invalid())?;

        Ok(Self { date, index })
    }
}

// ============================================================================
// Session state
// ============================================================================

/// Wire times that filled up during the current page visit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledSlotSet(HashSet<String>);

impl DisabledSlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a wire time as full
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.0.insert(value.into())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
