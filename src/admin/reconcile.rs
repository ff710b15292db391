//! Administrative reservation listing
//!
//! With an admin session the remote authority is the source of rows; without
//! one, the local ledger is. A remote read that fails for any reason other
//! than authorization falls back to the ledger and carries an advisory. An
//! authorization failure tears the session down and is returned as an error.
//!
//! Ledger rows get positional ids (`ls_{date}_{index}`), recomputed on every
//! read.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{DisplayRow, LocalRowId};
use crate::remote::ReservationAuthority;
use crate::storage::{DualLedger, SessionStore};
use crate::utils::error::RemoteError;

/// Advisory attached to rows served from the ledger after a remote failure
pub const LOCAL_DATA_ADVISORY: &str = "Showing local data because the server request failed.";

/// Which reservations to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    Date(NaiveDate),
    All,
}

impl RowScope {
    fn date(self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(date),
            Self::All => None,
        }
    }
}

/// Rows plus an optional non-fatal advisory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet {
    pub rows: Vec<DisplayRow>,
    pub advisory: Option<String>,
}

/// Merged admin view over the remote authority and the local ledger
pub struct ReconciliationView<A: ?Sized> {
    authority: Arc<A>,
    ledger: Arc<DualLedger>,
    sessions: Arc<SessionStore>,
}

impl<A: ReservationAuthority + ?Sized> ReconciliationView<A> {
    /// Create a view
    pub fn new(authority: Arc<A>, ledger: Arc<DualLedger>, sessions: Arc<SessionStore>) -> Self {
        Self {
            authority,
            ledger,
            sessions,
        }
    }

    /// Rows for one date
    pub async fn rows_for_date(&self, date: NaiveDate) -> Result<RowSet> {
        self.rows(RowScope::Date(date)).await
    }

    /// Rows for every date
    ///
    /// Ledger rows come out in the ledger's key order, per-date booking order
    /// within each key. Sort explicitly if chronological order matters.
    pub async fn rows_for_all(&self) -> Result<RowSet> {
        self.rows(RowScope::All).await
    }

    /// Rows for a scope
    pub async fn rows(&self, scope: RowScope) -> Result<RowSet> {
        let Some(token) = self.sessions.token() else {
            return Ok(RowSet {
                rows: self.local_rows(scope),
                advisory: None,
            });
        };

        match self.authority.list_reservations(&token, scope.date()).await {
            Ok(reservations) => {
                let rows = dedup_by_id(
                    reservations
                        .into_iter()
                        .map(DisplayRow::from_remote)
                        .collect(),
                );
                tracing::debug!(?scope, count = rows.len(), "Listed remote reservations");
                Ok(RowSet {
                    rows,
                    advisory: None,
                })
            }
            Err(RemoteError::Unauthorized) => Err(self.expire_session()),
            Err(e) => {
                tracing::warn!(?scope, error = %e, "Remote listing failed, showing local data");
                Ok(RowSet {
                    rows: self.local_rows(scope),
                    advisory: Some(LOCAL_DATA_ADVISORY.to_string()),
                })
            }
        }
    }

    /// Cancel a reservation, then re-list `scope`
    ///
    /// With a session the id is deleted remotely and any remote failure fails
    /// the cancellation. Without one the id must be a ledger row id.
    pub async fn cancel(&self, id: &str, scope: RowScope) -> Result<RowSet> {
        if let Some(token) = self.sessions.token() {
            match self.authority.delete_reservation(&token, id).await {
                Ok(()) => tracing::info!(%id, "Remote reservation cancelled"),
                Err(RemoteError::Unauthorized) => return Err(self.expire_session()),
                Err(e) => {
                    tracing::warn!(%id, error = %e, "Remote cancellation failed");
                    return Err(e.into());
                }
            }
        } else {
            let row: LocalRowId = id.parse()?;
            self.ledger.remove_at(row.date, row.index)?;
        }

        self.rows(scope).await
    }

    fn local_rows(&self, scope: RowScope) -> Vec<DisplayRow> {
        match scope {
            RowScope::Date(date) => self
                .ledger
                .read_by_date(date)
                .iter()
                .enumerate()
                .map(|(index, record)| DisplayRow::from_local(date, index, record))
                .collect(),
            RowScope::All => {
                let store = self.ledger.read_all();
                let mut rows = Vec::with_capacity(store.len());
                for (key, records) in store.iter() {
                    let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") else {
                        tracing::warn!(key, "Skipping ledger entries under a malformed date key");
                        continue;
                    };
                    rows.extend(
                        records
                            .iter()
                            .enumerate()
                            .map(|(index, record)| DisplayRow::from_local(date, index, record)),
                    );
                }
                rows
            }
        }
    }

    fn expire_session(&self) -> Error {
        tracing::warn!("Admin session rejected, forcing re-authentication");
        if let Err(e) = self.sessions.clear() {
            tracing::error!(error = %e, "Failed to clear expired session");
        }
        RemoteError::Unauthorized.into()
    }
}

fn dedup_by_id(rows: Vec<DisplayRow>) -> Vec<DisplayRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, TablebookErrorTrait};
    use crate::models::{LedgerRecord, RemoteReservation, RowSource};
    use crate::remote::fake::ScriptedAuthority;
    use chrono::Utc;
    use tempfile::TempDir;

    struct Setup {
        _dir: TempDir,
        fake: Arc<ScriptedAuthority>,
        ledger: Arc<DualLedger>,
        sessions: Arc<SessionStore>,
        view: ReconciliationView<ScriptedAuthority>,
    }

    fn setup() -> Setup {
        let dir = TempDir::new().unwrap();
        let fake = Arc::new(ScriptedAuthority::default());
        let ledger = Arc::new(DualLedger::open(dir.path()).unwrap());
        let sessions = Arc::new(SessionStore::open(dir.path()).unwrap());
        let view = ReconciliationView::new(
            Arc::clone(&fake),
            Arc::clone(&ledger),
            Arc::clone(&sessions),
        );
        Setup {
            _dir: dir,
            fake,
            ledger,
            sessions,
            view,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(name: &str) -> LedgerRecord {
        LedgerRecord {
            name: name.to_string(),
            email: "a@b.com".to_string(),
            phone: "555".to_string(),
            party_size: 2,
            time: "6:00 p.m.".to_string(),
            value: Some("18:00".to_string()),
            duration_slots: 1,
            created_at: Some(Utc::now()),
        }
    }

    fn remote(id: &str) -> RemoteReservation {
        RemoteReservation {
            id: id.to_string(),
            name: "R".to_string(),
            email: "r@b.com".to_string(),
            phone: "555".to_string(),
            party_size: 3,
            date: "2025-03-10T00:00:00.000Z".to_string(),
            time: "19:00".to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_local_rows_without_session() {
        let s = setup();
        let d = date("2025-03-10");
        s.ledger.append(d, record("a")).unwrap();
        s.ledger.append(d, record("b")).unwrap();

        let first = s.view.rows_for_date(d).await.unwrap();
        let second = s.view.rows_for_date(d).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.advisory, None);
        let ids: Vec<_> = first.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ls_2025-03-10_0", "ls_2025-03-10_1"]);
        assert!(first.rows.iter().all(|r| r.source == RowSource::Local));
        assert!(s.fake.listed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rows_stable_for_records_without_creation_time() {
        let s = setup();
        std::fs::write(
            s.ledger.path(),
            r#"{"2025-03-10":[{"name":"A","email":"a@b.com","phone":"555","people":4,"time":"6:30 p.m."}]}"#,
        )
        .unwrap();
        let d = date("2025-03-10");

        let first = s.view.rows_for_date(d).await.unwrap();
        let second = s.view.rows_for_date(d).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.rows[0].created_at, None);

        let all = s.view.rows_for_all().await.unwrap();
        let again = s.view.rows_for_all().await.unwrap();
        assert_eq!(all, again);
    }

    #[tokio::test]
    async fn test_all_rows_flatten_dates() {
        let s = setup();
        s.ledger.append(date("2025-03-12"), record("late")).unwrap();
        s.ledger.append(date("2025-03-10"), record("early-0")).unwrap();
        s.ledger.append(date("2025-03-10"), record("early-1")).unwrap();

        let all = s.view.rows_for_all().await.unwrap();
        let again = s.view.rows_for_all().await.unwrap();
        assert_eq!(all, again);

        let names: Vec<_> = all.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 3);
        let early0 = names.iter().position(|n| *n == "early-0").unwrap();
        let early1 = names.iter().position(|n| *n == "early-1").unwrap();
        assert!(early0 < early1);
    }

    #[tokio::test]
    async fn test_remote_rows_with_session() {
        let s = setup();
        s.sessions.save("tok").unwrap();
        s.fake.push_list(Ok(vec![remote("a1"), remote("a2"), remote("a1")]));

        let set = s.view.rows_for_date(date("2025-03-10")).await.unwrap();

        assert_eq!(set.advisory, None);
        assert_eq!(set.rows.len(), 2);
        assert_eq!(set.rows[0].date, Some(date("2025-03-10")));
        assert_eq!(set.rows[0].source, RowSource::Remote);
        assert_eq!(
            s.fake.listed.lock().unwrap().as_slice(),
            &[Some(date("2025-03-10"))]
        );
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_with_advisory() {
        let s = setup();
        s.sessions.save("tok").unwrap();
        s.ledger.append(date("2025-03-10"), record("a")).unwrap();
        s.fake.push_list(Err(RemoteError::Http {
            status: 500,
            message: "boom".into(),
        }));

        let set = s.view.rows_for_date(date("2025-03-10")).await.unwrap();

        assert_eq!(set.advisory.as_deref(), Some(LOCAL_DATA_ADVISORY));
        assert_eq!(set.rows.len(), 1);
        assert!(s.sessions.is_present());
    }

    #[tokio::test]
    async fn test_unauthorized_forces_reauthentication() {
        let s = setup();
        s.sessions.save("stale").unwrap();
        s.fake.push_list(Err(RemoteError::Unauthorized));

        let err = s.view.rows_for_all().await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Auth);
        assert!(err.requires_reauthentication());
        assert!(!s.sessions.is_present());
    }

    #[tokio::test]
    async fn test_cancel_local_row_reindexes() {
        let s = setup();
        let d = date("2025-03-10");
        s.ledger.append(d, record("a")).unwrap();
        s.ledger.append(d, record("b")).unwrap();

        let set = s.view.cancel("ls_2025-03-10_0", RowScope::Date(d)).await.unwrap();

        assert_eq!(set.rows.len(), 1);
        assert_eq!(set.rows[0].name, "b");
        assert_eq!(set.rows[0].id, "ls_2025-03-10_0");
    }

    #[tokio::test]
    async fn test_cancel_rejects_foreign_id_without_session() {
        let s = setup();
        let err = s
            .view
            .cancel("64f0c2a1", RowScope::All)
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_cancel_remote() {
        let s = setup();
        s.sessions.save("tok").unwrap();
        s.fake.push_list(Ok(vec![]));

        let set = s.view.cancel("a1", RowScope::All).await.unwrap();

        assert!(set.rows.is_empty());
        assert_eq!(s.fake.deleted.lock().unwrap().as_slice(), &["a1".to_string()]);
    }

    #[tokio::test]
    async fn test_remote_cancel_failure_is_fatal() {
        let s = setup();
        s.sessions.save("tok").unwrap();
        s.ledger.append(date("2025-03-10"), record("a")).unwrap();
        s.fake.push_delete(Err(RemoteError::Network("reset".into())));

        let err = s
            .view
            .cancel("ls_2025-03-10_0", RowScope::All)
            .await
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Transient);
        // the ledger is untouched
        assert_eq!(s.ledger.read_all().len(), 1);
    }
}
