//! Remote authority: the system of record for reservations and availability
//!
//! The booking core only queries and requests mutations; it never computes
//! availability itself.
//!
//! ```text
//!  GET    /api/availability?date&partySize&durationSlots  -> { slots: ["HH:MM", ...] }
//!  POST   /api/reservations                                -> created | 409 | error
//!  GET    /api/reservations[?date]          (bearer)       -> [reservation, ...]
//!  DELETE /api/reservations/{id}            (bearer)
//!  POST   /api/admin/login                                 -> { token }
//!  GET    /api/auth/me                      (bearer)
//! ```

pub mod client;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{AvailabilityQuery, BookingRequest, RemoteReservation};
use crate::utils::error::RemoteError;

pub use client::{ClientConfig, HttpAuthority};

/// Operations the booking core needs from the remote authority
#[async_trait]
pub trait ReservationAuthority: Send + Sync {
    /// Offerable wire times for a query, in the authority's order
    async fn availability(&self, query: &AvailabilityQuery) -> Result<Vec<String>, RemoteError>;

    /// Create a reservation; `Conflict` when the slot is already full
    ///
    /// The created record is returned when the response carries one.
    async fn create_reservation(
        &self,
        request: &BookingRequest,
    ) -> Result<Option<RemoteReservation>, RemoteError>;

    /// Reservations, optionally for one date
    async fn list_reservations(
        &self,
        token: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<RemoteReservation>, RemoteError>;

    /// Delete one reservation by remote id
    async fn delete_reservation(&self, token: &str, id: &str) -> Result<(), RemoteError>;

    /// Exchange admin credentials for a bearer token
    async fn login(&self, username: &str, password: &str) -> Result<String, RemoteError>;

    /// Check that a bearer token is still accepted
    async fn verify_session(&self, token: &str) -> Result<(), RemoteError>;
}
