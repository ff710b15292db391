//! Guest-facing booking core
//!
//! ```text
//!  BookingForm ──query──▶ AvailabilityResolver ──▶ ReservationAuthority
//!      │  ▲                      │
//!      │  └──── Availability ◀───┘
//!      │
//!      └─submit─▶ BookingSubmitter ──append──▶ DualLedger
//!                        │
//!                        └──create──▶ ReservationAuthority
//! ```
//!
//! - [`time`] - `HH:MM` wire times and 12-hour labels
//! - [`availability`] - slot resolution and the operating calendar
//! - [`form`] - per-session state and stale-result discard
//! - [`submit`] - the booking state machine

pub mod availability;
pub mod form;
pub mod submit;
pub mod time;

pub use availability::{Availability, AvailabilityResolver, ClosedReason, OperatingCalendar};
pub use form::{BookingForm, ContactDetails, ResolveTicket};
pub use submit::{BookingSettings, BookingSubmitter, SubmitOutcome};
