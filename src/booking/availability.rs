//! Availability resolution against the remote authority
//!
//! A query resolves to either a list of offerable [`Slot`]s or a closed day.
//! The operating calendar is checked first: on a non-operating weekday the
//! remote authority is not asked at all. Otherwise an empty answer or a failed
//! request both close the day.

use chrono::{Datelike, Weekday};
use std::sync::Arc;

use super::form::BookingForm;
use crate::models::{AvailabilityQuery, Slot};
use crate::remote::ReservationAuthority;

/// Why a day cannot be booked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosedReason {
    /// The venue never opens on this weekday
    NonOperatingDay(Weekday),
    /// The authority answered with no slots
    NoAvailability,
    /// The authority could not be asked
    Unreachable(String),
}

impl ClosedReason {
    /// Advisory shown to the guest
    pub fn message(&self) -> String {
        match self {
            Self::NonOperatingDay(day) => format!("We are closed on {}s.", weekday_name(*day)),
            Self::NoAvailability | Self::Unreachable(_) => {
                "No tables are available on this date. Please choose another day.".to_string()
            }
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Result of resolving one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Offerable slots, in the authority's order (never empty)
    Open(Vec<Slot>),
    /// No booking possible on this day
    Closed(ClosedReason),
}

impl Availability {
    /// Offerable slots; empty when closed
    pub fn slots(&self) -> &[Slot] {
        match self {
            Self::Open(slots) => slots,
            Self::Closed(_) => &[],
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }

    /// Closed-day advisory, if closed
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Open(_) => None,
            Self::Closed(reason) => Some(reason.message()),
        }
    }
}

/// Fixed weekly calendar of non-operating days
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingCalendar {
    closed: Vec<Weekday>,
}

impl OperatingCalendar {
    /// Calendar closed on the given weekdays
    pub fn closed_on(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut closed: Vec<Weekday> = Vec::new();
        for day in days {
            if !closed.contains(&day) {
                closed.push(day);
            }
        }
        Self { closed }
    }

    /// The non-operating weekday `date` falls on, if any
    pub fn closed_weekday(&self, date: chrono::NaiveDate) -> Option<Weekday> {
        let day = date.weekday();
        self.closed.contains(&day).then_some(day)
    }
}

impl Default for OperatingCalendar {
    fn default() -> Self {
        Self::closed_on([Weekday::Tue, Weekday::Wed])
    }
}

/// Resolves availability queries against the remote authority
pub struct AvailabilityResolver<A: ?Sized> {
    authority: Arc<A>,
    calendar: OperatingCalendar,
}

impl<A: ReservationAuthority + ?Sized> AvailabilityResolver<A> {
    /// Create a resolver
    pub fn new(authority: Arc<A>, calendar: OperatingCalendar) -> Self {
        Self {
            authority,
            calendar,
        }
    }

    /// Resolve one query
    pub async fn resolve(&self, query: &AvailabilityQuery) -> Availability {
        if let Some(day) = self.calendar.closed_weekday(query.date) {
            tracing::debug!(date = %query.date, ?day, "Non-operating day, skipping remote query");
            return Availability::Closed(ClosedReason::NonOperatingDay(day));
        }

        match self.authority.availability(query).await {
            Ok(times) if times.is_empty() => {
                tracing::info!(date = %query.date, party_size = query.party_size, "No slots offered");
                Availability::Closed(ClosedReason::NoAvailability)
            }
            Ok(times) => {
                tracing::debug!(date = %query.date, count = times.len(), "Slots resolved");
                Availability::Open(times.into_iter().map(Slot::from_wire).collect())
            }
            Err(e) => {
                tracing::warn!(date = %query.date, error = %e, "Availability query failed");
                Availability::Closed(ClosedReason::Unreachable(e.to_string()))
            }
        }
    }

    /// Re-resolve the form's current query and apply the result
    ///
    /// Holds the form for the whole round trip. Callers that keep the form
    /// editable while a query is in flight use [`BookingForm::begin_resolution`],
    /// [`resolve`](Self::resolve) and [`BookingForm::apply_resolution`]
    /// separately, which discards results for superseded queries.
    pub async fn refresh(&self, form: &mut BookingForm) -> bool {
        let ticket = form.begin_resolution();
        let availability = self.resolve(ticket.query()).await;
        form.apply_resolution(&ticket, availability)
    }
}
