//! Per-session booking form state
//!
//! Holds what the guest sees and edits: the current query, the resolved
//! slots, slots that filled up during this visit, the selected time, contact
//! fields and the last message. Every change of query starts a new
//! resolution generation; results carrying an older generation are dropped.

use chrono::NaiveDate;

use super::availability::Availability;
use crate::models::{AvailabilityQuery, DisabledSlotSet, Slot};
use crate::utils::error::ValidationError;

const DEFAULT_PARTY_SIZE: u32 = 2;
const DEFAULT_DURATION_SLOTS: u32 = 1;

/// Contact fields as typed by the guest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Claim on applying the result of one availability resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveTicket {
    generation: u64,
    query: AvailabilityQuery,
}

impl ResolveTicket {
    /// Query this resolution is for
    pub fn query(&self) -> &AvailabilityQuery {
        &self.query
    }
}

/// UI-facing state of one booking session
#[derive(Debug, Clone)]
pub struct BookingForm {
    query: AvailabilityQuery,
    max_party_size: u32,
    generation: u64,
    /// `None` while the current resolution is pending
    availability: Option<Availability>,
    disabled: DisabledSlotSet,
    selected: Option<String>,
    pub contact: ContactDetails,
    submitting: bool,
    error: Option<String>,
    confirmation: Option<String>,
    refresh_after_confirmation: bool,
}

impl BookingForm {
    /// New form for `date` with the default party size and duration
    pub fn new(date: NaiveDate, max_party_size: u32) -> Self {
        Self {
            query: AvailabilityQuery::new(date, DEFAULT_PARTY_SIZE, DEFAULT_DURATION_SLOTS),
            max_party_size,
            generation: 0,
            availability: None,
            disabled: DisabledSlotSet::new(),
            selected: None,
            contact: ContactDetails::default(),
            submitting: false,
            error: None,
            confirmation: None,
            refresh_after_confirmation: false,
        }
    }

    // ------------------------------------------------------------------
    // Query
    // ------------------------------------------------------------------

    pub fn query(&self) -> &AvailabilityQuery {
        &self.query
    }

    /// Change the date; starts a new resolution
    pub fn set_date(&mut self, date: NaiveDate) -> ResolveTicket {
        self.query.date = date;
        self.begin_resolution()
    }

    /// Change the party size; starts a new resolution
    pub fn set_party_size(&mut self, party_size: u32) -> Result<ResolveTicket, ValidationError> {
        AvailabilityQuery {
            party_size,
            ..self.query
        }
        .validate(self.max_party_size)?;
        self.query.party_size = party_size;
        Ok(self.begin_resolution())
    }

    /// Change the number of slots the booking spans; starts a new resolution
    pub fn set_duration_slots(
        &mut self,
        duration_slots: u32,
    ) -> Result<ResolveTicket, ValidationError> {
        AvailabilityQuery {
            duration_slots,
            ..self.query
        }
        .validate(self.max_party_size)?;
        self.query.duration_slots = duration_slots;
        Ok(self.begin_resolution())
    }

    /// Start resolving the current query
    ///
    /// Clears the selection, the disabled slots and any closed-day advisory of
    /// the previous query, and invalidates every earlier ticket.
    pub fn begin_resolution(&mut self) -> ResolveTicket {
        self.generation += 1;
        self.availability = None;
        self.selected = None;
        self.disabled.clear();
        self.error = None;

        ResolveTicket {
            generation: self.generation,
            query: self.query,
        }
    }

    /// Apply a resolution result; returns `false` if the ticket is stale
    pub fn apply_resolution(&mut self, ticket: &ResolveTicket, availability: Availability) -> bool {
        if ticket.generation != self.generation || ticket.query != self.query {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale availability result"
            );
            return false;
        }

        self.availability = Some(availability);
        true
    }

    // ------------------------------------------------------------------
    // Slots and selection
    // ------------------------------------------------------------------

    /// Resolved slots; empty while pending or closed
    pub fn slots(&self) -> &[Slot] {
        self.availability
            .as_ref()
            .map(Availability::slots)
            .unwrap_or(&[])
    }

    /// True once a resolution has been applied
    pub fn is_resolved(&self) -> bool {
        self.availability.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.availability
            .as_ref()
            .is_some_and(Availability::is_closed)
    }

    /// Closed-day advisory for the current query
    pub fn closed_reason(&self) -> Option<String> {
        self.availability.as_ref().and_then(Availability::reason)
    }

    /// Wire times that filled up during this visit
    pub fn disabled(&self) -> &DisabledSlotSet {
        &self.disabled
    }

    /// Whether a slot can currently be picked
    pub fn is_selectable(&self, slot: &Slot) -> bool {
        !self.disabled.contains(slot.value())
    }

    /// Select a slot by its display label
    ///
    /// Returns `false` for labels that are not offered or whose slot is disabled.
    pub fn select(&mut self, label: &str) -> bool {
        let selectable = self
            .slots()
            .iter()
            .any(|slot| slot.label() == label && self.is_selectable(slot));

        if selectable {
            self.selected = Some(label.to_string());
        }
        selectable
    }

    /// Selected display label
    pub fn selected_label(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Wire time of the selection
    ///
    /// Falls back to the label itself when it matches no current slot.
    pub fn selected_value(&self) -> Option<String> {
        let label = self.selected.as_deref()?;
        let value = self
            .slots()
            .iter()
            .find(|slot| slot.label() == label)
            .map(|slot| slot.value().to_string())
            .unwrap_or_else(|| label.to_string());
        Some(value)
    }

    // ------------------------------------------------------------------
    // Submission state
    // ------------------------------------------------------------------

    /// True while a booking attempt is in flight
    ///
    /// Submission takes `&mut BookingForm`, so the borrow is what excludes a
    /// second concurrent attempt. The flag only lets a UI render the pending
    /// state, and is cleared even if the attempt is dropped mid-flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Message from the last failed attempt
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Confirmation text of the last successful booking, until acknowledged
    pub fn confirmation(&self) -> Option<&str> {
        self.confirmation.as_deref()
    }

    /// Dismiss the confirmation
    ///
    /// After a successful booking this starts the follow-up resolution so the
    /// slot list reflects the new reservation.
    pub fn acknowledge_confirmation(&mut self) -> Option<ResolveTicket> {
        self.confirmation = None;
        if std::mem::take(&mut self.refresh_after_confirmation) {
            Some(self.begin_resolution())
        } else {
            None
        }
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    /// The slot filled up: grey it out and drop the selection
    pub(crate) fn mark_full(&mut self, value: &str) {
        self.disabled.insert(value);
        self.selected = None;
    }

    /// Booking confirmed: show the text and reset the inputs
    pub(crate) fn complete(&mut self, confirmation: String) {
        self.confirmation = Some(confirmation);
        self.selected = None;
        self.contact = ContactDetails::default();
        self.refresh_after_confirmation = true;
    }
}
