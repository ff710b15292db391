//! Booking submission
//!
//! One attempt runs through: validate the form, append the attempt to the
//! local ledger, submit it to the remote authority, then fold the outcome
//! back into the form. The ledger append happens before the remote call and
//! is never rolled back, so the intent survives whatever the remote says.

use chrono::Utc;
use std::sync::Arc;

use super::form::BookingForm;
use super::time;
use crate::error::{Result, CONFLICT_FALLBACK_MESSAGE};
use crate::models::{party_noun, BookingRequest, LedgerRecord};
use crate::remote::ReservationAuthority;
use crate::storage::DualLedger;
use crate::utils::error::{RemoteError, ValidationError};
use crate::utils::non_empty_trimmed;

/// Shown when the remote could not confirm but the ledger holds the attempt
pub const SAVED_LOCALLY_MESSAGE: &str = "Network issue. Your booking was saved locally.";

/// Venue-level booking settings
#[derive(Debug, Clone)]
pub struct BookingSettings {
    /// Name used in the confirmation text
    pub venue_name: String,

    /// Minutes covered by one slot
    pub step_minutes: u32,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            venue_name: "Paris Pub".to_string(),
            step_minutes: 30,
        }
    }
}

/// Result of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another attempt is already in flight; nothing happened
    Ignored,
    /// The form is incomplete; nothing was recorded or sent
    Rejected(ValidationError),
    /// The remote accepted the booking
    Confirmed { message: String },
    /// The slot filled before the booking landed
    Conflict { time: String, message: String },
    /// The remote could not be reached or answered unreadably; the ledger
    /// holds the attempt
    Unconfirmed { message: String, error: RemoteError },
    /// The remote refused the booking for a reason other than a full slot;
    /// the ledger still holds the attempt
    Declined { message: String, error: RemoteError },
}

/// Holds the form's in-flight flag for the duration of one remote call
struct PendingSubmission<'a> {
    form: &'a mut BookingForm,
}

impl<'a> PendingSubmission<'a> {
    fn engage(form: &'a mut BookingForm) -> Self {
        form.set_submitting(true);
        Self { form }
    }
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        self.form.set_submitting(false);
    }
}

/// Drives booking attempts for a form
pub struct BookingSubmitter<A: ?Sized> {
    authority: Arc<A>,
    ledger: Arc<DualLedger>,
    settings: BookingSettings,
}

impl<A: ReservationAuthority + ?Sized> BookingSubmitter<A> {
    /// Create a submitter
    pub fn new(authority: Arc<A>, ledger: Arc<DualLedger>, settings: BookingSettings) -> Self {
        Self {
            authority,
            ledger,
            settings,
        }
    }

    /// Run one booking attempt for the form's current state
    ///
    /// Only a failure to write the local ledger is returned as an error; in
    /// that case the remote authority is not contacted. An attempt already
    /// marked in flight is [`SubmitOutcome::Ignored`].
    pub async fn submit(&self, form: &mut BookingForm) -> Result<SubmitOutcome> {
        if form.is_submitting() {
            tracing::debug!("Submission already in flight, ignoring");
            return Ok(SubmitOutcome::Ignored);
        }
        form.clear_error();

        let (request, label) = match validate(form) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::debug!(error = %e, "Booking rejected by validation");
                form.set_error(e.to_string());
                return Ok(SubmitOutcome::Rejected(e));
            }
        };

        let record = LedgerRecord::for_request(&request, &label, Utc::now());
        if let Err(e) = self.ledger.append(request.date, record) {
            tracing::error!(error = %e, date = %request.date, "Failed to record booking attempt");
            form.set_error(format!("Could not save your booking: {e}"));
            return Err(e.into());
        }

        let result = {
            let _pending = PendingSubmission::engage(form);
            self.authority.create_reservation(&request).await
        };

        let outcome = match result {
            Ok(_) => {
                let message = self.confirmation_text(&request);
                tracing::info!(
                    date = %request.date,
                    time = %request.time,
                    party_size = request.party_size,
                    "Booking confirmed"
                );
                form.complete(message.clone());
                SubmitOutcome::Confirmed { message }
            }
            Err(e) if e.is_conflict() => {
                let message = e
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| CONFLICT_FALLBACK_MESSAGE.to_string());
                tracing::info!(date = %request.date, time = %request.time, "Slot full, disabling");
                form.mark_full(&request.time);
                form.set_error(message.clone());
                SubmitOutcome::Conflict {
                    time: request.time,
                    message,
                }
            }
            Err(e) if e.is_transient() || matches!(e, RemoteError::Decode(_)) => {
                tracing::warn!(error = %e, date = %request.date, "Booking not confirmed remotely");
                form.set_error(SAVED_LOCALLY_MESSAGE);
                SubmitOutcome::Unconfirmed {
                    message: SAVED_LOCALLY_MESSAGE.to_string(),
                    error: e,
                }
            }
            Err(e) => {
                let message = e
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| CONFLICT_FALLBACK_MESSAGE.to_string());
                tracing::warn!(error = %e, date = %request.date, "Booking declined by server");
                form.set_error(message.clone());
                SubmitOutcome::Declined { message, error: e }
            }
        };

        Ok(outcome)
    }

    /// Guest-facing confirmation for an accepted request
    pub fn confirmation_text(&self, request: &BookingRequest) -> String {
        let span = i64::from(self.settings.step_minutes) * i64::from(request.duration_slots);
        let start = time::to_label(&request.time);
        let end = time::to_label(&time::add_minutes(&request.time, span));

        format!(
            "Thank you for reserving a table at {} for {} {} on {} from {} to {}. \
             Your booking is confirmed. See you soon.",
            self.settings.venue_name,
            request.party_size,
            party_noun(request.party_size),
            request.date,
            start,
            end
        )
    }
}

/// Check the form in fixed order: closed day, time, name, email, phone
fn validate(form: &BookingForm) -> std::result::Result<(BookingRequest, String), ValidationError> {
    if form.is_closed() {
        return Err(ValidationError::DayClosed(
            form.closed_reason().unwrap_or_default(),
        ));
    }
    let label = form
        .selected_label()
        .map(str::to_string)
        .ok_or(ValidationError::TimeMissing)?;
    let name = non_empty_trimmed(&form.contact.name).ok_or(ValidationError::NameMissing)?;
    let email = non_empty_trimmed(&form.contact.email).ok_or(ValidationError::EmailMissing)?;
    let phone = non_empty_trimmed(&form.contact.phone).ok_or(ValidationError::PhoneMissing)?;

    let query = form.query();
    let request = BookingRequest {
        name,
        email,
        phone,
        party_size: query.party_size,
        date: query.date,
        time: form.selected_value().unwrap_or_else(|| label.clone()),
        duration_slots: query.duration_slots,
    };
    Ok((request, label))
}
