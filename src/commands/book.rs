//! Guest commands: list slots and book a table

use anyhow::Result;
use chrono::NaiveDate;

use super::AppContext;
use crate::booking::{BookingForm, SubmitOutcome};

/// Parameters for the `book` command
#[derive(Debug, Clone)]
pub struct BookParams {
    pub date: NaiveDate,
    pub party_size: u32,
    pub duration_slots: u32,
    /// Either a wire time (`18:30`) or a label (`6:30 p.m.`)
    pub time: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

async fn resolved_form(
    ctx: &AppContext,
    date: NaiveDate,
    party_size: u32,
    duration_slots: u32,
) -> Result<BookingForm> {
    let resolver = ctx.resolver()?;
    let mut form = BookingForm::new(date, ctx.config.booking.max_party_size);
    form.set_party_size(party_size)?;
    form.set_duration_slots(duration_slots)?;
    resolver.refresh(&mut form).await;
    Ok(form)
}

/// Print the offerable slots for a query
pub async fn slots(
    ctx: &AppContext,
    date: NaiveDate,
    party_size: u32,
    duration_slots: u32,
) -> Result<()> {
    let form = resolved_form(ctx, date, party_size, duration_slots).await?;

    if let Some(reason) = form.closed_reason() {
        println!("{reason}");
        return Ok(());
    }

    println!("Available times on {date} for {party_size}:");
    for slot in form.slots() {
        println!("  {:>10}  ({})", slot.label(), slot.value());
    }
    Ok(())
}

/// Book a table
pub async fn book(ctx: &AppContext, params: BookParams) -> Result<()> {
    let mut form =
        resolved_form(ctx, params.date, params.party_size, params.duration_slots).await?;

    let label = form
        .slots()
        .iter()
        .find(|s| s.value() == params.time || s.label() == params.time)
        .map(|s| s.label().to_string());
    if let Some(label) = label {
        if !form.select(&label) {
            tracing::warn!(%label, "Slot not selectable");
        }
    } else {
        tracing::debug!(time = %params.time, "Requested time not among offered slots");
    }

    form.contact.name = params.name;
    form.contact.email = params.email;
    form.contact.phone = params.phone;

    match ctx.submitter().submit(&mut form).await? {
        SubmitOutcome::Confirmed { message } => {
            println!("{message}");
            if let Some(ticket) = form.acknowledge_confirmation() {
                let availability = ctx.resolver()?.resolve(ticket.query()).await;
                form.apply_resolution(&ticket, availability);
                println!("{} time(s) still open that day.", form.slots().len());
            }
        }
        SubmitOutcome::Rejected(e) => anyhow::bail!("{e}"),
        SubmitOutcome::Conflict { time, message } => {
            println!("{message}");
            let open: Vec<_> = form
                .slots()
                .iter()
                .filter(|s| form.is_selectable(s) && s.value() != time)
                .map(|s| s.label())
                .collect();
            if !open.is_empty() {
                println!("Still open: {}", open.join(", "));
            }
        }
        SubmitOutcome::Unconfirmed { message, .. } => println!("{message}"),
        SubmitOutcome::Declined { message, .. } => anyhow::bail!("{message}"),
        SubmitOutcome::Ignored => {}
    }

    Ok(())
}
