//! Admin commands: login, listing and cancellation

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use super::AppContext;
use crate::admin::{RowScope, RowSet};
use crate::error::{Error, TablebookErrorTrait};

/// Parameters for the `list` command
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    pub date: Option<NaiveDate>,
    pub all: bool,
}

impl ListParams {
    fn scope(self) -> RowScope {
        match (self.all, self.date) {
            (true, _) => RowScope::All,
            (false, Some(date)) => RowScope::Date(date),
            (false, None) => RowScope::Date(chrono::Local::now().date_naive()),
        }
    }
}

/// Log in and store the session token
pub async fn login(ctx: &AppContext, username: &str, password: &str) -> Result<()> {
    ctx.authenticator()
        .login(username, password)
        .await
        .map_err(user_facing)?;
    println!("Login successful");
    Ok(())
}

/// Drop the stored session token
pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.authenticator().logout()?;
    println!("Logged out");
    Ok(())
}

/// Print reservation rows
pub async fn list(ctx: &AppContext, params: ListParams) -> Result<()> {
    let rows = ctx
        .reconciliation()
        .rows(params.scope())
        .await
        .map_err(user_facing)?;
    print_rows(&rows);
    Ok(())
}

/// Cancel one reservation and print the refreshed rows
pub async fn cancel(ctx: &AppContext, id: &str, params: ListParams) -> Result<()> {
    let rows = ctx
        .reconciliation()
        .cancel(id, params.scope())
        .await
        .map_err(user_facing)?;
    println!("Cancelled {id}");
    print_rows(&rows);
    Ok(())
}

fn user_facing(err: Error) -> anyhow::Error {
    if err.requires_reauthentication() {
        tracing::warn!("Session expired, run `tablebook login` again");
    }
    anyhow::anyhow!(err.user_message())
}

fn print_rows(set: &RowSet) {
    if let Some(advisory) = &set.advisory {
        println!("! {advisory}");
    }
    if set.rows.is_empty() {
        println!("No reservations");
        return;
    }

    let now = Utc::now();
    println!(
        "{:<28} {:<20} {:<24} {:<14} {:>6} {:<10} {:<10} {:<16}",
        "ID", "Name", "Email", "Phone", "People", "Date", "Time", "Created"
    );
    for row in &set.rows {
        let date = row.date.map(|d| d.to_string()).unwrap_or_default();
        let created = row.created_or(now).format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<28} {:<20} {:<24} {:<14} {:>6} {:<10} {:<10} {:<16}",
            row.id, row.name, row.email, row.phone, row.party_size, date, row.time, created
        );
    }
}
