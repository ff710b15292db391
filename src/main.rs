use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tablebook::commands::{self, AppContext, BookParams, ListParams};

#[derive(Parser)]
#[command(
    name = "tablebook",
    version,
    about = "Restaurant table reservations with an offline-safe local ledger",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show bookable times for a date
    Slots {
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Party size
        #[arg(short, long, default_value = "2")]
        party: u32,

        /// Duration in slots
        #[arg(long, default_value = "1")]
        duration: u32,
    },

    /// Book a table
    Book {
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Party size
        #[arg(short, long, default_value = "2")]
        party: u32,

        /// Duration in slots
        #[arg(long, default_value = "1")]
        duration: u32,

        /// Start time, as "18:30" or "6:30 p.m."
        #[arg(short, long)]
        time: String,

        /// Guest name
        #[arg(long)]
        name: String,

        /// Guest email
        #[arg(long)]
        email: String,

        /// Guest phone
        #[arg(long)]
        phone: String,
    },

    /// Log in as administrator
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Drop the stored admin session
    Logout,

    /// List reservations
    List {
        /// Date to list (defaults to today)
        #[arg(short, long, conflicts_with = "all")]
        date: Option<NaiveDate>,

        /// List every date
        #[arg(long, default_value = "false")]
        all: bool,
    },

    /// Cancel a reservation by row id
    Cancel {
        /// Row id as shown by `list`
        id: String,

        /// Date listed after cancelling
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppContext::read_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&format, &config.logging.level, cli.verbose)?;

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Slots {
            date,
            party,
            duration,
        } => {
            tracing::info!(%date, party, duration, "Resolving availability");
            commands::slots(&ctx, date, party, duration).await?;
        }

        Commands::Book {
            date,
            party,
            duration,
            time,
            name,
            email,
            phone,
        } => {
            tracing::info!(%date, party, duration, time = %time, "Starting booking");
            commands::book(
                &ctx,
                BookParams {
                    date,
                    party_size: party,
                    duration_slots: duration,
                    time,
                    name,
                    email,
                    phone,
                },
            )
            .await?;
        }

        Commands::Login { username, password } => {
            commands::login(&ctx, &username, &password).await?;
        }

        Commands::Logout => {
            commands::logout(&ctx)?;
        }

        Commands::List { date, all } => {
            commands::list(&ctx, ListParams { date, all }).await?;
        }

        Commands::Cancel { id, date } => {
            tracing::info!(id = %id, "Cancelling reservation");
            commands::cancel(&ctx, &id, ListParams { date, all: false }).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tablebook=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("tablebook={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
