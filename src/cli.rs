//! CLI argument parsing for the fieldops-scheduler binary.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "fieldops-scheduler", about = "Technician slot search and route sequencing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the NATS worker (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Print grid slot suggestions for a service
    FindSlots {
        #[arg(long)]
        service: Uuid,
        #[arg(long)]
        property: Option<Uuid>,
        /// First local date of the search horizon (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
    },
    /// Print gap suggestions around a location on one day
    GapSlots {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Service duration in minutes
        #[arg(long, default_value_t = 60)]
        duration: i64,
    },
    /// Re-order and re-time one technician's day
    OptimizeRoute {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        technician: Uuid,
    },
}
