//! FieldOps Scheduler - technician slot search and daily route sequencing
//!
//! Serves scheduling requests over NATS, or runs a single search from the
//! command line.

mod cli;
mod config;
mod db;
mod defaults;
mod error;
mod handlers;
mod services;
mod types;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::services::civil_time::CivilCalendar;
use crate::services::engine::{CallOptions, SchedulingEngine};
use crate::services::geocoding::{create_geocoder, Geocoder};
use crate::services::reservation::LocalReservations;
use crate::services::store::PgAvailabilityStore;
use crate::types::{FindGapSlotsRequest, FindSlotsRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs directory - use LOGS_DIR env var or default to ./logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "scheduler.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,fieldops_scheduler=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer()) // stdout
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false)) // file
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded (timezone {})", config.policy.timezone);

    let pool = db::create_pool(&config.database_url).await?;
    info!("Connected to PostgreSQL");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(pool, &config).await,
        Command::Migrate => db::run_migrations(&pool).await,
        Command::FindSlots { service, property, from } => {
            let engine = build_engine(pool, &config)?;
            let request = FindSlotsRequest {
                service_id: service,
                property_id: property,
                search_start_date: from,
            };
            let result = engine.find_slots(&request, &call_options(&config)).await?;
            print_json(&result)
        }
        Command::GapSlots { date, lat, lng, duration } => {
            let engine = build_engine(pool, &config)?;
            let request = FindGapSlotsRequest {
                date,
                target_lat: lat,
                target_lng: lng,
                duration_minutes: duration,
            };
            let result = engine.find_gap_slots(&request, &call_options(&config)).await?;
            print_json(&result)
        }
        Command::OptimizeRoute { date, technician } => {
            let engine = build_engine(pool, &config)?;
            let result = engine.optimize_daily_route(date, technician, &call_options(&config)).await?;
            print_json(&result)
        }
    }
}

fn build_engine(pool: PgPool, config: &Config) -> Result<SchedulingEngine> {
    let geocoder: Arc<dyn Geocoder> = Arc::from(create_geocoder(config)?);
    info!("Geocoder initialized: {}", geocoder.name());

    let engine = SchedulingEngine::new(
        Arc::new(PgAvailabilityStore::new(pool)),
        geocoder,
        config.policy.clone(),
    )
    .with_reservations(Arc::new(LocalReservations::new()));
    info!("Business hours resolved in {}", engine.calendar.name());

    Ok(engine)
}

fn call_options(config: &Config) -> CallOptions {
    CallOptions::with_timeout(config.store_timeout)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting FieldOps Scheduler...");

    db::run_migrations(&pool).await?;

    let engine = Arc::new(build_engine(pool, config)?);

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    if let Err(e) = handlers::start_handlers(nats_client, engine, config).await {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}
