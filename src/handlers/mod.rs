//! NATS message handlers

pub mod ping;
pub mod route;
pub mod slots;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::select;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::SchedulingError;
use crate::services::engine::SchedulingEngine;
use crate::types::{ErrorResponse, Request, SuccessResponse};

pub const SUBJECT_PING: &str = "scheduler.ping";
pub const SUBJECT_FIND_SLOTS: &str = "scheduler.slots.find";
pub const SUBJECT_GAP_SLOTS: &str = "scheduler.slots.gaps";
pub const SUBJECT_OPTIMIZE_ROUTE: &str = "scheduler.route.optimize";

/// Decode a request envelope, run `operation` on its payload and encode the
/// reply envelope. Failures are always answered, never dropped.
pub(crate) async fn respond<Req, Resp, F, Fut>(payload: &[u8], operation: F) -> Result<Vec<u8>>
where
    Req: DeserializeOwned,
    Resp: Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = Result<Resp, SchedulingError>>,
{
    let request: Request<Req> = match serde_json::from_slice(payload) {
        Ok(req) => req,
        Err(e) => {
            warn!("Failed to parse request: {}", e);
            let response = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
            return Ok(serde_json::to_vec(&response)?);
        }
    };

    let bytes = match operation(request.payload).await {
        Ok(result) => serde_json::to_vec(&SuccessResponse::new(request.id, result))?,
        Err(e) => serde_json::to_vec(&ErrorResponse::new(request.id, e.code(), e.to_string()))?,
    };
    Ok(bytes)
}

/// Start all message handlers
pub async fn start_handlers(client: Client, engine: Arc<SchedulingEngine>, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let find_sub = client.subscribe(SUBJECT_FIND_SLOTS).await?;
    let gaps_sub = client.subscribe(SUBJECT_GAP_SLOTS).await?;
    let optimize_sub = client.subscribe(SUBJECT_OPTIMIZE_ROUTE).await?;

    let timeout = config.store_timeout;

    let client_ping = client.clone();
    let ping_handle = tokio::spawn(async move { ping::handle_ping(client_ping, ping_sub).await });

    let client_find = client.clone();
    let engine_find = Arc::clone(&engine);
    let find_handle =
        tokio::spawn(async move { slots::handle_find(client_find, find_sub, engine_find, timeout).await });

    let client_gaps = client.clone();
    let engine_gaps = Arc::clone(&engine);
    let gaps_handle =
        tokio::spawn(async move { slots::handle_gaps(client_gaps, gaps_sub, engine_gaps, timeout).await });

    let client_optimize = client.clone();
    let engine_optimize = Arc::clone(&engine);
    let optimize_handle = tokio::spawn(async move {
        route::handle_optimize(client_optimize, optimize_sub, engine_optimize, timeout).await
    });

    info!(
        "Listening on {}, {}, {}, {}",
        SUBJECT_PING, SUBJECT_FIND_SLOTS, SUBJECT_GAP_SLOTS, SUBJECT_OPTIMIZE_ROUTE
    );

    // Any handler exiting means its subscription is gone
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = find_handle => {
            error!("Slot search handler finished: {:?}", result);
        }
        result = gaps_handle => {
            error!("Gap search handler finished: {:?}", result);
        }
        result = optimize_handle => {
            error!("Route optimize handler finished: {:?}", result);
        }
    }

    Ok(())
}
