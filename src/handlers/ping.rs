//! Ping handler for health checks

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::ErrorResponse;

#[derive(Debug, Serialize, Deserialize)]
struct PingRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PongResponse {
    message: String,
    timestamp: String,
}

fn pong(payload: &[u8]) -> Result<Vec<u8>> {
    let bytes = match serde_json::from_slice::<PingRequest>(payload) {
        Ok(request) => serde_json::to_vec(&PongResponse {
            message: request.message.map(|m| format!("Pong: {}", m)).unwrap_or_else(|| "Pong".to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })?,
        Err(e) => serde_json::to_vec(&ErrorResponse::new(
            Uuid::nil(),
            "INVALID_REQUEST",
            format!("Failed to parse request: {}", e),
        ))?,
    };
    Ok(bytes)
}

pub async fn handle_ping(client: Client, mut subscriber: Subscriber) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        let Some(reply) = msg.reply.clone() else {
            warn!("Ping message without reply subject");
            continue;
        };

        client.publish(reply, pong(&msg.payload)?.into()).await?;
        debug!("Sent pong response");
    }

    Ok(())
}
