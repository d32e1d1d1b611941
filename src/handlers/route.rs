//! Route sequencing handler

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, warn};

use super::respond;
use crate::services::engine::{CallOptions, SchedulingEngine};
use crate::types::OptimizeRouteRequest;

pub(crate) async fn process_optimize(engine: &SchedulingEngine, payload: &[u8], timeout: Duration) -> Result<Vec<u8>> {
    respond(payload, |request: OptimizeRouteRequest| async move {
        engine
            .optimize_daily_route(request.date, request.technician_id, &CallOptions::with_timeout(timeout))
            .await
    })
    .await
}

/// Handle scheduler.route.optimize
pub async fn handle_optimize(
    client: Client,
    mut subscriber: Subscriber,
    engine: Arc<SchedulingEngine>,
    timeout: Duration,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received route.optimize message");

        let Some(reply) = msg.reply.clone() else {
            warn!("Message without reply subject");
            continue;
        };

        let response = process_optimize(&engine, &msg.payload, timeout).await?;
        let _ = client.publish(reply, response.into()).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::config::SchedulingPolicy;
    use crate::services::geocoding::MockGeocoder;
    use crate::services::store::memory::InMemoryStore;

    #[tokio::test]
    async fn empty_day_replies_success_without_stops() {
        let store = Arc::new(InMemoryStore::new());
        let engine = SchedulingEngine::new(store.clone(), Arc::new(MockGeocoder::new()), SchedulingPolicy::default());
        let payload = json!({
            "id": Uuid::new_v4(),
            "timestamp": "2026-03-02T12:00:00Z",
            "payload": { "date": "2026-03-10", "technicianId": Uuid::new_v4() }
        })
        .to_string();

        let bytes = process_optimize(&engine, payload.as_bytes(), Duration::from_secs(5)).await.unwrap();
        let reply: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(reply["payload"]["success"], true);
        assert_eq!(reply["payload"]["message"], "Not enough jobs to optimize");
        assert!(store.reschedules().is_empty());
    }
}
