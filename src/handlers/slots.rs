//! Slot search handlers

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, warn};

use super::respond;
use crate::services::engine::{CallOptions, SchedulingEngine};
use crate::types::{FindGapSlotsRequest, FindSlotsRequest};

pub(crate) async fn process_find(engine: &SchedulingEngine, payload: &[u8], timeout: Duration) -> Result<Vec<u8>> {
    respond(payload, |request: FindSlotsRequest| async move {
        engine.find_slots(&request, &CallOptions::with_timeout(timeout)).await
    })
    .await
}

pub(crate) async fn process_gaps(engine: &SchedulingEngine, payload: &[u8], timeout: Duration) -> Result<Vec<u8>> {
    respond(payload, |request: FindGapSlotsRequest| async move {
        engine.find_gap_slots(&request, &CallOptions::with_timeout(timeout)).await
    })
    .await
}

/// Handle scheduler.slots.find
pub async fn handle_find(
    client: Client,
    mut subscriber: Subscriber,
    engine: Arc<SchedulingEngine>,
    timeout: Duration,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received slots.find message");

        let Some(reply) = msg.reply.clone() else {
            warn!("Message without reply subject");
            continue;
        };

        let response = process_find(&engine, &msg.payload, timeout).await?;
        let _ = client.publish(reply, response.into()).await;
    }

    Ok(())
}

/// Handle scheduler.slots.gaps
pub async fn handle_gaps(
    client: Client,
    mut subscriber: Subscriber,
    engine: Arc<SchedulingEngine>,
    timeout: Duration,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received slots.gaps message");

        let Some(reply) = msg.reply.clone() else {
            warn!("Message without reply subject");
            continue;
        };

        let response = process_gaps(&engine, &msg.payload, timeout).await?;
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
    use crate::services::testing::technician;

    fn engine(store: Arc<InMemoryStore>) -> SchedulingEngine {
        SchedulingEngine::new(store, Arc::new(MockGeocoder::new()), SchedulingPolicy::default())
    }

    fn envelope(payload: Value) -> Vec<u8> {
        json!({ "id": Uuid::new_v4(), "timestamp": "2026-03-02T12:00:00Z", "payload": payload })
            .to_string()
            .into_bytes()
    }

    #[tokio::test]
    async fn find_with_unknown_service_replies_not_found() {
        let engine = engine(Arc::new(InMemoryStore::new()));
        let payload = envelope(json!({ "serviceId": Uuid::new_v4(), "searchStartDate": "2099-03-02" }));

        let reply: Value =
            serde_json::from_slice(&process_find(&engine, &payload, Duration::from_secs(5)).await.unwrap()).unwrap();

        assert_eq!(reply["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn gaps_reply_carries_polarity_and_slots() {
        let store = Arc::new(InMemoryStore::new());
        store.add_technician(technician("Alice"));
        let engine = engine(store);
        let payload = envelope(json!({
            "date": "2099-03-02",
            "targetLat": 45.5017,
            "targetLng": -73.5673,
            "durationMinutes": 60
        }));

        let reply: Value =
            serde_json::from_slice(&process_gaps(&engine, &payload, Duration::from_secs(5)).await.unwrap()).unwrap();

        assert_eq!(reply["payload"]["polarity"], "lower_is_better");
        let slots = reply["payload"]["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0]["time"], "08:00");
        assert_eq!(slots[0]["reason"], "Open day");
    }
}
