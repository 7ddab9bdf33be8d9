use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the event store is usable, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_event_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "event store health check failed");
            }
        }
        Err(_) => warn!("event store unavailable (degraded mode)"),
    }

    let open_rooms = state.rooms().room_count();
    if state.is_degraded().await {
        HealthResponse::degraded(open_rooms)
    } else {
        HealthResponse::ok(open_rooms)
    }
}
