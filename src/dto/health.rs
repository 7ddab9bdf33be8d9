use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Event rooms currently open for live viewers.
    pub open_rooms: usize,
}

impl HealthResponse {
    /// The event store is installed and answering.
    pub fn ok(open_rooms: usize) -> Self {
        Self {
            status: "ok".to_string(),
            open_rooms,
        }
    }

    /// No event store is installed; live viewers keep their last data.
    pub fn degraded(open_rooms: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            open_rooms,
        }
    }
}
