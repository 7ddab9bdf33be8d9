use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Event CRUD and imports.
pub mod events;
/// Health check.
pub mod health;
/// Field schedule page and live socket.
pub mod reports;
/// Session extraction and `/api/me`.
pub mod session;
/// Teams, tables, matches and check-in.
pub mod teams;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(session::router())
        .merge(events::router())
        .merge(teams::router())
        .merge(reports::router())
        .merge(docs::router());

    api_router.with_state(state)
}
