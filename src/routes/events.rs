use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::event::{ActionResponse, EventQuery, EventRequest, ImportBundleRequest, ImportSummary},
    error::AppError,
    routes::session::Session,
    schedule::model::Event,
    services::{event_service, session_service},
    state::SharedState,
};

/// Event CRUD and schedule import. Writes require an admin session.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/events", get(list_events).post(create_event))
        .route(
            "/api/events/{id}",
            get(get_event).put(upsert_event).delete(delete_event),
        )
        .route("/api/admin/events/{id}/import", post(import_bundle))
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "events",
    responses((status = 200, description = "Known events without their schedules", body = [Event]))
)]
/// List every event without schedules.
pub async fn list_events(
    State(state): State<SharedState>,
    Session(ctx): Session,
) -> Result<Json<Vec<Event>>, AppError> {
    session_service::current_user(&state, &ctx)?;
    Ok(Json(event_service::list_events(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = Uuid, Path, description = "Event identifier"), EventQuery),
    responses(
        (status = 200, description = "The event", body = Event),
        (status = 404, description = "Unknown event")
    )
)]
/// Fetch an event, with its general schedule when `withSchedule=true`.
pub async fn get_event(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Event>, AppError> {
    session_service::require_event_access(&state, &ctx, id)?;
    Ok(Json(
        event_service::get_event(&state, id, query.with_schedule).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/events",
    tag = "events",
    request_body = EventRequest,
    responses(
        (status = 200, description = "Created event", body = Event),
        (status = 400, description = "Invalid event"),
        (status = 403, description = "Admin session required")
    )
)]
/// Create an event under a fresh identifier.
pub async fn create_event(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Json(payload): Json<EventRequest>,
) -> Result<Json<Event>, AppError> {
    session_service::require_admin(&state, &ctx)?;
    payload.validate()?;
    Ok(Json(event_service::create_event(&state, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = Uuid, Path, description = "Event identifier")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Stored event", body = Event),
        (status = 403, description = "Admin session required")
    )
)]
/// Create or replace the event stored under `id`.
pub async fn upsert_event(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventRequest>,
) -> Result<Json<Event>, AppError> {
    session_service::require_admin(&state, &ctx)?;
    payload.validate()?;
    Ok(Json(event_service::upsert_event(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event and its data deleted", body = ActionResponse),
        (status = 404, description = "Unknown event")
    )
)]
/// Delete an event with its data and close its room.
pub async fn delete_event(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    session_service::require_admin(&state, &ctx)?;
    event_service::delete_event(&state, id).await?;
    Ok(Json(ActionResponse {
        message: format!("event {id} deleted"),
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/events/{id}/import",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Event identifier")),
    request_body = ImportBundleRequest,
    responses(
        (status = 200, description = "Bundle stored", body = ImportSummary),
        (status = 400, description = "Invalid bundle or dangling reference"),
        (status = 404, description = "Unknown event")
    )
)]
/// Import the pre-computed teams, tables and matches of an event.
pub async fn import_bundle(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<ImportBundleRequest>,
) -> Result<Json<ImportSummary>, AppError> {
    session_service::require_admin(&state, &ctx)?;
    payload.validate()?;
    Ok(Json(event_service::import_bundle(&state, id, payload).await?))
}
