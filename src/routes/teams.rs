use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    error::AppError,
    routes::session::Session,
    schedule::model::{Match, Role, Table, Team},
    services::{session_service, team_service},
    state::SharedState,
};

/// Roles allowed to check teams in.
const REGISTRATION_ROLES: &[Role] = &[Role::PitAdmin];

/// Configure the team, table and match routes.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/events/{id}/teams", get(list_teams))
        .route("/api/events/{id}/tables", get(list_tables))
        .route("/api/events/{id}/matches", get(list_matches))
        .route(
            "/api/events/{id}/teams/{team_id}/register",
            put(register_team),
        )
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/teams",
    tag = "events",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses((status = 200, description = "Teams ordered by number", body = [Team]))
)]
/// Teams of an event ordered by number.
pub async fn list_teams(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Team>>, AppError> {
    session_service::require_event_access(&state, &ctx, id)?;
    Ok(Json(team_service::list_teams(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/tables",
    tag = "events",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses((status = 200, description = "Robot game tables", body = [Table]))
)]
/// Tables of an event.
pub async fn list_tables(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Table>>, AppError> {
    session_service::require_event_access(&state, &ctx, id)?;
    Ok(Json(team_service::list_tables(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/matches",
    tag = "events",
    params(("id" = Uuid, Path, description = "Event identifier")),
    responses((status = 200, description = "Robot game matches ordered by number", body = [Match]))
)]
/// Matches of an event ordered by number.
pub async fn list_matches(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Match>>, AppError> {
    session_service::require_event_access(&state, &ctx, id)?;
    Ok(Json(team_service::list_matches(&state, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}/teams/{team_id}/register",
    tag = "events",
    params(
        ("id" = Uuid, Path, description = "Event identifier"),
        ("team_id" = Uuid, Path, description = "Team identifier")
    ),
    responses(
        (status = 200, description = "Registered team, also broadcast to the event room", body = Team),
        (status = 403, description = "Pit admin or admin session required"),
        (status = 404, description = "Unknown team")
    )
)]
/// Check a team in at the pit admin desk.
pub async fn register_team(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path((id, team_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Team>, AppError> {
    session_service::require_event_role(&state, &ctx, id, REGISTRATION_ROLES)?;
    Ok(Json(team_service::register_team(&state, id, team_id).await?))
}
