use axum::{
    Json, Router,
    extract::{Path, Query, State, WebSocketUpgrade},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::schedule::{FieldScheduleQuery, FieldScheduleView},
    routes::session::Session,
    services::{
        schedule_service::{self, PageOutcome},
        websocket_service,
    },
    state::SharedState,
};

/// Configure the field schedule page and its WebSocket.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/event/{id}/reports/field-schedule", get(field_schedule))
        .route(
            "/event/{id}/reports/field-schedule/ws",
            get(field_schedule_ws),
        )
}

#[utoipa::path(
    get,
    path = "/event/{id}/reports/field-schedule",
    tag = "reports",
    params(("id" = Uuid, Path, description = "Event identifier"), FieldScheduleQuery),
    responses(
        (status = 200, description = "Field schedule grouped by round", body = FieldScheduleView),
        (status = 303, description = "Load failed (login) or role refused (event reports)")
    )
)]
/// Render the field schedule of the viewer's event.
pub async fn field_schedule(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
    Query(query): Query<FieldScheduleQuery>,
) -> Response {
    match schedule_service::open_page(&state, &ctx, id, query.show_general_schedule).await {
        PageOutcome::Ready(page) => Json(page.view()).into_response(),
        PageOutcome::Redirect(destination) => Redirect::to(&destination).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/event/{id}/reports/field-schedule/ws",
    tag = "reports",
    params(("id" = Uuid, Path, description = "Event identifier"), FieldScheduleQuery),
    responses((status = 101, description = "Switching protocols to the live field schedule"))
)]
/// Upgrade into a live field schedule session following team registrations.
pub async fn field_schedule_ws(
    State(state): State<SharedState>,
    Session(ctx): Session,
    Path(id): Path<Uuid>,
    Query(query): Query<FieldScheduleQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        websocket_service::handle_live_view(state, socket, ctx, id, query.show_general_schedule)
    })
}
