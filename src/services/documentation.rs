use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::session::me,
        crate::routes::events::list_events,
        crate::routes::events::get_event,
        crate::routes::events::create_event,
        crate::routes::events::upsert_event,
        crate::routes::events::delete_event,
        crate::routes::events::import_bundle,
        crate::routes::teams::list_teams,
        crate::routes::teams::list_tables,
        crate::routes::teams::list_matches,
        crate::routes::teams::register_team,
        crate::routes::reports::field_schedule,
        crate::routes::reports::field_schedule_ws,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::event::EventRequest,
            crate::dto::event::ScheduleSlotInput,
            crate::dto::event::ImportBundleRequest,
            crate::dto::event::TeamInput,
            crate::dto::event::TableInput,
            crate::dto::event::MatchInput,
            crate::dto::event::ImportSummary,
            crate::dto::event::ActionResponse,
            crate::dto::schedule::FieldScheduleView,
            crate::dto::ws::LiveViewInbound,
            crate::dto::ws::LiveViewOutbound,
            crate::schedule::model::Event,
            crate::schedule::model::ScheduleSlot,
            crate::schedule::model::Team,
            crate::schedule::model::Table,
            crate::schedule::model::Match,
            crate::schedule::model::User,
            crate::schedule::model::Role,
            crate::schedule::model::RoundType,
            crate::schedule::view::RoundSchedule,
            crate::schedule::reconciler::ConnectionStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Viewer identity"),
        (name = "events", description = "Events and their teams, tables and matches"),
        (name = "admin", description = "Administrative imports"),
        (name = "reports", description = "Field schedule page and its live WebSocket"),
    )
)]
/// Entry point for generating the OpenAPI document.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_live_view_endpoint() {
        let doc = ApiDoc::openapi();
        assert!(
            doc.paths
                .paths
                .contains_key("/event/{id}/reports/field-schedule/ws")
        );
        assert!(doc.paths.paths.contains_key("/api/me"));
    }
}
