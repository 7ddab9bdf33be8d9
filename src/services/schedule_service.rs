//! Opening the field schedule page for a viewer.

use tracing::info;
use uuid::Uuid;

use crate::{
    schedule::{
        loader::{LoadOutcome, SessionContext, load_page},
        page::FieldSchedulePage,
        role_gate::{GateDecision, RoleGate},
    },
    state::SharedState,
};

/// Either a ready page or where the viewer must be sent instead.
#[derive(Debug)]
pub enum PageOutcome {
    /// Page loaded and admitted.
    Ready(Box<FieldSchedulePage>),
    /// Path the viewer must navigate to.
    Redirect(String),
}

/// Load the snapshot and apply the role gate. Load failures send the viewer
/// to the login page, a refused role back to the event reports.
pub async fn open_page(
    state: &SharedState,
    ctx: &SessionContext,
    event_id: Uuid,
    show_general_schedule: bool,
) -> PageOutcome {
    let store = state.event_store().await;
    let config = state.config();

    let outcome = load_page(
        store.as_deref(),
        config.sessions(),
        ctx,
        event_id,
        config.login_path(),
    )
    .await;

    match outcome {
        LoadOutcome::Redirect { destination } => PageOutcome::Redirect(destination),
        LoadOutcome::Loaded(props) => match RoleGate::any_role().authorize(&props.user) {
            GateDecision::Allow => PageOutcome::Ready(Box::new(FieldSchedulePage::new(
                *props,
                show_general_schedule,
            ))),
            GateDecision::NavigateBack => {
                info!(event_id = %event_id, username = %props.user.username, "viewer refused by role gate");
                PageOutcome::Redirect(FieldSchedulePage::back_path(event_id))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        schedule::{loader::tests as fixtures, reconciler::ConnectionStatus},
        state::AppState,
    };

    async fn seeded_state(session: &str) -> (SharedState, Uuid) {
        let (store, _, event_id) = fixtures::seeded().await;
        let raw = format!(r#"{{"sessions": [{session}]}}"#).replace("EVENT", &event_id.to_string());
        let state = AppState::new(AppConfig::from_json(&raw).unwrap());
        state.install_event_store(Arc::new(store)).await;
        (state, event_id)
    }

    #[tokio::test]
    async fn degraded_state_redirects_to_login() {
        let state = AppState::new(AppConfig::default());
        let ctx = SessionContext::new(Some("any".into()));

        let outcome = open_page(&state, &ctx, Uuid::new_v4(), true).await;

        assert!(matches!(outcome, PageOutcome::Redirect(dest) if dest == "/login"));
    }

    #[tokio::test]
    async fn referee_gets_connecting_page() {
        let (state, event_id) = seeded_state(
            r#"{"token": "ref", "username": "ref", "event": "EVENT", "role": "referee"}"#,
        )
        .await;
        let ctx = SessionContext::new(Some("ref".into()));

        let PageOutcome::Ready(page) = open_page(&state, &ctx, event_id, false).await else {
            panic!("expected a ready page");
        };

        let view = page.view();
        assert_eq!(view.connection_status, ConnectionStatus::Connecting);
        assert!(!view.show_general_schedule);
        assert_eq!(view.rounds.len(), 2);
    }

    #[tokio::test]
    async fn viewer_without_role_is_sent_back() {
        let (state, event_id) =
            seeded_state(r#"{"token": "guest", "username": "guest", "event": "EVENT"}"#).await;
        let ctx = SessionContext::new(Some("guest".into()));

        let outcome = open_page(&state, &ctx, event_id, true).await;

        let expected = format!("/event/{event_id}/reports");
        assert!(matches!(outcome, PageOutcome::Redirect(dest) if dest == expected));
    }
}
