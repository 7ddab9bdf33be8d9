//! Read access to an event's teams, tables and matches, plus pit-admin check-in.

use tracing::info;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    schedule::model::{Match, Table, Team},
    services::room_events,
    state::SharedState,
};

/// Teams of an event ordered by number.
pub async fn list_teams(state: &SharedState, event_id: Uuid) -> Result<Vec<Team>, ServiceError> {
    let store = state.require_event_store().await?;
    let teams = store.list_teams(event_id).await?;
    Ok(teams.into_iter().map(Into::into).collect())
}

/// Tables of an event.
pub async fn list_tables(state: &SharedState, event_id: Uuid) -> Result<Vec<Table>, ServiceError> {
    let store = state.require_event_store().await?;
    let tables = store.list_tables(event_id).await?;
    Ok(tables.into_iter().map(Into::into).collect())
}

/// Matches of an event ordered by number.
pub async fn list_matches(
    state: &SharedState,
    event_id: Uuid,
) -> Result<Vec<Match>, ServiceError> {
    let store = state.require_event_store().await?;
    let matches = store.list_matches(event_id).await?;
    Ok(matches.into_iter().map(Into::into).collect())
}

/// Mark a team as checked in and notify the event room.
///
/// Registering an already registered team stores and broadcasts it again.
pub async fn register_team(
    state: &SharedState,
    event_id: Uuid,
    team_id: Uuid,
) -> Result<Team, ServiceError> {
    let store = state.require_event_store().await?;
    let Some(mut entity) = store.find_team(event_id, team_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "team `{team_id}` not found in event `{event_id}`"
        )));
    };

    entity.registered = true;
    store.save_team(entity.clone()).await?;

    let team = Team::from(entity);
    info!(event_id = %event_id, team_id = %team_id, number = team.number, "team registered");
    room_events::broadcast_team_registered(state, &team);
    Ok(team)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            event_store::{EventStore, memory::MemoryEventStore},
            models::TeamEntity,
        },
        state::AppState,
    };

    #[tokio::test]
    async fn registering_persists_and_broadcasts() {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(MemoryEventStore::new());
        state.install_event_store(store.clone()).await;
        let event_id = Uuid::new_v4();
        let team_id = Uuid::new_v4();
        store
            .save_team(TeamEntity {
                id: team_id,
                event_id,
                number: 12,
                name: "Sprockets".into(),
                affiliation_name: "School".into(),
                affiliation_city: "Akko".into(),
                registered: false,
            })
            .await
            .unwrap();
        let mut room = state.rooms().subscribe(event_id);

        let team = register_team(&state, event_id, team_id).await.unwrap();

        assert!(team.registered);
        assert!(store.find_team(event_id, team_id).await.unwrap().unwrap().registered);
        let message = room.recv().await.unwrap();
        assert_eq!(serde_json::from_str::<Team>(&message.data).unwrap(), team);
    }

    #[tokio::test]
    async fn registering_unknown_team_is_not_found() {
        let state = AppState::new(AppConfig::default());
        state
            .install_event_store(Arc::new(MemoryEventStore::new()))
            .await;

        let result = register_team(&state, Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
