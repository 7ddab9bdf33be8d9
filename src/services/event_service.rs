//! Business logic behind the event CRUD and schedule import routes.

use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        event_store::{EventChild, EventStore},
        models::{EventEntity, MatchEntity, TableEntity, TeamEntity},
    },
    dto::event::{EventRequest, ImportBundleRequest, ImportSummary},
    error::ServiceError,
    schedule::model::Event,
    state::SharedState,
};

/// Every event, schedules left out.
pub async fn list_events(state: &SharedState) -> Result<Vec<Event>, ServiceError> {
    let store = state.require_event_store().await?;
    let events = store.list_events().await?;
    Ok(events
        .into_iter()
        .map(|event| Event::from(event).without_schedule())
        .collect())
}

/// Fetch one event; the general schedule is only included when asked for.
pub async fn get_event(
    state: &SharedState,
    id: Uuid,
    with_schedule: bool,
) -> Result<Event, ServiceError> {
    let store = state.require_event_store().await?;
    let Some(event) = store.find_event(id).await? else {
        return Err(ServiceError::NotFound(format!("event `{id}` not found")));
    };

    let event = Event::from(event);
    Ok(if with_schedule {
        event
    } else {
        event.without_schedule()
    })
}

/// Store a new event under a fresh identifier.
pub async fn create_event(
    state: &SharedState,
    request: EventRequest,
) -> Result<Event, ServiceError> {
    let store = state.require_event_store().await?;
    let event = request.into_event(Uuid::new_v4());
    store.insert_events(vec![event.clone().into()]).await?;
    info!(event_id = %event.id, name = %event.name, "event created");
    Ok(event)
}

/// Create or replace the event stored under `id`.
pub async fn upsert_event(
    state: &SharedState,
    id: Uuid,
    request: EventRequest,
) -> Result<Event, ServiceError> {
    let store = state.require_event_store().await?;
    let event = request.into_event(id);
    store.save_event(EventEntity::from(event.clone())).await?;
    info!(event_id = %id, "event saved");
    Ok(event)
}

/// Delete an event with all its data and disconnect its live viewers.
pub async fn delete_event(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_event_store().await?;
    if !store.delete_event(id).await? {
        return Err(ServiceError::NotFound(format!("event `{id}` not found")));
    }
    state.rooms().close_room(id);
    info!(event_id = %id, "event deleted");
    Ok(())
}

/// Store a pre-computed bundle of teams, tables and matches for an existing event.
///
/// Entities sharing an identifier with stored ones of the same event replace
/// them; identifiers owned by another event reject the whole bundle.
pub async fn import_bundle(
    state: &SharedState,
    event_id: Uuid,
    bundle: ImportBundleRequest,
) -> Result<ImportSummary, ServiceError> {
    check_bundle_references(&bundle)?;

    let store = state.require_event_store().await?;
    if store.find_event(event_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("event `{event_id}` not found")));
    }

    let teams: Vec<TeamEntity> = bundle
        .teams
        .into_iter()
        .map(|team| team.into_team(event_id).into())
        .collect();
    let tables: Vec<TableEntity> = bundle
        .tables
        .into_iter()
        .map(|table| table.into_table(event_id).into())
        .collect();
    let matches: Vec<MatchEntity> = bundle
        .matches
        .into_iter()
        .map(|m| m.into_match(event_id).into())
        .collect();

    check_ownership(store.as_ref(), event_id, &teams, &tables, &matches).await?;

    let summary = ImportSummary {
        teams: teams.len(),
        tables: tables.len(),
        matches: matches.len(),
    };

    store.save_tables(tables).await?;
    for team in teams {
        store.save_team(team).await?;
    }
    store.save_matches(matches).await?;

    info!(
        event_id = %event_id,
        teams = summary.teams,
        tables = summary.tables,
        matches = summary.matches,
        "schedule imported"
    );
    Ok(summary)
}

/// Refuse identifiers already stored under another event, which an upsert
/// would otherwise move away from it.
async fn check_ownership(
    store: &dyn EventStore,
    event_id: Uuid,
    teams: &[TeamEntity],
    tables: &[TableEntity],
    matches: &[MatchEntity],
) -> Result<(), ServiceError> {
    let (teams, tables, matches) = futures::try_join!(
        store.foreign_ids(
            EventChild::Team,
            event_id,
            teams.iter().map(|t| t.id).collect()
        ),
        store.foreign_ids(
            EventChild::Table,
            event_id,
            tables.iter().map(|t| t.id).collect()
        ),
        store.foreign_ids(
            EventChild::Match,
            event_id,
            matches.iter().map(|m| m.id).collect()
        ),
    )?;

    for (kind, ids) in [("team", teams), ("table", tables), ("match", matches)] {
        if let Some(id) = ids.first() {
            return Err(ServiceError::InvalidInput(format!(
                "{kind} `{id}` belongs to another event"
            )));
        }
    }
    Ok(())
}

/// Matches may only reference teams and tables shipped in the same bundle,
/// and team numbers must be unique.
fn check_bundle_references(bundle: &ImportBundleRequest) -> Result<(), ServiceError> {
    let mut numbers = HashSet::new();
    for team in &bundle.teams {
        if !numbers.insert(team.number) {
            return Err(ServiceError::InvalidInput(format!(
                "duplicate team number {}",
                team.number
            )));
        }
    }

    let teams: HashSet<Uuid> = bundle.teams.iter().map(|t| t.id).collect();
    let tables: HashSet<Uuid> = bundle.tables.iter().map(|t| t.id).collect();

    for m in &bundle.matches {
        if !tables.contains(&m.table_id) {
            return Err(ServiceError::InvalidInput(format!(
                "match {} references unknown table `{}`",
                m.number, m.table_id
            )));
        }
        if let Some(team_id) = m.team_id
            && !teams.contains(&team_id)
        {
            return Err(ServiceError::InvalidInput(format!(
                "match {} references unknown team `{team_id}`",
                m.number
            )));
        }
    }
    Ok(())
}
