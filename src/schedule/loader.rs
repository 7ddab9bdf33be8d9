//! One-shot snapshot of everything the field schedule page needs.

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::model::{Event, Match, Table, Team, User};
use crate::{
    config::SessionDirectory,
    dao::{event_store::EventStore, storage::StorageError},
};

/// Explicit request context handed to the loader instead of ambient globals.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Bearer token presented by the viewer, if any.
    pub token: Option<String>,
}

impl SessionContext {
    /// Context carrying `token`, or an anonymous one.
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

/// Consistent snapshot of the viewer's event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProps {
    /// Resolved viewer.
    pub user: User,
    /// Event including its published schedule.
    pub event: Event,
    /// Teams ordered by number.
    pub teams: Vec<Team>,
    /// Tables ordered by name.
    pub tables: Vec<Table>,
    /// Matches ordered by number.
    pub matches: Vec<Match>,
}

/// Why a snapshot could not be produced.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No token, or a token nobody owns.
    #[error("no session presented or session unknown")]
    Unauthenticated,
    #[error("viewer belongs to event {viewer_event}, not {requested}")]
    /// The page was requested for an event the viewer does not work at.
    EventMismatch {
        /// Event named in the route.
        requested: Uuid,
        /// Event of the viewer.
        viewer_event: Uuid,
    },
    /// The viewer's event does not exist.
    #[error("event {0} not found")]
    EventNotFound(Uuid),
    /// No store is installed.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// A read failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A match points at a team or table outside the snapshot.
    #[error("match {match_id} references missing {entity} {reference}")]
    DanglingReference {
        /// Offending match.
        match_id: Uuid,
        /// `team` or `table`.
        entity: &'static str,
        /// Missing identifier.
        reference: Uuid,
    },
}

/// Result of a page load: either the props or where to send the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Snapshot ready to render.
    Loaded(Box<PageProps>),
    /// Load failed; send the viewer to `destination`.
    Redirect {
        /// Path to navigate to.
        destination: String,
    },
}

/// Resolve the viewer and read its event, teams, tables and matches in parallel.
pub async fn load_snapshot(
    store: &dyn EventStore,
    sessions: &SessionDirectory,
    ctx: &SessionContext,
) -> Result<PageProps, LoadError> {
    let user = ctx
        .token
        .as_deref()
        .and_then(|token| sessions.resolve(token))
        .cloned()
        .ok_or(LoadError::Unauthenticated)?;
    let event_id = user.event;

    let (event, teams, tables, matches) = futures::try_join!(
        store.find_event(event_id),
        store.list_teams(event_id),
        store.list_tables(event_id),
        store.list_matches(event_id),
    )?;

    let event: Event = event.ok_or(LoadError::EventNotFound(event_id))?.into();
    let props = PageProps {
        user,
        event,
        teams: teams.into_iter().map(Into::into).collect(),
        tables: tables.into_iter().map(Into::into).collect(),
        matches: matches.into_iter().map(Into::into).collect(),
    };
    check_references(&props)?;

    Ok(props)
}

/// Load the page for `requested_event`. Every failure turns into a redirect
/// to `login_path`, never into partial data.
pub async fn load_page(
    store: Option<&dyn EventStore>,
    sessions: &SessionDirectory,
    ctx: &SessionContext,
    requested_event: Uuid,
    login_path: &str,
) -> LoadOutcome {
    let result = match store {
        Some(store) => load_snapshot(store, sessions, ctx)
            .await
            .and_then(|props| {
                if props.event.id == requested_event {
                    Ok(props)
                } else {
                    Err(LoadError::EventMismatch {
                        requested: requested_event,
                        viewer_event: props.event.id,
                    })
                }
            }),
        None => Err(LoadError::Degraded),
    };

    match result {
        Ok(props) => LoadOutcome::Loaded(Box::new(props)),
        Err(err) => {
            warn!(event_id = %requested_event, error = %err, "field schedule load failed; redirecting");
            LoadOutcome::Redirect {
                destination: login_path.to_string(),
            }
        }
    }
}

/// Every match must point at a table and (when assigned) a team of the snapshot.
fn check_references(props: &PageProps) -> Result<(), LoadError> {
    let tables: HashSet<Uuid> = props.tables.iter().map(|t| t.id).collect();
    let teams: HashSet<Uuid> = props.teams.iter().map(|t| t.id).collect();

    for m in &props.matches {
        if !tables.contains(&m.table_id) {
            return Err(LoadError::DanglingReference {
                match_id: m.id,
                entity: "table",
                reference: m.table_id,
            });
        }
        if let Some(team_id) = m.team_id
            && !teams.contains(&team_id)
        {
            return Err(LoadError::DanglingReference {
                match_id: m.id,
                entity: "team",
                reference: team_id,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashMap,
        time::{Duration, SystemTime},
    };

    use super::*;
    use crate::dao::{
        event_store::memory::MemoryEventStore,
        models::{EventEntity, MatchEntity, RoundType, ScheduleSlotEntity, TableEntity, TeamEntity},
    };
    use crate::schedule::model::Role;

    pub(crate) const TOKEN: &str = "referee-token";

    /// Event with two teams, one table and three matches, plus a referee session.
    pub(crate) async fn seeded() -> (MemoryEventStore, SessionDirectory, Uuid) {
        let store = MemoryEventStore::new();
        let event_id = Uuid::new_v4();
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        store
            .save_event(EventEntity {
                id: event_id,
                name: "Regional".into(),
                start_date: start,
                end_date: start + Duration::from_secs(36_000),
                schedule: Some(vec![ScheduleSlotEntity {
                    name: "Opening".into(),
                    start_time: start,
                    end_time: start + Duration::from_secs(1_800),
                    roles: vec![Role::Referee],
                }]),
            })
            .await
            .unwrap();

        let teams: Vec<TeamEntity> = (1..=2)
            .map(|n| TeamEntity {
                id: Uuid::from_u128(n),
                event_id,
                number: n as u32,
                name: format!("Team {n}"),
                affiliation_name: "School".into(),
                affiliation_city: "Haifa".into(),
                registered: false,
            })
            .collect();
        for team in teams {
            store.save_team(team).await.unwrap();
        }

        let table = TableEntity {
            id: Uuid::from_u128(100),
            event_id,
            name: "Red".into(),
        };
        store.save_tables(vec![table]).await.unwrap();

        let matches = [(1, RoundType::Practice, 1), (2, RoundType::Ranking, 1), (3, RoundType::Practice, 1)]
            .into_iter()
            .map(|(number, round_type, round)| MatchEntity {
                id: Uuid::from_u128(200 + number as u128),
                event_id,
                round_type,
                round,
                number,
                table_id: Uuid::from_u128(100),
                team_id: Some(Uuid::from_u128(1 + (number as u128 % 2))),
                scheduled_time: start + Duration::from_secs(number as u64 * 600),
            })
            .collect();
        store.save_matches(matches).await.unwrap();

        let sessions = SessionDirectory::new(HashMap::from([(
            TOKEN.to_string(),
            User {
                username: "ref".into(),
                event: event_id,
                role: Some(Role::Referee),
                is_admin: false,
            },
        )]));

        (store, sessions, event_id)
    }

    fn ctx(token: &str) -> SessionContext {
        SessionContext::new(Some(token.to_string()))
    }

    #[tokio::test]
    async fn loads_complete_snapshot() {
        let (store, sessions, event_id) = seeded().await;

        let props = load_snapshot(&store, &sessions, &ctx(TOKEN)).await.unwrap();

        assert_eq!(props.event.id, event_id);
        assert!(props.event.schedule.is_some());
        assert_eq!(props.teams.len(), 2);
        assert_eq!(props.tables.len(), 1);
        let numbers: Vec<u32> = props.matches.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn unknown_or_missing_session_redirects() {
        let (store, sessions, event_id) = seeded().await;

        for context in [ctx("nope"), SessionContext::default()] {
            let outcome = load_page(Some(&store), &sessions, &context, event_id, "/login").await;
            assert_eq!(
                outcome,
                LoadOutcome::Redirect {
                    destination: "/login".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn missing_event_is_a_load_failure() {
        let (store, sessions, event_id) = seeded().await;
        store.delete_event(event_id).await.unwrap();

        let err = load_snapshot(&store, &sessions, &ctx(TOKEN)).await.unwrap_err();

        assert!(matches!(err, LoadError::EventNotFound(id) if id == event_id));
    }

    #[tokio::test]
    async fn dangling_table_reference_is_a_load_failure() {
        let (store, sessions, event_id) = seeded().await;
        let mut matches = store.list_matches(event_id).await.unwrap();
        matches[0].table_id = Uuid::from_u128(999);
        store.save_matches(matches).await.unwrap();

        let err = load_snapshot(&store, &sessions, &ctx(TOKEN)).await.unwrap_err();

        assert!(matches!(
            err,
            LoadError::DanglingReference { entity: "table", .. }
        ));
    }

    #[tokio::test]
    async fn other_event_and_degraded_store_redirect() {
        let (store, sessions, _) = seeded().await;

        let mismatch =
            load_page(Some(&store), &sessions, &ctx(TOKEN), Uuid::new_v4(), "/login").await;
        let degraded = load_page(None, &sessions, &ctx(TOKEN), Uuid::new_v4(), "/login").await;

        assert!(matches!(mismatch, LoadOutcome::Redirect { .. }));
        assert!(matches!(degraded, LoadOutcome::Redirect { .. }));
    }
}
