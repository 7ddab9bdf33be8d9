/// In-process store.
pub mod memory;
/// MongoDB store.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{EventEntity, MatchEntity, TableEntity, TeamEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Kinds of record owned by an event besides the event document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventChild {
    /// A registered team.
    Team,
    /// A robot game table.
    Table,
    /// A robot game match.
    Match,
}

/// Abstraction over the persistence layer for events and their competition data.
pub trait EventStore: Send + Sync {
    /// Event stored under `id`, schedule included.
    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>>;
    /// Every event ordered by start date.
    fn list_events(&self) -> BoxFuture<'static, StorageResult<Vec<EventEntity>>>;
    /// Insert or replace an event.
    fn save_event(&self, event: EventEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert or replace several events.
    fn insert_events(&self, events: Vec<EventEntity>) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete an event with its teams, tables and matches. Returns whether the event existed.
    fn delete_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Teams of an event ordered by team number.
    fn list_teams(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// Team `team_id` if it belongs to `event_id`.
    fn find_team(
        &self,
        event_id: Uuid,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Ids among `ids` already stored as `kind` under an event other than `event_id`.
    fn foreign_ids(
        &self,
        kind: EventChild,
        event_id: Uuid,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<Uuid>>>;
    /// Insert or replace a team.
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Tables of an event ordered by name.
    fn list_tables(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TableEntity>>>;
    /// Insert or replace tables.
    fn save_tables(&self, tables: Vec<TableEntity>) -> BoxFuture<'static, StorageResult<()>>;
    /// Matches of an event ordered by match number.
    fn list_matches(&self, event_id: Uuid)
    -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    /// Insert or replace matches.
    fn save_matches(&self, matches: Vec<MatchEntity>) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
