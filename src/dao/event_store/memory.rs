//! In-process [`EventStore`] used by tests and by `STORE_BACKEND=memory` deployments.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    event_store::{EventChild, EventStore},
    models::{EventEntity, MatchEntity, TableEntity, TeamEntity},
    storage::StorageResult,
};

/// [`EventStore`] keeping everything in concurrent maps; contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryEventStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    events: DashMap<Uuid, EventEntity>,
    teams: DashMap<Uuid, TeamEntity>,
    tables: DashMap<Uuid, TableEntity>,
    matches: DashMap<Uuid, MatchEntity>,
}

impl MemoryEventStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_teams(&self, event_id: Uuid) -> Vec<TeamEntity> {
        let mut teams: Vec<TeamEntity> = self
            .inner
            .teams
            .iter()
            .filter(|entry| entry.event_id == event_id)
            .map(|entry| entry.value().clone())
            .collect();
        teams.sort_by_key(|team| team.number);
        teams
    }

    fn collect_tables(&self, event_id: Uuid) -> Vec<TableEntity> {
        let mut tables: Vec<TableEntity> = self
            .inner
            .tables
            .iter()
            .filter(|entry| entry.event_id == event_id)
            .map(|entry| entry.value().clone())
            .collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    }

    fn collect_matches(&self, event_id: Uuid) -> Vec<MatchEntity> {
        let mut matches: Vec<MatchEntity> = self
            .inner
            .matches
            .iter()
            .filter(|entry| entry.event_id == event_id)
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by_key(|m| m.number);
        matches
    }

    fn owner_of(&self, kind: EventChild, id: &Uuid) -> Option<Uuid> {
        match kind {
            EventChild::Team => self.inner.teams.get(id).map(|entry| entry.event_id),
            EventChild::Table => self.inner.tables.get(id).map(|entry| entry.event_id),
            EventChild::Match => self.inner.matches.get(id).map(|entry| entry.event_id),
        }
    }

    fn remove_event(&self, id: Uuid) -> bool {
        let existed = self.inner.events.remove(&id).is_some();
        self.inner.teams.retain(|_, team| team.event_id != id);
        self.inner.tables.retain(|_, table| table.event_id != id);
        self.inner.matches.retain(|_, m| m.event_id != id);
        existed
    }
}

impl EventStore for MemoryEventStore {
    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
        let event = self.inner.events.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(event) })
    }

    fn list_events(&self) -> BoxFuture<'static, StorageResult<Vec<EventEntity>>> {
        let mut events: Vec<EventEntity> = self
            .inner
            .events
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        events.sort_by_key(|event| event.start_date);
        Box::pin(async move { Ok(events) })
    }

    fn save_event(&self, event: EventEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.events.insert(event.id, event);
        Box::pin(async { Ok(()) })
    }

    fn insert_events(&self, events: Vec<EventEntity>) -> BoxFuture<'static, StorageResult<()>> {
        for event in events {
            self.inner.events.insert(event.id, event);
        }
        Box::pin(async { Ok(()) })
    }

    fn delete_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let existed = self.remove_event(id);
        Box::pin(async move { Ok(existed) })
    }

    fn list_teams(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let teams = self.collect_teams(event_id);
        Box::pin(async move { Ok(teams) })
    }

    fn find_team(
        &self,
        event_id: Uuid,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let team = self
            .inner
            .teams
            .get(&team_id)
            .filter(|entry| entry.event_id == event_id)
            .map(|entry| entry.value().clone());
        Box::pin(async move { Ok(team) })
    }

    fn foreign_ids(
        &self,
        kind: EventChild,
        event_id: Uuid,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<Uuid>>> {
        let foreign = ids
            .into_iter()
            .filter(|id| self.owner_of(kind, id).is_some_and(|owner| owner != event_id))
            .collect();
        Box::pin(async move { Ok(foreign) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.teams.insert(team.id, team);
        Box::pin(async { Ok(()) })
    }

    fn list_tables(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TableEntity>>> {
        let tables = self.collect_tables(event_id);
        Box::pin(async move { Ok(tables) })
    }

    fn save_tables(&self, tables: Vec<TableEntity>) -> BoxFuture<'static, StorageResult<()>> {
        for table in tables {
            self.inner.tables.insert(table.id, table);
        }
        Box::pin(async { Ok(()) })
    }

    fn list_matches(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let matches = self.collect_matches(event_id);
        Box::pin(async move { Ok(matches) })
    }

    fn save_matches(&self, matches: Vec<MatchEntity>) -> BoxFuture<'static, StorageResult<()>> {
        for m in matches {
            self.inner.matches.insert(m.id, m);
        }
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::dao::models::RoundType;

    fn team(event_id: Uuid, number: u32) -> TeamEntity {
        TeamEntity {
            id: Uuid::new_v4(),
            event_id,
            number,
            name: format!("Team {number}"),
            affiliation_name: "School".into(),
            affiliation_city: "Haifa".into(),
            registered: false,
        }
    }

    fn event() -> EventEntity {
        EventEntity {
            id: Uuid::new_v4(),
            name: "Regional".into(),
            start_date: SystemTime::UNIX_EPOCH,
            end_date: SystemTime::UNIX_EPOCH + Duration::from_secs(3600),
            schedule: None,
        }
    }

    #[tokio::test]
    async fn teams_are_listed_by_number_and_scoped_to_event() {
        let store = MemoryEventStore::new();
        let event_id = Uuid::new_v4();
        store.save_team(team(event_id, 30)).await.unwrap();
        store.save_team(team(event_id, 10)).await.unwrap();
        store.save_team(team(Uuid::new_v4(), 20)).await.unwrap();

        let numbers: Vec<u32> = store
            .list_teams(event_id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.number)
            .collect();
        assert_eq!(numbers, vec![10, 30]);
    }

    #[tokio::test]
    async fn find_team_ignores_other_events() {
        let store = MemoryEventStore::new();
        let stored = team(Uuid::new_v4(), 1);
        store.save_team(stored.clone()).await.unwrap();

        assert!(
            store
                .find_team(Uuid::new_v4(), stored.id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            store.find_team(stored.event_id, stored.id).await.unwrap(),
            Some(stored)
        );
    }

    #[tokio::test]
    async fn delete_event_cascades() {
        let store = MemoryEventStore::new();
        let event = event();
        let team = team(event.id, 1);
        let table = TableEntity {
            id: Uuid::new_v4(),
            event_id: event.id,
            name: "Red".into(),
        };
        let m = MatchEntity {
            id: Uuid::new_v4(),
            event_id: event.id,
            round_type: RoundType::Practice,
            round: 1,
            number: 1,
            table_id: table.id,
            team_id: Some(team.id),
            scheduled_time: SystemTime::UNIX_EPOCH,
        };
        store.save_event(event.clone()).await.unwrap();
        store.save_team(team).await.unwrap();
        store.save_tables(vec![table]).await.unwrap();
        store.save_matches(vec![m]).await.unwrap();

        assert!(store.delete_event(event.id).await.unwrap());
        assert!(!store.delete_event(event.id).await.unwrap());
        assert!(store.list_teams(event.id).await.unwrap().is_empty());
        assert!(store.list_tables(event.id).await.unwrap().is_empty());
        assert!(store.list_matches(event.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_ids_reports_records_of_other_events() {
        let store = MemoryEventStore::new();
        let target = Uuid::new_v4();
        let own = team(target, 1);
        let other = team(Uuid::new_v4(), 2);
        store.save_team(own.clone()).await.unwrap();
        store.save_team(other.clone()).await.unwrap();
        let unknown = Uuid::new_v4();

        let foreign = store
            .foreign_ids(EventChild::Team, target, vec![own.id, other.id, unknown])
            .await
            .unwrap();

        assert_eq!(foreign, vec![other.id]);
        assert!(
            store
                .foreign_ids(EventChild::Table, target, vec![other.id])
                .await
                .unwrap()
                .is_empty()
        );
    }
}
