//! MongoDB implementation of [`EventStore`].

use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database,
    bson::{Document, doc},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::{MongoSession, open_session},
    error::{MongoDaoError, MongoResult},
    models::{
        EVENT_COLLECTION_NAME, MATCH_COLLECTION_NAME, MongoEventDocument, MongoMatchDocument,
        MongoTableDocument, MongoTeamDocument, TABLE_COLLECTION_NAME, TEAM_COLLECTION_NAME,
        by_event, doc_id,
    },
};
use crate::dao::{
    event_store::{EventChild, EventStore},
    models::{EventEntity, MatchEntity, TableEntity, TeamEntity},
    storage::StorageResult,
};

/// MongoDB-backed [`EventStore`] implementation.
#[derive(Clone)]
pub struct MongoEventStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    session: RwLock<MongoSession>,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.session.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let session = open_session(&self.config).await?;
        *self.session.write().await = session;
        Ok(())
    }
}

fn child_collection(kind: EventChild) -> &'static str {
    match kind {
        EventChild::Team => TEAM_COLLECTION_NAME,
        EventChild::Table => TABLE_COLLECTION_NAME,
        EventChild::Match => MATCH_COLLECTION_NAME,
    }
}

impl MongoEventStore {
    /// Connect to MongoDB; the session setup also creates the `event_id` indexes.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let session = open_session(&config).await?;
        Ok(Self {
            inner: Arc::new(MongoInner {
                session: RwLock::new(session),
                config,
            }),
        })
    }

    async fn database(&self) -> Database {
        let guard = self.inner.session.read().await;
        guard.database.clone()
    }

    async fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        let guard = self.inner.session.read().await;
        guard.database.collection::<T>(name)
    }

    /// Run `filter` against `name`, sorted by `sort`, and collect every document.
    async fn find_all<T>(
        &self,
        name: &'static str,
        filter: Document,
        sort: Document,
    ) -> MongoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync + Unpin,
    {
        let collection = self.collection::<T>(name).await;
        collection
            .find(filter)
            .sort(sort)
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })
    }

    /// Upsert each document under its `_id`.
    async fn replace_all<T>(
        &self,
        name: &'static str,
        documents: Vec<(Uuid, T)>,
    ) -> MongoResult<()>
    where
        T: Serialize + Send + Sync,
    {
        let collection = self.collection::<T>(name).await;
        for (id, document) in documents {
            collection
                .replace_one(doc_id(id), &document)
                .upsert(true)
                .await
                .map_err(|source| MongoDaoError::Write {
                    collection: name,
                    source,
                })?;
        }
        Ok(())
    }

    async fn find_event(&self, id: Uuid) -> MongoResult<Option<EventEntity>> {
        let collection = self
            .collection::<MongoEventDocument>(EVENT_COLLECTION_NAME)
            .await;
        collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: EVENT_COLLECTION_NAME,
                source,
            })?
            .map(EventEntity::try_from)
            .transpose()
    }

    async fn list_events(&self) -> MongoResult<Vec<EventEntity>> {
        self.find_all::<MongoEventDocument>(
            EVENT_COLLECTION_NAME,
            doc! {},
            doc! {"start_date": 1},
        )
        .await?
        .into_iter()
        .map(EventEntity::try_from)
        .collect()
    }

    async fn save_events(&self, events: Vec<EventEntity>) -> MongoResult<()> {
        let documents = events
            .into_iter()
            .map(|event| (event.id, MongoEventDocument::from(event)))
            .collect();
        self.replace_all(EVENT_COLLECTION_NAME, documents).await
    }

    async fn delete_event(&self, id: Uuid) -> MongoResult<bool> {
        let database = self.database().await;
        for collection in [
            TEAM_COLLECTION_NAME,
            TABLE_COLLECTION_NAME,
            MATCH_COLLECTION_NAME,
        ] {
            database
                .collection::<Document>(collection)
                .delete_many(by_event(id))
                .await
                .map_err(|source| MongoDaoError::Write { collection, source })?;
        }

        let result = database
            .collection::<Document>(EVENT_COLLECTION_NAME)
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: EVENT_COLLECTION_NAME,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn list_teams(&self, event_id: Uuid) -> MongoResult<Vec<TeamEntity>> {
        self.find_all::<MongoTeamDocument>(
            TEAM_COLLECTION_NAME,
            by_event(event_id),
            doc! {"number": 1},
        )
        .await?
        .into_iter()
        .map(TeamEntity::try_from)
        .collect()
    }

    async fn find_team(&self, event_id: Uuid, team_id: Uuid) -> MongoResult<Option<TeamEntity>> {
        let collection = self
            .collection::<MongoTeamDocument>(TEAM_COLLECTION_NAME)
            .await;
        collection
            .find_one(doc! {"_id": team_id.to_string(), "event_id": event_id.to_string()})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: TEAM_COLLECTION_NAME,
                source,
            })?
            .map(TeamEntity::try_from)
            .transpose()
    }

    async fn foreign_ids(
        &self,
        kind: EventChild,
        event_id: Uuid,
        ids: Vec<Uuid>,
    ) -> MongoResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let name = child_collection(kind);
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        let filter = doc! {
            "_id": {"$in": ids},
            "event_id": {"$ne": event_id.to_string()},
        };
        let documents: Vec<Document> = self
            .collection::<Document>(name)
            .await
            .find(filter)
            .projection(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })?;

        documents
            .iter()
            .map(|document| {
                let raw = document.get_str("_id").unwrap_or_default();
                Uuid::parse_str(raw).map_err(|err| MongoDaoError::CorruptDocument {
                    collection: name,
                    id: raw.to_string(),
                    reason: err.to_string(),
                })
            })
            .collect()
    }

    async fn list_tables(&self, event_id: Uuid) -> MongoResult<Vec<TableEntity>> {
        self.find_all::<MongoTableDocument>(
            TABLE_COLLECTION_NAME,
            by_event(event_id),
            doc! {"name": 1},
        )
        .await?
        .into_iter()
        .map(TableEntity::try_from)
        .collect()
    }

    async fn list_matches(&self, event_id: Uuid) -> MongoResult<Vec<MatchEntity>> {
        self.find_all::<MongoMatchDocument>(
            MATCH_COLLECTION_NAME,
            by_event(event_id),
            doc! {"number": 1},
        )
        .await?
        .into_iter()
        .map(MatchEntity::try_from)
        .collect()
    }
}

impl EventStore for MongoEventStore {
    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_event(id).await.map_err(Into::into) })
    }

    fn list_events(&self) -> BoxFuture<'static, StorageResult<Vec<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_events().await.map_err(Into::into) })
    }

    fn save_event(&self, event: EventEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_events(vec![event]).await.map_err(Into::into) })
    }

    fn insert_events(&self, events: Vec<EventEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_events(events).await.map_err(Into::into) })
    }

    fn delete_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_event(id).await.map_err(Into::into) })
    }

    fn list_teams(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_teams(event_id).await.map_err(Into::into) })
    }

    fn find_team(
        &self,
        event_id: Uuid,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_team(event_id, team_id)
                .await
                .map_err(Into::into)
        })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_all(
                    TEAM_COLLECTION_NAME,
                    vec![(team.id, MongoTeamDocument::from(team))],
                )
                .await
                .map_err(Into::into)
        })
    }

    fn foreign_ids(
        &self,
        kind: EventChild,
        event_id: Uuid,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<Uuid>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .foreign_ids(kind, event_id, ids)
                .await
                .map_err(Into::into)
        })
    }

    fn list_tables(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TableEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_tables(event_id).await.map_err(Into::into) })
    }

    fn save_tables(&self, tables: Vec<TableEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let documents = tables
            .into_iter()
            .map(|table| (table.id, MongoTableDocument::from(table)))
            .collect();
        Box::pin(async move {
            store
                .replace_all(TABLE_COLLECTION_NAME, documents)
                .await
                .map_err(Into::into)
        })
    }

    fn list_matches(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_matches(event_id).await.map_err(Into::into) })
    }

    fn save_matches(&self, matches: Vec<MatchEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let documents = matches
            .into_iter()
            .map(|m| (m.id, MongoMatchDocument::from(m)))
            .collect();
        Box::pin(async move {
            store
                .replace_all(MATCH_COLLECTION_NAME, documents)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
