//! Session setup for the MongoDB event store: client, readiness wait and indexes.

use std::time::Duration;

use mongodb::{
    Client, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tokio::time::sleep;
use tracing::{debug, info};

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{MATCH_COLLECTION_NAME, TABLE_COLLECTION_NAME, TEAM_COLLECTION_NAME},
};

/// Collections holding per-event documents, all looked up by `event_id`.
const EVENT_SCOPED_COLLECTIONS: [&str; 3] = [
    TEAM_COLLECTION_NAME,
    TABLE_COLLECTION_NAME,
    MATCH_COLLECTION_NAME,
];

/// Doubling delays between readiness pings, capped at five seconds.
struct PingBackoff {
    next: Duration,
    remaining: u32,
}

impl PingBackoff {
    const ATTEMPTS: u32 = 5;

    fn new() -> Self {
        Self {
            next: Duration::from_millis(250),
            remaining: Self::ATTEMPTS - 1,
        }
    }
}

impl Iterator for PingBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let delay = self.next;
        self.next = (self.next * 2).min(Duration::from_secs(5));
        Some(delay)
    }
}

/// Live handles of one connection to the configured database.
pub(super) struct MongoSession {
    // Kept alongside the database handle so the connection pool lives as long as the session.
    #[allow(dead_code)]
    pub client: Client,
    pub database: Database,
}

/// Connect to the configured database, wait until it answers and make sure
/// the `event_id` indexes exist. Used both at startup and on reconnect.
pub(super) async fn open_session(config: &MongoConfig) -> MongoResult<MongoSession> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    wait_until_ready(&database).await?;
    ensure_event_indexes(&database).await?;
    info!(database = %config.database_name, "MongoDB session ready");

    Ok(MongoSession { client, database })
}

async fn wait_until_ready(database: &Database) -> MongoResult<()> {
    let mut backoff = PingBackoff::new();
    let mut attempts = 0;

    loop {
        attempts += 1;
        let err = match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        let Some(delay) = backoff.next() else {
            return Err(MongoDaoError::InitialPing {
                attempts,
                source: err,
            });
        };
        debug!(attempts, error = %err, "MongoDB not ready; retrying");
        sleep(delay).await;
    }
}

async fn ensure_event_indexes(database: &Database) -> MongoResult<()> {
    for collection in EVENT_SCOPED_COLLECTIONS {
        let index = IndexModel::builder()
            .keys(doc! {"event_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some(format!("{collection}_event_idx")))
                    .build(),
            )
            .build();

        database
            .collection::<Document>(collection)
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection,
                index: "event_id",
                source,
            })?;
    }
    Ok(())
}
