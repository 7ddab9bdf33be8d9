//! Shared application state: storage handle, event rooms and degraded flag.

mod rooms;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::event_store::EventStore, error::ServiceError};

pub use self::rooms::{RoomHub, RoomMessage};

/// Handle to the application state passed to every route.
pub type SharedState = Arc<AppState>;

/// Central application state storing the event rooms and the database handle.
pub struct AppState {
    event_store: RwLock<Option<Arc<dyn EventStore>>>,
    rooms: RoomHub,
    config: Arc<AppConfig>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            event_store: RwLock::new(None),
            rooms: RoomHub::new(config.room_capacity()),
            config: Arc::new(config),
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current event store, if one is installed.
    pub async fn event_store(&self) -> Option<Arc<dyn EventStore>> {
        let guard = self.event_store.read().await;
        guard.as_ref().cloned()
    }

    /// Same as [`AppState::event_store`] but reports degraded mode as an error.
    pub async fn require_event_store(&self) -> Result<Arc<dyn EventStore>, ServiceError> {
        self.event_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new event store implementation and leave degraded mode.
    pub async fn install_event_store(&self, store: Arc<dyn EventStore>) {
        {
            let mut guard = self.event_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current event store and enter degraded mode.
    pub async fn clear_event_store(&self) {
        {
            let mut guard = self.event_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.event_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast channels of every event.
    pub fn rooms(&self) -> &RoomHub {
        &self.rooms
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::event_store::memory::MemoryEventStore;

    #[tokio::test]
    async fn installing_store_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        let mut watcher = state.degraded_watcher();
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_event_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .install_event_store(Arc::new(MemoryEventStore::new()))
            .await;

        assert!(!state.is_degraded().await);
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());

        state.clear_event_store().await;
        assert!(state.is_degraded().await);
        assert!(*watcher.borrow_and_update());
    }
}
