//! Per-event broadcast rooms carrying live updates.

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Message published to an event room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomMessage {
    /// Update category, e.g. `teamRegistered`.
    pub category: String,
    /// JSON encoded payload.
    pub data: String,
}

impl RoomMessage {
    /// Serialise `payload` into a message of the given category.
    pub fn json<T>(category: &str, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self {
            category: category.to_string(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Broadcast channels keyed by event identifier.
///
/// Rooms are created on first subscription and released once their last
/// subscriber is gone; publishing to a room nobody listens to drops the message.
pub struct RoomHub {
    rooms: DashMap<Uuid, broadcast::Sender<RoomMessage>>,
    capacity: usize,
}

impl RoomHub {
    /// Empty hub whose rooms buffer up to `capacity` messages per subscriber.
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Join the room of `event_id`, creating it if needed.
    pub fn subscribe(&self, event_id: Uuid) -> broadcast::Receiver<RoomMessage> {
        self.rooms
            .entry(event_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send `message` to every subscriber of the room, returning how many received it.
    pub fn publish(&self, event_id: Uuid, message: RoomMessage) -> usize {
        let delivered = match self.rooms.get(&event_id) {
            Some(sender) => sender.send(message).ok(),
            None => return 0,
        };

        delivered.unwrap_or_else(|| {
            self.release(event_id);
            0
        })
    }

    /// Drop the room if nobody subscribes to it any more.
    pub fn release(&self, event_id: Uuid) -> bool {
        self.rooms
            .remove_if(&event_id, |_, sender| sender.receiver_count() == 0)
            .is_some()
    }

    /// Number of rooms with a live channel.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Drop the room so its subscribers observe the channel closing.
    pub fn close_room(&self, event_id: Uuid) -> bool {
        self.rooms.remove(&event_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::RecvError;

    use super::*;

    #[tokio::test]
    async fn published_messages_reach_room_subscribers_only() {
        let hub = RoomHub::new(8);
        let room = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut rx = hub.subscribe(room);
        let mut other_rx = hub.subscribe(other);

        let message = RoomMessage::json("teamRegistered", &serde_json::json!({"id": 1})).unwrap();
        assert_eq!(hub.publish(room, message.clone()), 1);

        assert_eq!(rx.recv().await.unwrap(), message);
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_room_is_dropped() {
        let hub = RoomHub::new(8);
        let message = RoomMessage {
            category: "teamRegistered".into(),
            data: "{}".into(),
        };
        assert_eq!(hub.publish(Uuid::new_v4(), message), 0);
    }

    #[tokio::test]
    async fn closing_room_disconnects_subscribers() {
        let hub = RoomHub::new(8);
        let room = Uuid::new_v4();
        let mut rx = hub.subscribe(room);

        assert!(hub.close_room(room));

        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
    }

    #[test]
    fn rooms_are_released_with_their_last_subscriber() {
        let hub = RoomHub::new(8);
        let room = Uuid::new_v4();
        let first = hub.subscribe(room);
        let second = hub.subscribe(room);

        drop(first);
        assert!(!hub.release(room));
        assert_eq!(hub.room_count(), 1);

        drop(second);
        assert!(hub.release(room));
        assert_eq!(hub.room_count(), 0);
    }

    #[test]
    fn publishing_to_abandoned_room_releases_it() {
        let hub = RoomHub::new(8);
        let room = Uuid::new_v4();
        drop(hub.subscribe(room));
        let message = RoomMessage {
            category: "teamRegistered".into(),
            data: "{}".into(),
        };

        assert_eq!(hub.publish(room, message), 0);
        assert_eq!(hub.room_count(), 0);
    }
}
