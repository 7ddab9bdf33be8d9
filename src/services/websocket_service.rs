//! Live field schedule sessions over WebSocket.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{LiveViewInbound, LiveViewOutbound},
    schedule::{loader::SessionContext, page::FieldSchedulePage, reconciler::ChannelEvent},
    services::schedule_service::{self, PageOutcome},
    state::{RoomMessage, SharedState},
};

type Outbound = mpsc::UnboundedSender<Message>;

/// The writer side of the socket is gone.
#[derive(Debug, Error)]
#[error("connection closed")]
struct ConnectionClosed;

/// Handle the full lifecycle of one live field schedule viewer.
///
/// The page state is owned by this task: room updates and client messages are
/// applied one at a time and each change is followed by a full view.
pub async fn handle_live_view(
    state: SharedState,
    socket: WebSocket,
    ctx: SessionContext,
    event_id: Uuid,
    show_general_schedule: bool,
) {
    let (mut sender, receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    if let Some((mut page, room)) =
        open_live_view(&state, &ctx, event_id, show_general_schedule, &outbound_tx).await
    {
        info!(event_id = %event_id, "live field schedule connected");
        run_live_view(&mut page, BroadcastStream::new(room), receiver, &outbound_tx).await;
        info!(event_id = %event_id, "live field schedule disconnected");
    }

    state.rooms().release(event_id);
    finalize(writer_task, outbound_tx).await;
}

/// Join the event room, then load the page.
///
/// The subscription comes first so registrations published while the snapshot
/// loads stay queued on the receiver; replaying one the snapshot already holds
/// is harmless. On failure the client gets a redirect followed by a close.
async fn open_live_view(
    state: &SharedState,
    ctx: &SessionContext,
    event_id: Uuid,
    show_general_schedule: bool,
    tx: &Outbound,
) -> Option<(Box<FieldSchedulePage>, broadcast::Receiver<RoomMessage>)> {
    let room = state.rooms().subscribe(event_id);

    match schedule_service::open_page(state, ctx, event_id, show_general_schedule).await {
        PageOutcome::Ready(page) => Some((page, room)),
        PageOutcome::Redirect(destination) => {
            drop(room);
            state.rooms().release(event_id);
            let _ = send_json(tx, &LiveViewOutbound::Redirect { destination });
            let _ = tx.send(Message::Close(None));
            None
        }
    }
}

/// Serve a loaded page until the client leaves.
///
/// `room` carries the event room traffic, `client` the inbound websocket frames.
async fn run_live_view<R, C>(
    page: &mut FieldSchedulePage,
    mut room: R,
    mut client: C,
    tx: &Outbound,
) where
    R: Stream<Item = Result<RoomMessage, BroadcastStreamRecvError>> + Unpin,
    C: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let event_id = page.event_id();

    page.on_channel_event(ChannelEvent::Subscribing);
    if send_view(tx, page).is_err() {
        return;
    }
    page.on_channel_event(ChannelEvent::Subscribed);
    if send_view(tx, page).is_err() {
        return;
    }

    let mut room_open = true;
    loop {
        let sent = tokio::select! {
            update = room.next(), if room_open => match update {
                Some(Ok(message)) => {
                    if page.handle_room_message(&message) {
                        send_view(tx, page)
                    } else {
                        Ok(())
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    warn!(event_id = %event_id, skipped, "live viewer lagged behind room updates");
                    Ok(())
                }
                None => {
                    info!(event_id = %event_id, "event room closed; keeping last data");
                    room_open = false;
                    page.on_channel_event(ChannelEvent::Closed);
                    send_view(tx, page)
                }
            },
            inbound = client.next() => match inbound {
                Some(Ok(Message::Text(text))) => handle_client_text(tx, page, text.as_str()),
                Some(Ok(Message::Ping(payload))) => {
                    tx.send(Message::Pong(payload)).map_err(|_| ConnectionClosed)
                }
                Some(Ok(Message::Close(frame))) => {
                    let _ = tx.send(Message::Close(frame));
                    break;
                }
                Some(Ok(Message::Binary(_) | Message::Pong(_))) => Ok(()),
                Some(Err(err)) => {
                    warn!(event_id = %event_id, error = %err, "websocket error");
                    break;
                }
                None => break,
            },
        };

        if sent.is_err() {
            break;
        }
    }
}

fn handle_client_text(
    tx: &Outbound,
    page: &mut FieldSchedulePage,
    text: &str,
) -> Result<(), ConnectionClosed> {
    match serde_json::from_str::<LiveViewInbound>(text) {
        Ok(LiveViewInbound::ShowGeneralSchedule { show }) => {
            if page.set_show_general_schedule(show) {
                send_view(tx, page)
            } else {
                Ok(())
            }
        }
        Ok(LiveViewInbound::Ping) => send_json(tx, &LiveViewOutbound::Pong),
        Ok(LiveViewInbound::Unknown) => {
            debug!(payload = %text, "ignoring unknown live view message");
            Ok(())
        }
        Err(err) => {
            warn!(error = %err, "failed to parse live view message");
            Ok(())
        }
    }
}

fn send_view(tx: &Outbound, page: &FieldSchedulePage) -> Result<(), ConnectionClosed> {
    send_json(tx, &LiveViewOutbound::View(page.view()))
}

/// Serialize a payload and push it onto the writer channel.
///
/// Serialization failures are logged and swallowed; only a closed writer is an error.
fn send_json<T>(tx: &Outbound, value: &T) -> Result<(), ConnectionClosed>
where
    T: ?Sized + serde::Serialize,
{
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize live view message");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| ConnectionClosed)
}

/// Drop the sender so the writer drains and stops, then wait for it.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: Outbound) {
    drop(outbound_tx);
    if let Err(err) = writer_task.await {
        warn!(error = %err, "websocket writer task failed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Weak};

    use axum::body::Bytes;
    use futures::{FutureExt, future::BoxFuture};
    use serde_json::{Value, json};
    use tokio_stream::wrappers::UnboundedReceiverStream;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            event_store::{EventChild, EventStore, memory::MemoryEventStore},
            models::{EventEntity, MatchEntity, TableEntity, TeamEntity},
            storage::StorageResult,
        },
        schedule::{
            loader::{load_snapshot, tests as fixtures},
            model::Team,
            reconciler::UpdateCategory,
        },
        services::room_events,
        state::AppState,
    };

    const SECOND_TEAM: u128 = 2;

    /// A running session fed by test channels.
    struct Session {
        room: broadcast::Sender<RoomMessage>,
        client: mpsc::UnboundedSender<Result<Message, axum::Error>>,
        outbound: mpsc::UnboundedReceiver<Message>,
        task: JoinHandle<()>,
    }

    impl Session {
        fn start(page: FieldSchedulePage, capacity: usize) -> Self {
            let (room, room_rx) = broadcast::channel(capacity);
            let mut session = Self::start_with(page, room_rx);
            session.room = room;
            session
        }

        fn start_with(
            mut page: FieldSchedulePage,
            room_rx: broadcast::Receiver<RoomMessage>,
        ) -> Self {
            let (client, client_rx) = mpsc::unbounded_channel();
            let (out_tx, outbound) = mpsc::unbounded_channel();
            let task = tokio::spawn(async move {
                run_live_view(
                    &mut page,
                    BroadcastStream::new(room_rx),
                    UnboundedReceiverStream::new(client_rx),
                    &out_tx,
                )
                .await;
            });
            Self {
                room: broadcast::channel(1).0,
                client,
                outbound,
                task,
            }
        }

        fn send_text(&self, text: &str) {
            self.client
                .send(Ok(Message::Text(text.to_owned().into())))
                .unwrap();
        }

        async fn next_json(&mut self) -> Value {
            match self.outbound.recv().await {
                Some(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
                other => panic!("expected a text frame, got {other:?}"),
            }
        }

        /// Consume the `connecting` and `connected` views every session opens with.
        async fn skip_opening_views(&mut self) -> Value {
            let connecting = self.next_json().await;
            assert_eq!(connecting["connection_status"], "connecting");
            let connected = self.next_json().await;
            assert_eq!(connected["type"], "view");
            assert_eq!(connected["connection_status"], "connected");
            assert_eq!(connected["back_disabled"], true);
            connected
        }
    }

    async fn seeded_page() -> (FieldSchedulePage, MemoryEventStore) {
        let (store, sessions, _) = fixtures::seeded().await;
        let ctx = SessionContext::new(Some(fixtures::TOKEN.to_string()));
        let props = load_snapshot(&store, &sessions, &ctx).await.unwrap();
        (FieldSchedulePage::new(props, true), store)
    }

    async fn registered(store: &MemoryEventStore, event_id: Uuid, number: u128) -> Team {
        let mut team = store
            .find_team(event_id, Uuid::from_u128(number))
            .await
            .unwrap()
            .unwrap();
        team.registered = true;
        team.into()
    }

    fn registration(team: &Team) -> RoomMessage {
        RoomMessage::json(UpdateCategory::TeamRegistered.name(), team).unwrap()
    }

    fn registered_flags(view: &Value) -> Vec<bool> {
        view["rounds"][0]["teams"]
            .as_array()
            .unwrap()
            .iter()
            .map(|team| team["registered"].as_bool().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn room_update_sends_fresh_view() {
        let (page, store) = seeded_page().await;
        let event_id = page.event_id();
        let mut session = Session::start(page, 8);
        let connected = session.skip_opening_views().await;
        assert_eq!(registered_flags(&connected), vec![false, false]);

        let team = registered(&store, event_id, SECOND_TEAM).await;
        session.room.send(registration(&team)).unwrap();

        let view = session.next_json().await;
        assert_eq!(view["type"], "view");
        assert_eq!(registered_flags(&view), vec![false, true]);

        drop(session.client);
        assert!(session.outbound.recv().await.is_none());
        session.task.await.unwrap();
    }

    #[tokio::test]
    async fn closed_room_flags_error_and_keeps_rounds() {
        let (page, _) = seeded_page().await;
        let mut session = Session::start(page, 8);
        let connected = session.skip_opening_views().await;

        // Replacing the only sender closes the room.
        session.room = broadcast::channel(1).0;

        let view = session.next_json().await;
        assert_eq!(view["connection_status"], "disconnected");
        assert_eq!(view["error"], true);
        assert_eq!(view["rounds"], connected["rounds"]);

        session.send_text(r#"{"type":"ping"}"#);
        assert_eq!(session.next_json().await, json!({"type": "pong"}));
    }

    #[tokio::test]
    async fn toggle_resends_view_only_on_change() {
        let (page, _) = seeded_page().await;
        let mut session = Session::start(page, 8);
        session.skip_opening_views().await;

        session.send_text(r#"{"type":"showGeneralSchedule","show":true}"#);
        session.send_text(r#"{"type":"ping"}"#);
        assert_eq!(session.next_json().await["type"], "pong");

        session.send_text(r#"{"type":"showGeneralSchedule","show":false}"#);
        let view = session.next_json().await;
        assert_eq!(view["show_general_schedule"], false);
        let rounds = view["rounds"].as_array().unwrap();
        assert!(!rounds.is_empty());
        assert!(rounds.iter().all(|r| r["event_schedule"] == json!([])));
    }

    #[tokio::test]
    async fn ping_frames_are_answered_and_close_ends_session() {
        let (page, _) = seeded_page().await;
        let mut session = Session::start(page, 8);
        session.skip_opening_views().await;

        session.send_text(r#"{"type":"subscribe"}"#);
        session
            .client
            .send(Ok(Message::Ping(Bytes::from_static(b"hb"))))
            .unwrap();
        assert!(
            matches!(session.outbound.recv().await, Some(Message::Pong(payload)) if payload == Bytes::from_static(b"hb"))
        );

        session.client.send(Ok(Message::Close(None))).unwrap();
        assert!(matches!(
            session.outbound.recv().await,
            Some(Message::Close(None))
        ));
        assert!(session.outbound.recv().await.is_none());
    }

    #[tokio::test]
    async fn lagged_room_keeps_serving_latest_update() {
        let (page, store) = seeded_page().await;
        let event_id = page.event_id();
        let first = registered(&store, event_id, 1).await;
        let second = registered(&store, event_id, SECOND_TEAM).await;

        let mut session = Session::start(page, 1);
        // Queued before the session runs; only the last one fits the buffer.
        session.room.send(registration(&first)).unwrap();
        session.room.send(registration(&second)).unwrap();

        session.skip_opening_views().await;
        let view = session.next_json().await;
        assert_eq!(registered_flags(&view), vec![false, true]);

        session.send_text(r#"{"type":"ping"}"#);
        assert_eq!(session.next_json().await["type"], "pong");
    }

    #[tokio::test]
    async fn failed_load_redirects_then_closes() {
        let state = AppState::new(AppConfig::default());
        let (tx, mut outbound) = mpsc::unbounded_channel();
        let ctx = SessionContext::new(Some("unknown".into()));
        let event_id = Uuid::new_v4();

        let opened = open_live_view(&state, &ctx, event_id, true, &tx).await;

        assert!(opened.is_none());
        let Some(Message::Text(text)) = outbound.recv().await else {
            panic!("expected a redirect message");
        };
        let redirect: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(redirect, json!({"type": "redirect", "destination": "/login"}));
        assert!(matches!(outbound.recv().await, Some(Message::Close(None))));
        assert_eq!(state.rooms().room_count(), 0);
    }

    /// Memory store that registers a team while the snapshot is being read,
    /// after the team list has already been taken.
    struct RegistersDuringLoad {
        inner: MemoryEventStore,
        state: Weak<AppState>,
        team: Uuid,
    }

    impl EventStore for RegistersDuringLoad {
        fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
            self.inner.find_event(id)
        }

        fn list_events(&self) -> BoxFuture<'static, StorageResult<Vec<EventEntity>>> {
            self.inner.list_events()
        }

        fn save_event(&self, event: EventEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_event(event)
        }

        fn insert_events(&self, events: Vec<EventEntity>) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.insert_events(events)
        }

        fn delete_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.delete_event(id)
        }

        fn list_teams(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
            self.inner.list_teams(event_id)
        }

        fn find_team(
            &self,
            event_id: Uuid,
            team_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
            self.inner.find_team(event_id, team_id)
        }

        fn foreign_ids(
            &self,
            kind: EventChild,
            event_id: Uuid,
            ids: Vec<Uuid>,
        ) -> BoxFuture<'static, StorageResult<Vec<Uuid>>> {
            self.inner.foreign_ids(kind, event_id, ids)
        }

        fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_team(team)
        }

        fn list_tables(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TableEntity>>> {
            self.inner.list_tables(event_id)
        }

        fn save_tables(&self, tables: Vec<TableEntity>) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_tables(tables)
        }

        fn list_matches(
            &self,
            event_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
            let matches = self.inner.list_matches(event_id);
            let team = self
                .inner
                .find_team(event_id, self.team)
                .now_or_never()
                .and_then(Result::ok)
                .flatten();
            if let (Some(mut team), Some(state)) = (team, self.state.upgrade()) {
                team.registered = true;
                let _ = self.inner.save_team(team.clone());
                room_events::broadcast_team_registered(&state, &team.into());
            }
            matches
        }

        fn save_matches(&self, matches: Vec<MatchEntity>) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_matches(matches)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    #[tokio::test]
    async fn registration_during_load_reaches_the_session() {
        let (inner, _, event_id) = fixtures::seeded().await;
        let raw = format!(
            r#"{{"sessions": [{{"token": "ref", "username": "ref", "event": "{event_id}", "role": "referee"}}]}}"#
        );
        let state = AppState::new(AppConfig::from_json(&raw).unwrap());
        state
            .install_event_store(Arc::new(RegistersDuringLoad {
                inner,
                state: Arc::downgrade(&state),
                team: Uuid::from_u128(SECOND_TEAM),
            }))
            .await;
        let (tx, _outbound) = mpsc::unbounded_channel();
        let ctx = SessionContext::new(Some("ref".into()));

        let (page, room) = open_live_view(&state, &ctx, event_id, true, &tx)
            .await
            .unwrap();
        let snapshot = serde_json::to_value(page.view()).unwrap();
        assert_eq!(registered_flags(&snapshot), vec![false, false]);

        let mut session = Session::start_with(*page, room);
        session.skip_opening_views().await;
        let view = session.next_json().await;
        assert_eq!(registered_flags(&view), vec![false, true]);
    }
}
