//! Applies live room updates onto the team roster loaded with the snapshot.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use super::model::Team;
use crate::state::RoomMessage;

/// Update categories a live view may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateCategory {
    /// A team checked in at the pit admin desk.
    TeamRegistered,
}

impl UpdateCategory {
    /// Name of the category on the room channel.
    pub fn name(self) -> &'static str {
        match self {
            UpdateCategory::TeamRegistered => "teamRegistered",
        }
    }

    /// Category for a room channel name, if known.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "teamRegistered" => Some(UpdateCategory::TeamRegistered),
            _ => None,
        }
    }
}

/// Decoded room update, one variant per category with its full payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveUpdate {
    /// Full replacement of a team after it checked in.
    TeamRegistered(Team),
}

impl LiveUpdate {
    /// Category the update was published under.
    pub fn category(&self) -> UpdateCategory {
        match self {
            LiveUpdate::TeamRegistered(_) => UpdateCategory::TeamRegistered,
        }
    }

    /// Decode a room message. Unknown categories and payloads that do not
    /// match their category yield `None`.
    pub fn decode(message: &RoomMessage) -> Option<Self> {
        let category = UpdateCategory::from_name(&message.category)?;
        match category {
            UpdateCategory::TeamRegistered => match serde_json::from_str::<Team>(&message.data) {
                Ok(team) => Some(LiveUpdate::TeamRegistered(team)),
                Err(err) => {
                    debug!(category = %message.category, error = %err, "ignoring malformed room update");
                    None
                }
            },
        }
    }
}

/// State of the room subscription as shown to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Subscription in progress.
    Connecting,
    /// Receiving room updates.
    Connected,
    /// Room channel gone; the last data stays on screen.
    Disconnected,
}

/// Lifecycle transitions reported by the room channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Joining the room.
    Subscribing,
    /// Joined.
    Subscribed,
    /// The room channel closed.
    Closed,
}

impl From<ChannelEvent> for ConnectionStatus {
    fn from(value: ChannelEvent) -> Self {
        match value {
            ChannelEvent::Subscribing => ConnectionStatus::Connecting,
            ChannelEvent::Subscribed => ConnectionStatus::Connected,
            ChannelEvent::Closed => ConnectionStatus::Disconnected,
        }
    }
}

/// What happened to a room message handed to [`LiveReconciler::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A local entity was replaced.
    Replaced,
    /// The payload names an entity this view does not hold.
    UnknownEntity,
    /// Category outside the allow-list, unknown, or undecodable payload.
    Ignored,
}

/// Ordered team collection keyed by identifier.
///
/// Replacement keeps every team at its position and never changes the size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRoster {
    teams: IndexMap<Uuid, Team>,
}

impl TeamRoster {
    /// Roster keeping `teams` in the given order.
    pub fn new(teams: Vec<Team>) -> Self {
        Self {
            teams: teams.into_iter().map(|team| (team.id, team)).collect(),
        }
    }

    /// Replace the team sharing `team.id`. Returns `false` when no such team exists.
    pub fn replace(&mut self, team: Team) -> bool {
        match self.teams.get_mut(&team.id) {
            Some(slot) => {
                *slot = team;
                true
            }
            None => false,
        }
    }

    /// Team with identifier `id`.
    pub fn get(&self, id: &Uuid) -> Option<&Team> {
        self.teams.get(id)
    }

    /// Number of teams.
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether the roster holds no team.
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Teams in roster order.
    pub fn to_vec(&self) -> Vec<Team> {
        self.teams.values().cloned().collect()
    }
}

/// Mirror of the server-side teams for one event room.
#[derive(Debug, Clone)]
pub struct LiveReconciler {
    room: Uuid,
    categories: Vec<UpdateCategory>,
    roster: TeamRoster,
    status: ConnectionStatus,
}

impl LiveReconciler {
    /// Start reconciling `teams` for `room`, accepting only `categories`.
    pub fn new(room: Uuid, categories: &[UpdateCategory], teams: Vec<Team>) -> Self {
        Self {
            room,
            categories: categories.to_vec(),
            roster: TeamRoster::new(teams),
            status: ConnectionStatus::Connecting,
        }
    }

    /// Event room this reconciler follows.
    pub fn room(&self) -> Uuid {
        self.room
    }

    /// Current subscription status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Teams with every applied update.
    pub fn roster(&self) -> &TeamRoster {
        &self.roster
    }

    /// Whether updates of `category` are applied.
    pub fn subscribes_to(&self, category: UpdateCategory) -> bool {
        self.categories.contains(&category)
    }

    /// Record a lifecycle transition of the room channel.
    pub fn on_channel_event(&mut self, event: ChannelEvent) {
        self.status = event.into();
    }

    /// Decode and apply a raw room message.
    pub fn handle(&mut self, message: &RoomMessage) -> UpdateOutcome {
        match LiveUpdate::decode(message) {
            Some(update) => self.apply(update),
            None => UpdateOutcome::Ignored,
        }
    }

    /// Apply a decoded update if its category is subscribed.
    pub fn apply(&mut self, update: LiveUpdate) -> UpdateOutcome {
        if !self.subscribes_to(update.category()) {
            return UpdateOutcome::Ignored;
        }

        match update {
            LiveUpdate::TeamRegistered(team) => {
                let team_id = team.id;
                if self.roster.replace(team) {
                    UpdateOutcome::Replaced
                } else {
                    debug!(room = %self.room, team_id = %team_id, "ignoring update for unknown team");
                    UpdateOutcome::UnknownEntity
                }
            }
        }
    }
}
