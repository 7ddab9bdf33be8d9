//! Runtime representation of the entities the field schedule works with.
//!
//! These types are what the API serves and what live updates carry, so
//! timestamps travel as RFC 3339 strings.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

pub use crate::dao::models::{Role, RoundType};
use crate::dao::models::{EventEntity, MatchEntity, ScheduleSlotEntity, TableEntity, TeamEntity};

/// Slot of the general event schedule, tagged with the roles it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleSlot {
    /// Label displayed for the slot.
    pub name: String,
    /// Start of the slot.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// End of the slot.
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    /// Roles the slot applies to.
    pub roles: Vec<Role>,
}

impl ScheduleSlot {
    /// Whether the slot is relevant to viewers holding `role`.
    pub fn applies_to(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Tournament with its optional published schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Stable identifier for the event.
    pub id: Uuid,
    /// Display name of the event.
    pub name: String,
    /// First day of the event.
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    /// Last day of the event.
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    /// General schedule, only served when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleSlot>>,
}

impl Event {
    /// Drop the published schedule, as served when the caller did not ask for it.
    pub fn without_schedule(mut self) -> Self {
        self.schedule = None;
        self
    }
}

/// Team of an event. Only the identifier is stable, every other field may
/// be replaced by a live update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Event the team competes in.
    pub event_id: Uuid,
    /// Official team number.
    pub number: u32,
    /// Display name chosen for the team.
    pub name: String,
    /// School or club the team represents.
    pub affiliation_name: String,
    /// City of the affiliation.
    pub affiliation_city: String,
    /// Whether the team checked in at the pit admin desk.
    pub registered: bool,
}

/// Robot game table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Table {
    /// Stable identifier for the table.
    pub id: Uuid,
    /// Event the table belongs to.
    pub event_id: Uuid,
    /// Display name, e.g. "Red".
    pub name: String,
}

/// Robot game match as delivered by the schedule import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Match {
    /// Stable identifier for the match.
    pub id: Uuid,
    /// Event the match belongs to.
    pub event_id: Uuid,
    /// Practice or ranking, serialised as `type`.
    #[serde(rename = "type")]
    pub round_type: RoundType,
    /// Round number within its type, starting at 1.
    pub round: u32,
    /// Match number within the event.
    pub number: u32,
    /// Table the match is played on.
    pub table_id: Uuid,
    /// Team playing the match; `None` for an empty slot.
    pub team_id: Option<Uuid>,
    /// Planned start of the match.
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_time: OffsetDateTime,
}

/// Viewer identity without credentials, as returned by `/api/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Login name.
    pub username: String,
    /// Event the viewer works at.
    pub event: Uuid,
    /// Role held at the event; admins may have none.
    #[serde(default)]
    pub role: Option<Role>,
    /// Admins pass every role gate and may manage events.
    #[serde(default)]
    pub is_admin: bool,
}

impl From<ScheduleSlotEntity> for ScheduleSlot {
    fn from(value: ScheduleSlotEntity) -> Self {
        Self {
            name: value.name,
            start_time: value.start_time.into(),
            end_time: value.end_time.into(),
            roles: value.roles,
        }
    }
}

impl From<ScheduleSlot> for ScheduleSlotEntity {
    fn from(value: ScheduleSlot) -> Self {
        Self {
            name: value.name,
            start_time: value.start_time.into(),
            end_time: value.end_time.into(),
            roles: value.roles,
        }
    }
}

impl From<EventEntity> for Event {
    fn from(value: EventEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            start_date: value.start_date.into(),
            end_date: value.end_date.into(),
            schedule: value
                .schedule
                .map(|slots| slots.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<Event> for EventEntity {
    fn from(value: Event) -> Self {
        Self {
            id: value.id,
            name: value.name,
            start_date: value.start_date.into(),
            end_date: value.end_date.into(),
            schedule: value
                .schedule
                .map(|slots| slots.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            number: value.number,
            name: value.name,
            affiliation_name: value.affiliation_name,
            affiliation_city: value.affiliation_city,
            registered: value.registered,
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            number: value.number,
            name: value.name,
            affiliation_name: value.affiliation_name,
            affiliation_city: value.affiliation_city,
            registered: value.registered,
        }
    }
}

impl From<TableEntity> for Table {
    fn from(value: TableEntity) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            name: value.name,
        }
    }
}

impl From<Table> for TableEntity {
    fn from(value: Table) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            name: value.name,
        }
    }
}

impl From<MatchEntity> for Match {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            round_type: value.round_type,
            round: value.round,
            number: value.number,
            table_id: value.table_id,
            team_id: value.team_id,
            scheduled_time: value.scheduled_time.into(),
        }
    }
}

impl From<Match> for MatchEntity {
    fn from(value: Match) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            round_type: value.round_type,
            round: value.round,
            number: value.number,
            table_id: value.table_id,
            team_id: value.team_id,
            scheduled_time: value.scheduled_time.into(),
        }
    }
}
