//! Entities as the event stores persist them.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Functional role a viewer holds during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Judging room volunteer.
    Judge,
    /// Leads a judging pod.
    LeadJudge,
    /// Coordinates the judging process.
    JudgeAdvisor,
    /// Robot game referee.
    Referee,
    /// Leads the referees.
    HeadReferee,
    /// Enters robot game scores.
    Scorekeeper,
    /// Checks teams in at the pit.
    PitAdmin,
    /// Runs the event schedule.
    TournamentManager,
    /// Master of ceremonies.
    Mc,
    /// Report screens.
    Reports,
    /// Audience displays.
    Audience,
}

impl Role {
    /// Every role known to the system, in display order.
    pub const ALL: [Role; 11] = [
        Role::Judge,
        Role::LeadJudge,
        Role::JudgeAdvisor,
        Role::Referee,
        Role::HeadReferee,
        Role::Scorekeeper,
        Role::PitAdmin,
        Role::TournamentManager,
        Role::Mc,
        Role::Reports,
        Role::Audience,
    ];

    /// Human readable name used in page titles.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Judge => "Judge",
            Role::LeadJudge => "Lead Judge",
            Role::JudgeAdvisor => "Judge Advisor",
            Role::Referee => "Referee",
            Role::HeadReferee => "Head Referee",
            Role::Scorekeeper => "Scorekeeper",
            Role::PitAdmin => "Pit Admin",
            Role::TournamentManager => "Tournament Manager",
            Role::Mc => "MC",
            Role::Reports => "Reports",
            Role::Audience => "Audience",
        }
    }
}

/// Kind of robot game round a match belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RoundType {
    /// Unscored warm-up rounds.
    Practice,
    /// Rounds counting towards the ranking.
    Ranking,
}

impl RoundType {
    /// Round types in the order their schedules are presented.
    pub const ORDERED: [RoundType; 2] = [RoundType::Practice, RoundType::Ranking];
}

/// Slot of the general event schedule (opening ceremony, lunch, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleSlotEntity {
    /// Label displayed for the slot.
    pub name: String,
    /// Start of the slot.
    pub start_time: SystemTime,
    /// End of the slot.
    pub end_time: SystemTime,
    /// Roles the slot applies to.
    pub roles: Vec<Role>,
}

/// Event (tournament) persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEntity {
    /// Primary key of the event.
    pub id: Uuid,
    /// Display name of the event.
    pub name: String,
    /// First day of the event.
    pub start_date: SystemTime,
    /// Last day of the event.
    pub end_date: SystemTime,
    /// Published general schedule, absent until the organisers publish one.
    pub schedule: Option<Vec<ScheduleSlotEntity>>,
}

/// Team registered to an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
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

/// Robot game table of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableEntity {
    /// Stable identifier for the table.
    pub id: Uuid,
    /// Event the table belongs to.
    pub event_id: Uuid,
    /// Display name, e.g. "Red".
    pub name: String,
}

/// Pre-computed robot game match assigning a team to a table in a round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Stable identifier for the match.
    pub id: Uuid,
    /// Event the match belongs to.
    pub event_id: Uuid,
    /// Practice or ranking.
    pub round_type: RoundType,
    /// Round number within its type, starting at 1.
    pub round: u32,
    /// Match number within the event, used for ordering.
    pub number: u32,
    /// Table the match is played on.
    pub table_id: Uuid,
    /// Team playing the match; `None` for an empty slot.
    pub team_id: Option<Uuid>,
    /// Planned start of the match.
    pub scheduled_time: SystemTime,
}
