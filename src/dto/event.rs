//! DTO definitions used by the event REST API and documentation layer.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    dto::validation::{validate_not_blank, validate_time_range},
    schedule::model::{Event, Match, Role, RoundType, ScheduleSlot, Table, Team},
};

/// Query flags accepted by `GET /api/events/{id}`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct EventQuery {
    /// Include the published general schedule.
    #[serde(default)]
    pub with_schedule: bool,
}

/// Payload used to create or replace an event.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_event_dates"))]
pub struct EventRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(default)]
    #[validate(nested)]
    pub schedule: Option<Vec<ScheduleSlotInput>>,
}

fn validate_event_dates(request: &EventRequest) -> Result<(), ValidationError> {
    validate_time_range(request.start_date, request.end_date)
}

impl EventRequest {
    /// Build the event stored under `id`.
    pub fn into_event(self, id: Uuid) -> Event {
        Event {
            id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            schedule: self
                .schedule
                .map(|slots| slots.into_iter().map(Into::into).collect()),
        }
    }
}

/// Slot of the general schedule as submitted by organisers.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_slot_times"))]
pub struct ScheduleSlotInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    #[serde(default)]
    pub roles: Vec<Role>,
}

fn validate_slot_times(slot: &ScheduleSlotInput) -> Result<(), ValidationError> {
    validate_time_range(slot.start_time, slot.end_time)
}

impl From<ScheduleSlotInput> for ScheduleSlot {
    fn from(value: ScheduleSlotInput) -> Self {
        Self {
            name: value.name,
            start_time: value.start_time,
            end_time: value.end_time,
            roles: value.roles,
        }
    }
}

/// Pre-computed teams, tables and matches of an event.
///
/// Matches reference teams and tables of the same bundle by identifier.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ImportBundleRequest {
    #[serde(default)]
    #[validate(nested)]
    pub teams: Vec<TeamInput>,
    #[serde(default)]
    #[validate(nested)]
    pub tables: Vec<TableInput>,
    #[serde(default)]
    #[validate(nested)]
    pub matches: Vec<MatchInput>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TeamInput {
    pub id: Uuid,
    #[validate(range(min = 1))]
    pub number: u32,
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    pub affiliation_name: String,
    pub affiliation_city: String,
    #[serde(default)]
    pub registered: bool,
}

impl TeamInput {
    pub fn into_team(self, event_id: Uuid) -> Team {
        Team {
            id: self.id,
            event_id,
            number: self.number,
            name: self.name,
            affiliation_name: self.affiliation_name,
            affiliation_city: self.affiliation_city,
            registered: self.registered,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TableInput {
    pub id: Uuid,
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

impl TableInput {
    pub fn into_table(self, event_id: Uuid) -> Table {
        Table {
            id: self.id,
            event_id,
            name: self.name,
        }
    }
}

/// Match of the imported schedule. A missing identifier is generated.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct MatchInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub round_type: RoundType,
    #[validate(range(min = 1))]
    pub round: u32,
    #[validate(range(min = 1))]
    pub number: u32,
    pub table_id: Uuid,
    /// Empty when no team plays at this table.
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_time: OffsetDateTime,
}

impl MatchInput {
    pub fn into_match(self, event_id: Uuid) -> Match {
        Match {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            event_id,
            round_type: self.round_type,
            round: self.round,
            number: self.number,
            table_id: self.table_id,
            team_id: self.team_id,
            scheduled_time: self.scheduled_time,
        }
    }
}

/// Counts of what an import stored.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct ImportSummary {
    pub teams: usize,
    pub tables: usize,
    pub matches: usize,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_request_rejects_inverted_dates_and_blank_name() {
        let request: EventRequest = serde_json::from_value(serde_json::json!({
            "name": "  ",
            "start_date": "2024-03-01T10:00:00Z",
            "end_date": "2024-03-01T08:00:00Z",
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn import_bundle_rejects_round_zero() {
        let bundle: ImportBundleRequest = serde_json::from_value(serde_json::json!({
            "matches": [{
                "type": "practice",
                "round": 0,
                "number": 1,
                "table_id": Uuid::nil(),
                "scheduled_time": "2024-03-01T10:00:00Z",
            }]
        }))
        .unwrap();

        assert!(bundle.validate().is_err());
    }

    #[test]
    fn event_query_reads_camel_case_flag() {
        let query: EventQuery = serde_json::from_str(r#"{"withSchedule": true}"#).unwrap();
        assert!(query.with_schedule);
        let query: EventQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.with_schedule);
    }
}
