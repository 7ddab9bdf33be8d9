use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{
    EventEntity, MatchEntity, Role, RoundType, ScheduleSlotEntity, TableEntity, TeamEntity,
};

pub const EVENT_COLLECTION_NAME: &str = "events";
pub const TEAM_COLLECTION_NAME: &str = "teams";
pub const TABLE_COLLECTION_NAME: &str = "tables";
pub const MATCH_COLLECTION_NAME: &str = "matches";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoScheduleSlot {
    name: String,
    start_time: DateTime,
    end_time: DateTime,
    roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoEventDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    start_date: DateTime,
    end_date: DateTime,
    #[serde(default)]
    schedule: Option<Vec<MongoScheduleSlot>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    id: String,
    event_id: String,
    number: u32,
    name: String,
    affiliation_name: String,
    affiliation_city: String,
    #[serde(default)]
    registered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTableDocument {
    #[serde(rename = "_id")]
    id: String,
    event_id: String,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    event_id: String,
    round_type: RoundType,
    round: u32,
    number: u32,
    table_id: String,
    team_id: Option<String>,
    scheduled_time: DateTime,
}

impl From<ScheduleSlotEntity> for MongoScheduleSlot {
    fn from(value: ScheduleSlotEntity) -> Self {
        Self {
            name: value.name,
            start_time: DateTime::from_system_time(value.start_time),
            end_time: DateTime::from_system_time(value.end_time),
            roles: value.roles,
        }
    }
}

impl From<MongoScheduleSlot> for ScheduleSlotEntity {
    fn from(value: MongoScheduleSlot) -> Self {
        Self {
            name: value.name,
            start_time: value.start_time.to_system_time(),
            end_time: value.end_time.to_system_time(),
            roles: value.roles,
        }
    }
}

impl From<EventEntity> for MongoEventDocument {
    fn from(value: EventEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            start_date: DateTime::from_system_time(value.start_date),
            end_date: DateTime::from_system_time(value.end_date),
            schedule: value
                .schedule
                .map(|slots| slots.into_iter().map(Into::into).collect()),
        }
    }
}

impl TryFrom<MongoEventDocument> for EventEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoEventDocument) -> Result<Self, Self::Error> {
        let id = parse_id(EVENT_COLLECTION_NAME, &value.id, &value.id)?;
        Ok(Self {
            id,
            name: value.name,
            start_date: value.start_date.to_system_time(),
            end_date: value.end_date.to_system_time(),
            schedule: value
                .schedule
                .map(|slots| slots.into_iter().map(Into::into).collect()),
        })
    }
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id.to_string(),
            event_id: value.event_id.to_string(),
            number: value.number,
            name: value.name,
            affiliation_name: value.affiliation_name,
            affiliation_city: value.affiliation_city,
            registered: value.registered,
        }
    }
}

impl TryFrom<MongoTeamDocument> for TeamEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTeamDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(TEAM_COLLECTION_NAME, &value.id, &value.id)?,
            event_id: parse_id(TEAM_COLLECTION_NAME, &value.id, &value.event_id)?,
            number: value.number,
            name: value.name,
            affiliation_name: value.affiliation_name,
            affiliation_city: value.affiliation_city,
            registered: value.registered,
        })
    }
}

impl From<TableEntity> for MongoTableDocument {
    fn from(value: TableEntity) -> Self {
        Self {
            id: value.id.to_string(),
            event_id: value.event_id.to_string(),
            name: value.name,
        }
    }
}

impl TryFrom<MongoTableDocument> for TableEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTableDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(TABLE_COLLECTION_NAME, &value.id, &value.id)?,
            event_id: parse_id(TABLE_COLLECTION_NAME, &value.id, &value.event_id)?,
            name: value.name,
        })
    }
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id.to_string(),
            event_id: value.event_id.to_string(),
            round_type: value.round_type,
            round: value.round,
            number: value.number,
            table_id: value.table_id.to_string(),
            team_id: value.team_id.map(|id| id.to_string()),
            scheduled_time: DateTime::from_system_time(value.scheduled_time),
        }
    }
}

impl TryFrom<MongoMatchDocument> for MatchEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchDocument) -> Result<Self, Self::Error> {
        let team_id = value
            .team_id
            .as_deref()
            .map(|raw| parse_id(MATCH_COLLECTION_NAME, &value.id, raw))
            .transpose()?;

        Ok(Self {
            id: parse_id(MATCH_COLLECTION_NAME, &value.id, &value.id)?,
            event_id: parse_id(MATCH_COLLECTION_NAME, &value.id, &value.event_id)?,
            round_type: value.round_type,
            round: value.round,
            number: value.number,
            table_id: parse_id(MATCH_COLLECTION_NAME, &value.id, &value.table_id)?,
            team_id,
            scheduled_time: value.scheduled_time.to_system_time(),
        })
    }
}

fn parse_id(collection: &'static str, document_id: &str, raw: &str) -> Result<Uuid, MongoDaoError> {
    Uuid::parse_str(raw).map_err(|err| MongoDaoError::CorruptDocument {
        collection,
        id: document_id.to_owned(),
        reason: format!("invalid identifier `{raw}`: {err}"),
    })
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

pub fn by_event(event_id: Uuid) -> Document {
    doc! {"event_id": event_id.to_string()}
}
