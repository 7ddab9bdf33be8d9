//! Grouping of the flat match list into per-round schedules.

use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::model::{Match, Role, RoundType, ScheduleSlot, Table, Team};

/// Role whose general schedule slots are shown next to the robot game rounds.
pub const FIELD_SCHEDULE_ROLE: Role = Role::Referee;

/// Everything one round card needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoundSchedule {
    /// Referee slots of the general schedule, empty when hidden.
    pub event_schedule: Vec<ScheduleSlot>,
    /// Practice or ranking.
    pub round_type: RoundType,
    /// Round number within the type.
    pub round_number: u32,
    /// Matches of this round, in their original order.
    pub matches: Vec<Match>,
    /// Every table of the event.
    pub tables: Vec<Table>,
    /// Every team of the event, live updates applied.
    pub teams: Vec<Team>,
}

/// Borrowed inputs of [`derive_round_schedules`].
#[derive(Debug, Clone, Copy)]
pub struct ScheduleInputs<'a> {
    /// All matches of the event.
    pub matches: &'a [Match],
    /// Published general schedule, if any.
    pub schedule: Option<&'a [ScheduleSlot]>,
    /// Whether the general schedule is shown.
    pub show_general_schedule: bool,
    /// Current team roster.
    pub teams: &'a [Team],
    /// Tables of the event.
    pub tables: &'a [Table],
}

/// Slots of `schedule` that apply to `role`, or nothing when the general
/// schedule is hidden.
pub fn filter_schedule(
    schedule: Option<&[ScheduleSlot]>,
    role: Role,
    show_general_schedule: bool,
) -> Vec<ScheduleSlot> {
    if !show_general_schedule {
        return Vec::new();
    }

    schedule
        .unwrap_or_default()
        .iter()
        .filter(|slot| slot.applies_to(role))
        .cloned()
        .collect()
}

/// Build one [`RoundSchedule`] per `(round type, round)` present in the matches.
///
/// Practice rounds come before ranking rounds. Rounds of the same type are
/// emitted in ascending round number, whatever order the matches arrive in:
/// rounds `[2, 1, 2, 3, 1]` give groups 1, 2, 3, never 2, 1, 3. Every match
/// lands in exactly one group; an empty match list yields no groups.
pub fn derive_round_schedules(inputs: ScheduleInputs<'_>) -> Vec<RoundSchedule> {
    let event_schedule = filter_schedule(
        inputs.schedule,
        FIELD_SCHEDULE_ROLE,
        inputs.show_general_schedule,
    );

    let mut rounds = Vec::new();
    for round_type in RoundType::ORDERED {
        let of_type: Vec<&Match> = inputs
            .matches
            .iter()
            .filter(|m| m.round_type == round_type)
            .collect();
        // Sorted on purpose; the import does not guarantee round order.
        let round_numbers: BTreeSet<u32> = of_type.iter().map(|m| m.round).collect();

        for round_number in round_numbers {
            rounds.push(RoundSchedule {
                event_schedule: event_schedule.clone(),
                round_type,
                round_number,
                matches: of_type
                    .iter()
                    .filter(|m| m.round == round_number)
                    .map(|m| (*m).clone())
                    .collect(),
                tables: inputs.tables.to_vec(),
                teams: inputs.teams.to_vec(),
            });
        }
    }
    rounds
}
