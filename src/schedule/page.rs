//! Session-local state of one field schedule viewer.

use uuid::Uuid;

use super::{
    loader::PageProps,
    model::{Event, Match, Table, User},
    reconciler::{ChannelEvent, ConnectionStatus, LiveReconciler, UpdateCategory, UpdateOutcome},
    view::{RoundSchedule, ScheduleInputs, derive_round_schedules},
};
use crate::{dto::schedule::FieldScheduleView, state::RoomMessage};

/// Categories the field schedule listens to.
pub const FIELD_SCHEDULE_CATEGORIES: &[UpdateCategory] = &[UpdateCategory::TeamRegistered];

/// Loaded snapshot plus the live roster and presentation toggles.
///
/// Owned by a single task; every mutation is followed by a fresh [`view`](Self::view).
#[derive(Debug, Clone)]
pub struct FieldSchedulePage {
    user: User,
    event: Event,
    tables: Vec<Table>,
    matches: Vec<Match>,
    reconciler: LiveReconciler,
    show_general_schedule: bool,
}

impl FieldSchedulePage {
    /// Page over a loaded snapshot, still connecting.
    pub fn new(props: PageProps, show_general_schedule: bool) -> Self {
        let PageProps {
            user,
            event,
            teams,
            tables,
            matches,
        } = props;
        let reconciler = LiveReconciler::new(event.id, FIELD_SCHEDULE_CATEGORIES, teams);
        Self {
            user,
            event,
            tables,
            matches,
            reconciler,
            show_general_schedule,
        }
    }

    /// Event the page shows.
    pub fn event_id(&self) -> Uuid {
        self.event.id
    }

    /// Live channel status.
    pub fn status(&self) -> ConnectionStatus {
        self.reconciler.status()
    }

    /// Forward a room lifecycle transition to the reconciler.
    pub fn on_channel_event(&mut self, event: ChannelEvent) {
        self.reconciler.on_channel_event(event);
    }

    /// Apply a room message. Returns whether the view changed.
    pub fn handle_room_message(&mut self, message: &RoomMessage) -> bool {
        self.reconciler.handle(message) == UpdateOutcome::Replaced
    }

    /// Returns whether the toggle actually changed.
    pub fn set_show_general_schedule(&mut self, show: bool) -> bool {
        let changed = self.show_general_schedule != show;
        self.show_general_schedule = show;
        changed
    }

    /// Round groups derived from the current state.
    pub fn rounds(&self) -> Vec<RoundSchedule> {
        let teams = self.reconciler.roster().to_vec();
        derive_round_schedules(ScheduleInputs {
            matches: &self.matches,
            schedule: self.event.schedule.as_deref(),
            show_general_schedule: self.show_general_schedule,
            teams: &teams,
            tables: &self.tables,
        })
    }

    /// Browser title, named after the viewer's role.
    pub fn title(&self) -> String {
        let role = match self.user.role {
            Some(role) => role.display_name(),
            None => "Admin",
        };
        format!("{role} interface - field schedule | {}", self.event.name)
    }

    /// Page the back button leads to, also used when the role gate refuses the viewer.
    pub fn back_path(event_id: Uuid) -> String {
        format!("/event/{event_id}/reports")
    }

    /// Everything the client renders.
    pub fn view(&self) -> FieldScheduleView {
        let status = self.status();
        FieldScheduleView {
            connection_status: status,
            title: self.title(),
            back: Self::back_path(self.event.id),
            back_disabled: status != ConnectionStatus::Connecting,
            error: status == ConnectionStatus::Disconnected,
            show_general_schedule: self.show_general_schedule,
            rounds: self.rounds(),
        }
    }
}
