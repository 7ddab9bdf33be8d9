use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::schedule::{reconciler::ConnectionStatus, view::RoundSchedule};

/// Query flags accepted by the field schedule page.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct FieldScheduleQuery {
    /// Show the referee slots of the general schedule next to each round.
    #[serde(default = "default_show_general_schedule")]
    pub show_general_schedule: bool,
}

impl Default for FieldScheduleQuery {
    fn default() -> Self {
        Self {
            show_general_schedule: default_show_general_schedule(),
        }
    }
}

fn default_show_general_schedule() -> bool {
    true
}

/// Rendered field schedule page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldScheduleView {
    pub connection_status: ConnectionStatus,
    pub title: String,
    /// Page the back button leads to.
    pub back: String,
    pub back_disabled: bool,
    /// Set while the live channel is disconnected.
    pub error: bool,
    pub show_general_schedule: bool,
    pub rounds: Vec<RoundSchedule>,
}
