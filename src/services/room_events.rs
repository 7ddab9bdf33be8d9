//! Room messages published to live viewers of an event.

use tracing::{debug, warn};

use crate::{
    schedule::{model::Team, reconciler::UpdateCategory},
    state::{RoomMessage, SharedState},
};

/// Tell every viewer of the team's event that it checked in.
pub fn broadcast_team_registered(state: &SharedState, team: &Team) {
    let message = match RoomMessage::json(UpdateCategory::TeamRegistered.name(), team) {
        Ok(message) => message,
        Err(err) => {
            warn!(team_id = %team.id, error = %err, "failed to serialise teamRegistered payload");
            return;
        }
    };

    let receivers = state.rooms().publish(team.event_id, message);
    debug!(event_id = %team.event_id, team_id = %team.id, receivers, "broadcast teamRegistered");
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn registered_team_reaches_event_room() {
        let state = AppState::new(AppConfig::default());
        let event_id = Uuid::new_v4();
        let mut room = state.rooms().subscribe(event_id);
        let team = Team {
            id: Uuid::new_v4(),
            event_id,
            number: 7,
            name: "Gears".into(),
            affiliation_name: "School".into(),
            affiliation_city: "Eilat".into(),
            registered: true,
        };

        broadcast_team_registered(&state, &team);

        let message = room.recv().await.unwrap();
        assert_eq!(message.category, "teamRegistered");
        assert_eq!(serde_json::from_str::<Team>(&message.data).unwrap(), team);
    }
}
