use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::schedule::FieldScheduleView;

#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
/// Messages accepted from live field schedule clients.
#[serde(tag = "type")]
pub enum LiveViewInbound {
    #[serde(rename = "showGeneralSchedule")]
    ShowGeneralSchedule { show: bool },
    #[serde(rename = "ping")]
    Ping,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, ToSchema)]
/// Messages pushed to live field schedule clients.
#[serde(tag = "type")]
pub enum LiveViewOutbound {
    /// Full page state, sent after every change.
    #[serde(rename = "view")]
    View(FieldScheduleView),
    /// The page cannot be served; navigate to `destination`.
    #[serde(rename = "redirect")]
    Redirect { destination: String },
    #[serde(rename = "pong")]
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_messages_decode_by_type() {
        let toggle: LiveViewInbound =
            serde_json::from_str(r#"{"type":"showGeneralSchedule","show":false}"#).unwrap();
        assert_eq!(toggle, LiveViewInbound::ShowGeneralSchedule { show: false });

        let ping: LiveViewInbound = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, LiveViewInbound::Ping);

        let other: LiveViewInbound = serde_json::from_str(r#"{"type":"subscribe"}"#).unwrap();
        assert_eq!(other, LiveViewInbound::Unknown);
    }

    #[test]
    fn redirect_serialises_with_type_tag() {
        let json = serde_json::to_value(LiveViewOutbound::Redirect {
            destination: "/login".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "redirect", "destination": "/login"})
        );
    }
}
