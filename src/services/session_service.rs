//! Viewer resolution and access checks shared by the REST and live routes.

use uuid::Uuid;

use crate::{
    error::ServiceError,
    schedule::{
        loader::SessionContext,
        model::{Role, User},
        role_gate::{GateDecision, RoleGate},
    },
    state::SharedState,
};

/// Resolve the viewer owning the presented token.
pub fn current_user(state: &SharedState, ctx: &SessionContext) -> Result<User, ServiceError> {
    let token = ctx
        .token
        .as_deref()
        .ok_or_else(|| ServiceError::Unauthorized("missing session token".into()))?;

    state
        .config()
        .sessions()
        .resolve(token)
        .cloned()
        .ok_or_else(|| ServiceError::Unauthorized("unknown session".into()))
}

/// Resolve the viewer and insist on an admin.
pub fn require_admin(state: &SharedState, ctx: &SessionContext) -> Result<User, ServiceError> {
    let user = current_user(state, ctx)?;
    if user.is_admin {
        Ok(user)
    } else {
        Err(ServiceError::Forbidden("admin session required".into()))
    }
}

/// Viewer allowed to read data of `event_id`: admins, or anyone working at that event.
pub fn require_event_access(
    state: &SharedState,
    ctx: &SessionContext,
    event_id: Uuid,
) -> Result<User, ServiceError> {
    let user = current_user(state, ctx)?;
    if user.is_admin || user.event == event_id {
        Ok(user)
    } else {
        Err(ServiceError::Forbidden(format!(
            "session does not belong to event `{event_id}`"
        )))
    }
}

/// Same as [`require_event_access`] restricted to `roles`.
pub fn require_event_role(
    state: &SharedState,
    ctx: &SessionContext,
    event_id: Uuid,
    roles: &'static [Role],
) -> Result<User, ServiceError> {
    let user = require_event_access(state, ctx, event_id)?;
    match RoleGate::new(roles).authorize(&user) {
        GateDecision::Allow => Ok(user),
        GateDecision::NavigateBack => Err(ServiceError::Forbidden(format!(
            "role {:?} may not perform this action",
            user.role
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn state(event: Uuid) -> SharedState {
        let raw = format!(
            r#"{{"sessions": [
                {{"token": "pit", "username": "pit", "event": "{event}", "role": "pit-admin"}},
                {{"token": "ref", "username": "ref", "event": "{event}", "role": "referee"}},
                {{"token": "root", "username": "root", "event": "{event}", "is_admin": true}}
            ]}}"#
        );
        AppState::new(AppConfig::from_json(&raw).unwrap())
    }

    fn ctx(token: &str) -> SessionContext {
        SessionContext::new(Some(token.into()))
    }

    #[test]
    fn missing_or_unknown_token_is_unauthorized() {
        let state = state(Uuid::new_v4());

        assert!(matches!(
            current_user(&state, &SessionContext::default()),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            current_user(&state, &ctx("who")),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn event_roles_are_enforced() {
        let event = Uuid::new_v4();
        let state = state(event);
        const PIT: &[Role] = &[Role::PitAdmin];

        assert!(require_event_role(&state, &ctx("pit"), event, PIT).is_ok());
        assert!(require_event_role(&state, &ctx("root"), event, PIT).is_ok());
        assert!(matches!(
            require_event_role(&state, &ctx("ref"), event, PIT),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            require_event_access(&state, &ctx("pit"), Uuid::new_v4()),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn only_admins_pass_admin_check() {
        let state = state(Uuid::new_v4());
        assert!(require_admin(&state, &ctx("root")).is_ok());
        assert!(require_admin(&state, &ctx("pit")).is_err());
    }
}
