//! Page access by viewer role.

use super::model::{Role, User};

/// Result of checking a viewer against the roles a page admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The page may be shown.
    Allow,
    /// The viewer should be navigated back to where they came from.
    NavigateBack,
}

/// Role-based page guard. Admins always pass.
#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    /// Gate admitting only `allowed`, plus admins.
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    /// Gate admitting every role.
    pub const fn any_role() -> Self {
        Self::new(&Role::ALL)
    }

    /// Decide whether `user` may see the page.
    pub fn authorize(&self, user: &User) -> GateDecision {
        if user.is_admin {
            return GateDecision::Allow;
        }
        match user.role {
            Some(role) if self.allowed.contains(&role) => GateDecision::Allow,
            _ => GateDecision::NavigateBack,
        }
    }
}
