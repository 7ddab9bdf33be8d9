//! Field schedule: snapshot loading, live reconciliation and per-round view derivation.

/// Snapshot loading from an explicit session.
pub mod loader;
/// Domain types served to clients.
pub mod model;
/// Session-local page state.
pub mod page;
/// Live room updates applied to the team roster.
pub mod reconciler;
/// Role-based page access.
pub mod role_gate;
/// Per-round view derivation.
pub mod view;
