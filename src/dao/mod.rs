/// Event store trait and its backends.
pub mod event_store;
/// Persisted entities.
pub mod models;
/// Backend-agnostic storage errors.
pub mod storage;
