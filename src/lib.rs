//! Library crate for lems-field-schedule-back, exposing modules for binaries and integration tests.

/// Application configuration and the session directory.
pub mod config;
/// Persistence layer: entities, storage errors and event stores.
pub mod dao;
mod dto;
mod error;
/// HTTP and WebSocket routes.
pub mod routes;
/// Field schedule domain logic.
pub mod schedule;
/// Business logic shared by the routes.
pub mod services;
/// Shared application state and event rooms.
pub mod state;
