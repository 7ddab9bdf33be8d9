/// OpenAPI documentation generation.
pub mod documentation;
/// Event CRUD and schedule import.
pub mod event_service;
/// Health check service.
pub mod health_service;
/// Messages published to event rooms.
pub mod room_events;
/// Field schedule page loading.
pub mod schedule_service;
/// Viewer resolution and access checks.
pub mod session_service;
/// Storage connection supervisor with backoff and degraded mode.
pub mod storage_supervisor;
/// Teams, tables, matches and team check-in.
pub mod team_service;
/// Live field schedule WebSocket sessions.
pub mod websocket_service;
