pub mod event;
pub mod health;
pub mod schedule;
pub mod validation;
pub mod ws;
