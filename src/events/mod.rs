use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
pub mod repo_types;
pub mod rules;
pub mod services;
pub mod store;

pub use repo::PgEventStore;
pub use store::EventStore;

pub fn router() -> Router<AppState> {
    handlers::event_routes()
}
