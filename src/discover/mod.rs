//! Trekkie: static food, entertainment and culture suggestions.

use crate::state::AppState;
use axum::Router;

pub mod catalog;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::discover_routes()
}
