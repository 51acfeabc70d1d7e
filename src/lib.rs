pub mod app;
pub mod auth;
pub mod config;
pub mod discover;
pub mod events;
pub mod profiles;
pub mod state;
