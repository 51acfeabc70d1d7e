use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Failures of event operations.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event not found: {0}")]
    NotFound(Uuid),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("only the organizer may {action} this event")]
    NotOrganizer { action: &'static str },

    #[error("user is already an active participant")]
    AlreadyJoined,

    #[error("organizer cannot join their own event")]
    OrganizerJoin,

    #[error("event is full ({max} players)")]
    Full { max: i32 },

    #[error("user is not an active participant")]
    NotParticipant,

    #[error("event is cancelled")]
    Cancelled,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EventError {
    /// Maps to an HTTP rejection. Membership refusals all share one
    /// caller-facing message; the specific reason only goes to the log.
    pub fn into_rejection(self, failure: &str) -> (StatusCode, String) {
        match self {
            EventError::NotFound(_) => (StatusCode::NOT_FOUND, "Event not found".into()),
            EventError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            EventError::NotOrganizer { .. } => (StatusCode::FORBIDDEN, failure.into()),
            EventError::AlreadyJoined
            | EventError::OrganizerJoin
            | EventError::Full { .. }
            | EventError::NotParticipant
            | EventError::Cancelled => (StatusCode::CONFLICT, failure.into()),
            EventError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, failure.into()),
        }
    }
}
