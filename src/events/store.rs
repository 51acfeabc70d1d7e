use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::EventError;
use super::repo_types::{Event, EventDraft, EventListing, EventParticipant, ParticipantView};
use super::rules::Participation;

/// Row access for the `events` and `event_participants` collections.
///
/// `join` and `leave` must check membership rules and write in one atomic
/// step so that concurrent joins cannot overbook an event.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, organizer_id: Uuid, draft: &EventDraft) -> Result<Event, EventError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<EventListing>, EventError>;

    /// Writes an organizer edit. Refuses with `InvalidInput` when the new
    /// `max_players` is below the active count, checked under the same lock
    /// as `join`.
    async fn update_event(&self, id: Uuid, draft: &EventDraft) -> Result<Event, EventError>;

    /// Sets the cancellation flag. Fails with `Cancelled` if already set.
    async fn cancel_event(&self, id: Uuid, reason: Option<String>) -> Result<Event, EventError>;

    /// Not cancelled, starting at or after `now`, ascending by start time.
    async fn list_upcoming(&self, now: OffsetDateTime) -> Result<Vec<EventListing>, EventError>;

    async fn list_organized(&self, organizer_id: Uuid, now: OffsetDateTime) -> Result<Vec<Event>, EventError>;

    /// Upcoming events where the user holds an active participant row.
    async fn list_joined(&self, user_id: Uuid, now: OffsetDateTime) -> Result<Vec<Event>, EventError>;

    /// Participation counted from active rows, keyed by event id. Events
    /// without active rows map to the default snapshot.
    async fn participation(
        &self,
        event_ids: &[Uuid],
        viewer: Uuid,
    ) -> Result<HashMap<Uuid, Participation>, EventError>;

    async fn active_participants(&self, event_id: Uuid) -> Result<Vec<ParticipantView>, EventError>;

    async fn join(&self, event_id: Uuid, user_id: Uuid, now: OffsetDateTime) -> Result<EventParticipant, EventError>;

    /// Stamps `left_at` on the user's active row; the row itself is kept.
    async fn leave(&self, event_id: Uuid, user_id: Uuid, now: OffsetDateTime) -> Result<EventParticipant, EventError>;
}
