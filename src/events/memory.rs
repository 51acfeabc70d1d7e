use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::EventError;
use super::repo_types::{Event, EventDraft, EventListing, EventParticipant, ParticipantView};
use super::rules::{self, Participation};
use super::store::EventStore;

/// In-process store for tests. The mutex plays the role of the row lock.
#[derive(Default)]
pub struct MemoryEventStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    events: Vec<Event>,
    participants: Vec<EventParticipant>,
}

impl Tables {
    fn participation(&self, event_id: Uuid, viewer: Uuid) -> Participation {
        let active = self
            .participants
            .iter()
            .filter(|p| p.event_id == event_id && p.is_active());
        let mut out = Participation::default();
        for p in active {
            out.active_count += 1;
            out.viewer_joined |= p.user_id == viewer;
        }
        out
    }

    fn event_mut(&mut self, id: Uuid) -> Result<&mut Event, EventError> {
        self.events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EventError::NotFound(id))
    }
}

impl MemoryEventStore {
    /// Inserts a fully formed event, bypassing validation.
    pub async fn insert(&self, event: Event) {
        self.inner.lock().await.events.push(event);
    }

    pub async fn participant_rows(&self, event_id: Uuid) -> Vec<EventParticipant> {
        self.inner
            .lock()
            .await
            .participants
            .iter()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect()
    }
}

fn listing(event: &Event) -> EventListing {
    EventListing {
        event: event.clone(),
        organizer_name: None,
    }
}

fn apply_draft(event: &mut Event, draft: &EventDraft) {
    // Mirrors the UPDATE in the Postgres store.
    event.title = draft.title.clone();
    event.description = draft.description.clone();
    event.sport_type = draft.sport_type;
    event.location_lat = draft.location_lat;
    event.location_lng = draft.location_lng;
    event.location_name = draft.location_name.clone();
    event.location_address = draft.location_address.clone();
    event.event_time = draft.event_time;
    event.end_time = draft.end_time;
    event.min_players = draft.min_players;
    event.max_players = draft.max_players;
    event.skill_level = draft.skill_level;
    event.notes = draft.notes.clone();
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn create_event(&self, organizer_id: Uuid, draft: &EventDraft) -> Result<Event, EventError> {
        let now = OffsetDateTime::now_utc();
        let draft = draft.clone();
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id,
            title: draft.title,
            description: draft.description,
            sport_type: draft.sport_type,
            location_lat: draft.location_lat,
            location_lng: draft.location_lng,
            location_name: draft.location_name,
            location_address: draft.location_address,
            event_time: draft.event_time,
            end_time: draft.end_time,
            min_players: draft.min_players,
            max_players: draft.max_players,
            skill_level: draft.skill_level,
            notes: draft.notes,
            is_cancelled: false,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.events.push(event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<EventListing>, EventError> {
        let tables = self.inner.lock().await;
        Ok(tables.events.iter().find(|e| e.id == id).map(listing))
    }

    async fn update_event(&self, id: Uuid, draft: &EventDraft) -> Result<Event, EventError> {
        let mut tables = self.inner.lock().await;
        tables.event_mut(id)?;
        let active = tables.participation(id, Uuid::nil()).active_count;
        rules::check_capacity_floor(draft.max_players, active)?;
        let event = tables.event_mut(id)?;
        apply_draft(event, draft);
        event.updated_at = OffsetDateTime::now_utc();
        Ok(event.clone())
    }

    async fn cancel_event(&self, id: Uuid, reason: Option<String>) -> Result<Event, EventError> {
        let mut tables = self.inner.lock().await;
        let event = tables.event_mut(id)?;
        if event.is_cancelled {
            return Err(EventError::Cancelled);
        }
        event.is_cancelled = true;
        event.cancellation_reason = reason;
        event.updated_at = OffsetDateTime::now_utc();
        Ok(event.clone())
    }

    async fn list_upcoming(&self, now: OffsetDateTime) -> Result<Vec<EventListing>, EventError> {
        let tables = self.inner.lock().await;
        let mut rows: Vec<EventListing> = tables
            .events
            .iter()
            .filter(|e| rules::is_listed(e, now))
            .map(listing)
            .collect();
        rows.sort_by_key(|l| l.event.event_time);
        Ok(rows)
    }

    async fn list_organized(&self, organizer_id: Uuid, now: OffsetDateTime) -> Result<Vec<Event>, EventError> {
        let tables = self.inner.lock().await;
        let mut rows: Vec<Event> = tables
            .events
            .iter()
            .filter(|e| e.organizer_id == organizer_id && e.event_time >= now)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.event_time);
        Ok(rows)
    }

    async fn list_joined(&self, user_id: Uuid, now: OffsetDateTime) -> Result<Vec<Event>, EventError> {
        let tables = self.inner.lock().await;
        let mut rows: Vec<Event> = tables
            .events
            .iter()
            .filter(|e| e.event_time >= now && tables.participation(e.id, user_id).viewer_joined)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.event_time);
        Ok(rows)
    }

    async fn participation(
        &self,
        event_ids: &[Uuid],
        viewer: Uuid,
    ) -> Result<HashMap<Uuid, Participation>, EventError> {
        let tables = self.inner.lock().await;
        Ok(event_ids
            .iter()
            .map(|id| (*id, tables.participation(*id, viewer)))
            .collect())
    }

    async fn active_participants(&self, event_id: Uuid) -> Result<Vec<ParticipantView>, EventError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .participants
            .iter()
            .filter(|p| p.event_id == event_id && p.is_active())
            .map(|p| ParticipantView {
                participant: p.clone(),
                full_name: None,
                username: None,
            })
            .collect())
    }

    async fn join(&self, event_id: Uuid, user_id: Uuid, now: OffsetDateTime) -> Result<EventParticipant, EventError> {
        let mut tables = self.inner.lock().await;
        let event = tables.event_mut(event_id)?.clone();
        let participation = tables.participation(event_id, user_id);
        rules::check_join(&event, &participation, user_id)?;

        let row = EventParticipant {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            joined_at: now,
            left_at: None,
            is_organizer: false,
        };
        tables.participants.push(row.clone());
        Ok(row)
    }

    async fn leave(&self, event_id: Uuid, user_id: Uuid, now: OffsetDateTime) -> Result<EventParticipant, EventError> {
        let mut tables = self.inner.lock().await;
        let row = tables
            .participants
            .iter_mut()
            .find(|p| p.event_id == event_id && p.user_id == user_id && p.is_active())
            .ok_or(EventError::NotParticipant)?;
        row.left_at = Some(now);
        Ok(row.clone())
    }
}
