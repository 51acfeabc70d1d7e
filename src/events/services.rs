use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{
    CreateEventRequest, EventDetails, EventSummary, ParticipationResponse, UpdateEventRequest,
};
use super::error::EventError;
use super::repo_types::{Event, EventDraft, EventListing, SkillLevel};
use super::rules::{self, EventFilter, Participation};
use super::store::EventStore;
use crate::config::DefaultLocation;

const DEFAULT_MIN_PLAYERS: i32 = 2;

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn summarize(listing: EventListing, p: Participation, viewer: Uuid) -> EventSummary {
    let is_organizer = rules::is_organizer(&listing.event, viewer);
    let can_join = rules::can_join(&listing.event, &p, viewer);
    EventSummary {
        listing,
        participant_count: p.active_count,
        is_joined: p.viewer_joined,
        is_organizer,
        can_join,
    }
}

async fn load(store: &dyn EventStore, id: Uuid) -> Result<EventListing, EventError> {
    store.find_event(id).await?.ok_or(EventError::NotFound(id))
}

async fn count_active(store: &dyn EventStore, event_id: Uuid, viewer: Uuid) -> Result<Participation, EventError> {
    let mut snapshot = store.participation(&[event_id], viewer).await?;
    Ok(snapshot.remove(&event_id).unwrap_or_default())
}

/// Upcoming, non-cancelled events matching `filter`, soonest first.
pub async fn list_events(
    store: &dyn EventStore,
    viewer: Uuid,
    filter: &EventFilter,
    now: OffsetDateTime,
) -> Result<Vec<EventSummary>, EventError> {
    let listings: Vec<EventListing> = store
        .list_upcoming(now)
        .await?
        .into_iter()
        .filter(|l| filter.matches(&l.event))
        .collect();

    let ids: Vec<Uuid> = listings.iter().map(|l| l.event.id).collect();
    let mut participation = store.participation(&ids, viewer).await?;

    Ok(listings
        .into_iter()
        .map(|l| {
            let p = participation.remove(&l.event.id).unwrap_or_default();
            summarize(l, p, viewer)
        })
        .collect())
}

pub async fn event_details(store: &dyn EventStore, viewer: Uuid, id: Uuid) -> Result<EventDetails, EventError> {
    let listing = load(store, id).await?;
    let participants = store.active_participants(id).await?;
    let p = count_active(store, id, viewer).await?;
    Ok(EventDetails {
        summary: summarize(listing, p, viewer),
        participants,
    })
}

pub async fn create_event(
    store: &dyn EventStore,
    defaults: DefaultLocation,
    organizer_id: Uuid,
    req: CreateEventRequest,
) -> Result<Event, EventError> {
    let draft = EventDraft {
        title: req.title.trim().to_string(),
        description: blank_to_none(req.description),
        sport_type: req.sport_type,
        location_lat: req.location_lat.unwrap_or(defaults.lat),
        location_lng: req.location_lng.unwrap_or(defaults.lng),
        location_name: req.location_name.trim().to_string(),
        location_address: blank_to_none(req.location_address),
        event_time: req.event_time,
        end_time: req.end_time,
        // A small cap pulls the default down with it.
        min_players: req
            .min_players
            .unwrap_or_else(|| req.max_players.map_or(DEFAULT_MIN_PLAYERS, |m| m.min(DEFAULT_MIN_PLAYERS))),
        max_players: req.max_players,
        skill_level: req.skill_level.unwrap_or(SkillLevel::AllWelcome),
        notes: blank_to_none(req.notes),
    };
    rules::validate_draft(&draft)?;

    let event = store.create_event(organizer_id, &draft).await?;
    info!(event_id = %event.id, %organizer_id, sport = %event.sport_type, "event created");
    Ok(event)
}

pub async fn update_event(
    store: &dyn EventStore,
    user_id: Uuid,
    id: Uuid,
    req: UpdateEventRequest,
) -> Result<Event, EventError> {
    let current = load(store, id).await?.event;
    rules::check_edit(&current, user_id)?;

    let mut draft = EventDraft::from(&current);
    if let Some(title) = req.title {
        draft.title = title.trim().to_string();
    }
    if req.description.is_some() {
        draft.description = blank_to_none(req.description);
    }
    if let Some(sport) = req.sport_type {
        draft.sport_type = sport;
    }
    if let Some(lat) = req.location_lat {
        draft.location_lat = lat;
    }
    if let Some(lng) = req.location_lng {
        draft.location_lng = lng;
    }
    if let Some(name) = req.location_name {
        draft.location_name = name.trim().to_string();
    }
    if req.location_address.is_some() {
        draft.location_address = blank_to_none(req.location_address);
    }
    if let Some(t) = req.event_time {
        draft.event_time = t;
    }
    if let Some(end) = req.end_time {
        draft.end_time = end;
    }
    if let Some(min) = req.min_players {
        draft.min_players = min;
    }
    if let Some(max) = req.max_players {
        draft.max_players = max;
    }
    if let Some(skill) = req.skill_level {
        draft.skill_level = skill;
    }
    if req.notes.is_some() {
        draft.notes = blank_to_none(req.notes);
    }
    rules::validate_draft(&draft)?;

    let event = store.update_event(id, &draft).await.map_err(|e| {
        warn!(event_id = %id, %user_id, reason = %e, "edit refused");
        e
    })?;
    info!(event_id = %id, %user_id, "event updated");
    Ok(event)
}

pub async fn join_event(
    store: &dyn EventStore,
    user_id: Uuid,
    id: Uuid,
    now: OffsetDateTime,
) -> Result<ParticipationResponse, EventError> {
    let participant = store.join(id, user_id, now).await.map_err(|e| {
        warn!(event_id = %id, %user_id, reason = %e, "join refused");
        e
    })?;
    let p = count_active(store, id, user_id).await?;
    info!(event_id = %id, %user_id, active = p.active_count, "joined event");
    Ok(ParticipationResponse {
        participant,
        participant_count: p.active_count,
    })
}

pub async fn leave_event(
    store: &dyn EventStore,
    user_id: Uuid,
    id: Uuid,
    now: OffsetDateTime,
) -> Result<ParticipationResponse, EventError> {
    load(store, id).await?;
    let participant = store.leave(id, user_id, now).await.map_err(|e| {
        warn!(event_id = %id, %user_id, reason = %e, "leave refused");
        e
    })?;
    let p = count_active(store, id, user_id).await?;
    info!(event_id = %id, %user_id, active = p.active_count, "left event");
    Ok(ParticipationResponse {
        participant,
        participant_count: p.active_count,
    })
}

pub async fn cancel_event(
    store: &dyn EventStore,
    user_id: Uuid,
    id: Uuid,
    reason: Option<String>,
) -> Result<Event, EventError> {
    let current = load(store, id).await?.event;
    if let Err(e) = rules::check_cancel(&current, user_id) {
        warn!(event_id = %id, %user_id, reason = %e, "cancel refused");
        return Err(e);
    }
    let event = store.cancel_event(id, rules::normalize_reason(reason)).await?;
    info!(event_id = %id, %user_id, "event cancelled");
    Ok(event)
}
