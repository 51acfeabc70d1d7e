//! Membership, capacity and listing rules for events.
//!
//! Everything here is pure: callers load the event and a fresh
//! [`Participation`] snapshot (counted from active rows, never cached) and
//! ask whether an operation is allowed.

use time::OffsetDateTime;
use uuid::Uuid;

use super::error::EventError;
use super::repo_types::{Event, EventDraft, SkillLevel, SportType};

/// Active participation of one event as seen by one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Participation {
    pub active_count: i64,
    pub viewer_joined: bool,
}

pub fn is_organizer(event: &Event, user_id: Uuid) -> bool {
    event.organizer_id == user_id
}

/// True while another active participant fits under `max_players`.
pub fn has_capacity(max_players: Option<i32>, active_count: i64) -> bool {
    match max_players {
        Some(max) => active_count < i64::from(max),
        None => true,
    }
}

pub fn check_join(event: &Event, p: &Participation, user_id: Uuid) -> Result<(), EventError> {
    if is_organizer(event, user_id) {
        return Err(EventError::OrganizerJoin);
    }
    if p.viewer_joined {
        return Err(EventError::AlreadyJoined);
    }
    if !has_capacity(event.max_players, p.active_count) {
        return Err(EventError::Full {
            max: event.max_players.unwrap_or_default(),
        });
    }
    Ok(())
}

pub fn can_join(event: &Event, p: &Participation, user_id: Uuid) -> bool {
    check_join(event, p, user_id).is_ok()
}

pub fn check_cancel(event: &Event, user_id: Uuid) -> Result<(), EventError> {
    if !is_organizer(event, user_id) {
        return Err(EventError::NotOrganizer { action: "cancel" });
    }
    if event.is_cancelled {
        return Err(EventError::Cancelled);
    }
    Ok(())
}

pub fn check_edit(event: &Event, user_id: Uuid) -> Result<(), EventError> {
    if !is_organizer(event, user_id) {
        return Err(EventError::NotOrganizer { action: "edit" });
    }
    if event.is_cancelled {
        return Err(EventError::Cancelled);
    }
    Ok(())
}

/// An edit may not lower `max_players` under the players already in.
pub fn check_capacity_floor(max_players: Option<i32>, active_count: i64) -> Result<(), EventError> {
    match max_players {
        Some(max) if i64::from(max) < active_count => Err(EventError::InvalidInput(format!(
            "max_players must not be below the {} players already joined",
            active_count
        ))),
        _ => Ok(()),
    }
}

/// Blank reasons are stored as null.
pub fn normalize_reason(reason: Option<String>) -> Option<String> {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

pub fn validate_draft(draft: &EventDraft) -> Result<(), EventError> {
    if draft.title.trim().is_empty() {
        return Err(EventError::InvalidInput("title is required".into()));
    }
    if draft.location_name.trim().is_empty() {
        return Err(EventError::InvalidInput("location name is required".into()));
    }
    if !(-90.0..=90.0).contains(&draft.location_lat) || !(-180.0..=180.0).contains(&draft.location_lng) {
        return Err(EventError::InvalidInput("coordinates out of range".into()));
    }
    if draft.min_players < 1 {
        return Err(EventError::InvalidInput("min_players must be at least 1".into()));
    }
    if let Some(max) = draft.max_players {
        if max < draft.min_players {
            return Err(EventError::InvalidInput(
                "max_players must not be below min_players".into(),
            ));
        }
    }
    if let Some(end) = draft.end_time {
        if end <= draft.event_time {
            return Err(EventError::InvalidInput("end_time must be after event_time".into()));
        }
    }
    Ok(())
}

/// Listed events are upcoming and not cancelled.
pub fn is_listed(event: &Event, now: OffsetDateTime) -> bool {
    !event.is_cancelled && event.event_time >= now
}

/// Listing filter: search AND sport AND skill. `None` is the "all" wildcard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    /// Lowercased, trimmed; empty matches everything.
    pub search: String,
    pub sport: Option<SportType>,
    pub skill: Option<SkillLevel>,
}

impl EventFilter {
    pub fn new(search: Option<&str>, sport: Option<&str>, skill: Option<&str>) -> Result<Self, EventError> {
        Ok(Self {
            search: search.map(|s| s.trim().to_lowercase()).unwrap_or_default(),
            sport: parse_choice(sport).map_err(EventError::InvalidInput)?,
            skill: parse_choice(skill).map_err(EventError::InvalidInput)?,
        })
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.matches_search(event)
            && self.sport.map_or(true, |s| event.sport_type == s)
            && self.skill.map_or(true, |s| event.skill_level == s)
    }

    fn matches_search(&self, event: &Event) -> bool {
        if self.search.is_empty() {
            return true;
        }
        event.title.to_lowercase().contains(&self.search)
            || event.location_name.to_lowercase().contains(&self.search)
    }
}

fn parse_choice<T>(raw: Option<&str>) -> Result<Option<T>, String>
where
    T: std::str::FromStr<Err = String>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => v.parse::<T>().map(Some),
    }
}
