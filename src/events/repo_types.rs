use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Sport category of an event. Stored as the `sport_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "sport_type", rename_all = "snake_case")]
pub enum SportType {
    Basketball,
    Baseball,
    Football,
    Soccer,
    Hockey,
    Volleyball,
    Tennis,
    UltimateFrisbee,
    Kickball,
    Softball,
    Tag,
    Other,
}

impl SportType {
    pub const ALL: [SportType; 12] = [
        SportType::Basketball,
        SportType::Baseball,
        SportType::Football,
        SportType::Soccer,
        SportType::Hockey,
        SportType::Volleyball,
        SportType::Tennis,
        SportType::UltimateFrisbee,
        SportType::Kickball,
        SportType::Softball,
        SportType::Tag,
        SportType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SportType::Basketball => "basketball",
            SportType::Baseball => "baseball",
            SportType::Football => "football",
            SportType::Soccer => "soccer",
            SportType::Hockey => "hockey",
            SportType::Volleyball => "volleyball",
            SportType::Tennis => "tennis",
            SportType::UltimateFrisbee => "ultimate_frisbee",
            SportType::Kickball => "kickball",
            SportType::Softball => "softball",
            SportType::Tag => "tag",
            SportType::Other => "other",
        }
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SportType::ALL
            .into_iter()
            .find(|sport| sport.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sport type: {}", s))
    }
}

/// Expected player ability. Stored as the `skill_level` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "skill_level", rename_all = "snake_case")]
pub enum SkillLevel {
    #[default]
    AllWelcome,
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::AllWelcome,
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::AllWelcome => "all_welcome",
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SkillLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown skill level: {}", s))
    }
}

/// Event record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub sport_type: SportType,
    pub location_lat: f64,
    pub location_lng: f64,
    pub location_name: String,
    pub location_address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub min_players: i32,
    pub max_players: Option<i32>,
    pub skill_level: SkillLevel,
    pub notes: Option<String>,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Event joined with its organizer's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub organizer_name: Option<String>,
}

/// Participation row. `left_at` is null while the participant is active.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventParticipant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub left_at: Option<OffsetDateTime>,
    pub is_organizer: bool,
}

impl EventParticipant {
    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }
}

/// Active participant with the public part of their profile.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParticipantView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub participant: EventParticipant,
    pub full_name: Option<String>,
    pub username: Option<String>,
}

/// Writable fields of an event, used for both create and organizer edits.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub sport_type: SportType,
    pub location_lat: f64,
    pub location_lng: f64,
    pub location_name: String,
    pub location_address: Option<String>,
    pub event_time: OffsetDateTime,
    pub end_time: Option<OffsetDateTime>,
    pub min_players: i32,
    pub max_players: Option<i32>,
    pub skill_level: SkillLevel,
    pub notes: Option<String>,
}

impl From<&Event> for EventDraft {
    fn from(e: &Event) -> Self {
        Self {
            title: e.title.clone(),
            description: e.description.clone(),
            sport_type: e.sport_type,
            location_lat: e.location_lat,
            location_lng: e.location_lng,
            location_name: e.location_name.clone(),
            location_address: e.location_address.clone(),
            event_time: e.event_time,
            end_time: e.end_time,
            min_players: e.min_players,
            max_players: e.max_players,
            skill_level: e.skill_level,
            notes: e.notes.clone(),
        }
    }
}
