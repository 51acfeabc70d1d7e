use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::repo_types::{EventListing, EventParticipant, ParticipantView, SkillLevel, SportType};

/// Query string of `GET /events`. `sport` and `skill` accept `all`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sport: Option<String>,
    pub skill: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub sport_type: SportType,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub location_name: String,
    pub location_address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub event_time: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    pub skill_level: Option<SkillLevel>,
    pub notes: Option<String>,
}

/// Present-but-null becomes `Some(None)`; absent stays `None` via `default`.
fn nullable<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

fn nullable_rfc3339<'de, D>(d: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(d).map(Some)
}

/// Organizer edit. Absent fields keep their current value; an explicit
/// `null` clears `end_time` or `max_players`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sport_type: Option<SportType>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub event_time: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "nullable_rfc3339")]
    pub end_time: Option<Option<OffsetDateTime>>,
    pub min_players: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub max_players: Option<Option<i32>>,
    pub skill_level: Option<SkillLevel>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Event as shown to one viewer.
#[derive(Debug, Serialize)]
pub struct EventSummary {
    #[serde(flatten)]
    pub listing: EventListing,
    pub participant_count: i64,
    pub is_joined: bool,
    pub is_organizer: bool,
    pub can_join: bool,
}

#[derive(Debug, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub summary: EventSummary,
    pub participants: Vec<ParticipantView>,
}

#[derive(Debug, Serialize)]
pub struct ParticipationResponse {
    pub participant: EventParticipant,
    pub participant_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let absent: UpdateEventRequest = serde_json::from_str(r#"{ "title": "Late Run" }"#).unwrap();
        assert_eq!(absent.max_players, None);
        assert_eq!(absent.end_time, None);

        let cleared: UpdateEventRequest =
            serde_json::from_str(r#"{ "max_players": null, "end_time": null }"#).unwrap();
        assert_eq!(cleared.max_players, Some(None));
        assert_eq!(cleared.end_time, Some(None));

        let set: UpdateEventRequest = serde_json::from_str(
            r#"{ "max_players": 8, "end_time": "2030-05-01T18:00:00Z" }"#,
        )
        .unwrap();
        assert_eq!(set.max_players, Some(Some(8)));
        assert_eq!(set.end_time.flatten().map(|t| t.hour()), Some(18));
    }
}
