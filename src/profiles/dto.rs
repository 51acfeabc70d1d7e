use serde::{Deserialize, Serialize};

use super::repo_types::{Profile, ProfileChanges, SportPreference};
use crate::events::repo_types::{Event, SkillLevel, SportType};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location_name: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
}

impl UpdateProfileRequest {
    /// Trims text fields. An empty username is refused; other blank
    /// fields are stored as given so they can be cleared.
    pub fn into_changes(self) -> Result<ProfileChanges, String> {
        let username = match self.username.map(|u| u.trim().to_string()) {
            Some(u) if u.is_empty() => return Err("username must not be empty".into()),
            Some(u) if u.chars().any(char::is_whitespace) => {
                return Err("username must not contain spaces".into())
            }
            other => other,
        };
        if let Some(lat) = self.location_lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err("location_lat out of range".into());
            }
        }
        if let Some(lng) = self.location_lng {
            if !(-180.0..=180.0).contains(&lng) {
                return Err("location_lng out of range".into());
            }
        }
        Ok(ProfileChanges {
            full_name: self.full_name.map(|s| s.trim().to_string()),
            username,
            bio: self.bio.map(|s| s.trim().to_string()),
            avatar_url: self.avatar_url.map(|s| s.trim().to_string()),
            location_name: self.location_name.map(|s| s.trim().to_string()),
            location_lat: self.location_lat,
            location_lng: self.location_lng,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SportPreferenceRequest {
    pub sport_type: SportType,
    #[serde(default)]
    pub skill_level: SkillLevel,
}

/// Everything the profile page shows.
#[derive(Debug, Serialize)]
pub struct ProfileOverview {
    pub profile: Profile,
    pub organized_events: Vec<Event>,
    pub joined_events: Vec<Event>,
    pub sport_preferences: Vec<SportPreference>,
}
