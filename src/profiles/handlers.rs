use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::dto::{ProfileOverview, SportPreferenceRequest, UpdateProfileRequest};
use super::repo::is_unique_violation;
use super::repo_types::{Profile, SportPreference};
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/sports", get(list_sports).put(upsert_sport))
}

fn internal(e: impl std::fmt::Display) -> (StatusCode, String) {
    error!(error = %e, "profile request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile".into())
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileOverview>, (StatusCode, String)> {
    let profile = Profile::find(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Profile not found".to_string()))?;

    let now = OffsetDateTime::now_utc();
    let organized_events = state
        .events
        .list_organized(user_id, now)
        .await
        .map_err(internal)?;
    let joined_events = state
        .events
        .list_joined(user_id, now)
        .await
        .map_err(internal)?;
    let sport_preferences = SportPreference::list_for_user(&state.db, user_id)
        .await
        .map_err(internal)?;

    Ok(Json(ProfileOverview {
        profile,
        organized_events,
        joined_events,
        sport_preferences,
    }))
}

#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, (StatusCode, String)> {
    let changes = body.into_changes().map_err(|msg| {
        warn!(%user_id, %msg, "profile update rejected");
        (StatusCode::BAD_REQUEST, msg)
    })?;

    let profile = match Profile::update(&state.db, user_id, &changes).await {
        Ok(Some(p)) => p,
        Ok(None) => return Err((StatusCode::NOT_FOUND, "Profile not found".into())),
        Err(e) if is_unique_violation(&e) => {
            warn!(%user_id, "username already taken");
            return Err((StatusCode::CONFLICT, "Username already taken".into()));
        }
        Err(e) => {
            error!(error = %e, %user_id, "profile update failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to save profile".into()));
        }
    };

    info!(%user_id, "profile updated");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn list_sports(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<SportPreference>>, (StatusCode, String)> {
    let rows = SportPreference::list_for_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(rows))
}

#[instrument(skip(state, body))]
pub async fn upsert_sport(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SportPreferenceRequest>,
) -> Result<Json<SportPreference>, (StatusCode, String)> {
    let row = SportPreference::upsert(&state.db, user_id, body.sport_type, body.skill_level)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "sport preference upsert failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save preference".to_string())
        })?;
    info!(%user_id, sport = %row.sport_type, skill = %row.skill_level, "sport preference saved");
    Ok(Json(row))
}
