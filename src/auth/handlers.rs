use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, is_valid_email, verify_password, MIN_PASSWORD_LEN},
        repo_types::User,
    },
    profiles::repo::is_unique_violation,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn issue_tokens(keys: &JwtKeys, user: User) -> Result<AuthResponse, (StatusCode, String)> {
    let access_token = keys.sign_access(user.id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        internal(e)
    })?;
    let refresh_token = keys.sign_refresh(user.id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        internal(e)
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    })
}

/// Trims optional profile fields; blank becomes `None`.
fn optional(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    // Ensure email is not taken
    match User::find_by_email(&state.db, &payload.email).await {
        Ok(None) => {}
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err((StatusCode::CONFLICT, "Email already registered".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to check email".into()));
        }
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        internal(e)
    })?;

    let user = User::create_with_profile(
        &state.db,
        &payload.email,
        &hash,
        optional(&payload.full_name),
        optional(&payload.username),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            warn!(email = %payload.email, "email or username already taken");
            return (StatusCode::CONFLICT, "Email or username already taken".to_string());
        }
        error!(error = %e, "create user failed");
        internal(e)
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal(e));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        internal(e)
    })?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(issue_tokens(&keys, user)?))
}

/// Session lookup for the current bearer token.
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "user lookup failed");
            internal(e)
        })?
        .ok_or_else(|| {
            warn!(user_id = %user_id, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}
