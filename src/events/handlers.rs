use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument};
use uuid::Uuid;

use super::dto::{
    CancelRequest, CreateEventRequest, EventDetails, EventSummary, ListQuery,
    ParticipationResponse, UpdateEventRequest,
};
use super::error::EventError;
use super::repo_types::Event;
use super::rules::EventFilter;
use super::services;
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event).put(update_event))
        .route("/events/:id/join", post(join_event))
        .route("/events/:id/leave", post(leave_event))
        .route("/events/:id/cancel", post(cancel_event))
}

fn reject(failure: &'static str) -> impl FnOnce(EventError) -> (StatusCode, String) {
    move |e| {
        if let EventError::Database(ref db) = e {
            error!(error = %db, failure, "event store failed");
        }
        e.into_rejection(failure)
    }
}

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<EventSummary>>, (StatusCode, String)> {
    let filter = EventFilter::new(q.search.as_deref(), q.sport.as_deref(), q.skill.as_deref())
        .map_err(reject("Invalid filter"))?;
    let events = services::list_events(state.events.as_ref(), user_id, &filter, OffsetDateTime::now_utc())
        .await
        .map_err(reject("Failed to load events"))?;
    Ok(Json(events))
}

#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetails>, (StatusCode, String)> {
    let details = services::event_details(state.events.as_ref(), user_id, id)
        .await
        .map_err(reject("Failed to load event"))?;
    Ok(Json(details))
}

#[instrument(skip(state, body))]
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Event>), (StatusCode, String)> {
    let event = services::create_event(
        state.events.as_ref(),
        state.config.default_location,
        user_id,
        body,
    )
    .await
    .map_err(reject("Failed to create event"))?;

    let location = format!("/api/v1/events/{}", event.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(event)))
}

#[instrument(skip(state, body))]
pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<Event>, (StatusCode, String)> {
    let event = services::update_event(state.events.as_ref(), user_id, id, body)
        .await
        .map_err(reject("Failed to update event"))?;
    Ok(Json(event))
}

#[instrument(skip(state))]
pub async fn join_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ParticipationResponse>, (StatusCode, String)> {
    let res = services::join_event(state.events.as_ref(), user_id, id, OffsetDateTime::now_utc())
        .await
        .map_err(reject("Failed to join event"))?;
    Ok(Json(res))
}

#[instrument(skip(state))]
pub async fn leave_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ParticipationResponse>, (StatusCode, String)> {
    let res = services::leave_event(state.events.as_ref(), user_id, id, OffsetDateTime::now_utc())
        .await
        .map_err(reject("Failed to leave event"))?;
    Ok(Json(res))
}

/// Body is optional; `{ "reason": "..." }` records why.
#[instrument(skip(state, body))]
pub async fn cancel_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelRequest>>,
) -> Result<Json<Event>, (StatusCode, String)> {
    let reason = body.and_then(|Json(b)| b.reason);
    let event = services::cancel_event(state.events.as_ref(), user_id, id, reason)
        .await
        .map_err(reject("Failed to cancel event"))?;
    Ok(Json(event))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::FromRef,
        http::Request,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::*;
    use crate::auth::jwt::JwtKeys;
    use crate::events::memory::MemoryEventStore;

    fn app() -> (Router, JwtKeys) {
        let state = AppState::fake_with_events(Arc::new(MemoryEventStore::default()));
        let keys = JwtKeys::from_ref(&state);
        (event_routes().with_state(state), keys)
    }

    fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn new_event(title: &str, max_players: Option<i32>) -> Value {
        let start = OffsetDateTime::now_utc() + time::Duration::days(1);
        json!({
            "title": title,
            "sport_type": "basketball",
            "location_name": "Mission Rec Center",
            "event_time": start.format(&time::format_description::well_known::Rfc3339).unwrap(),
            "max_players": max_players,
        })
    }

    #[tokio::test]
    async fn requests_without_token_are_unauthorized() {
        let (app, _) = app();
        let res = app
            .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_join_and_fill_event() {
        let (app, keys) = app();
        let organizer = keys.sign_access(Uuid::new_v4()).unwrap();
        let player = keys.sign_access(Uuid::new_v4()).unwrap();
        let latecomer = keys.sign_access(Uuid::new_v4()).unwrap();

        let res = app
            .clone()
            .oneshot(request("POST", "/events", &organizer, Some(new_event("Pickup Basketball", Some(1)))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = json_body(res).await;
        let id = created["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(request("POST", &format!("/events/{}/join", id), &player, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["participant_count"], 1);

        let res = app
            .clone()
            .oneshot(request("POST", &format!("/events/{}/join", id), &latecomer, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = app
            .oneshot(request("GET", &format!("/events/{}", id), &latecomer, None))
            .await
            .unwrap();
        let details = json_body(res).await;
        assert_eq!(details["can_join"], false);
        assert_eq!(details["participants"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancel_hides_event_from_listing() {
        let (app, keys) = app();
        let organizer = keys.sign_access(Uuid::new_v4()).unwrap();
        let stranger = keys.sign_access(Uuid::new_v4()).unwrap();

        let res = app
            .clone()
            .oneshot(request("POST", "/events", &organizer, Some(new_event("Evening Soccer", None))))
            .await
            .unwrap();
        let id = json_body(res).await["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(request("POST", &format!("/events/{}/cancel", id), &stranger, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/events/{}/cancel", id),
                &organizer,
                Some(json!({ "reason": "Field closed" })),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cancelled = json_body(res).await;
        assert_eq!(cancelled["is_cancelled"], true);
        assert_eq!(cancelled["cancellation_reason"], "Field closed");

        let res = app
            .oneshot(request("GET", "/events?sport=all&skill=all", &stranger, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(json_body(res).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let (app, keys) = app();
        let token = keys.sign_access(Uuid::new_v4()).unwrap();
        let res = app
            .oneshot(request("GET", &format!("/events/{}", Uuid::new_v4()), &token, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_filter_is_bad_request() {
        let (app, keys) = app();
        let token = keys.sign_access(Uuid::new_v4()).unwrap();
        let res = app
            .oneshot(request("GET", "/events?sport=quidditch", &token, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
