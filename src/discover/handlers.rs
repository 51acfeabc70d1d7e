use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::catalog::{normalize_location, suggestions_for, Category, Suggestion, GPS_FIX};
use crate::state::AppState;

pub fn discover_routes() -> Router<AppState> {
    Router::new()
        .route("/discover/suggestions", get(suggestions))
        .route("/discover/locate", get(locate))
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    pub location: Option<String>,
    #[serde(default)]
    pub category: Category,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub location: Option<String>,
    pub category: Category,
    pub suggestions: Vec<&'static Suggestion>,
}

#[derive(Debug, Serialize)]
pub struct LocateResponse {
    pub location: &'static str,
}

#[instrument]
pub async fn suggestions(Query(q): Query<SuggestionQuery>) -> Json<SuggestionResponse> {
    let location = normalize_location(q.location.as_deref());
    // Nothing to explore until a place has been entered.
    let suggestions = match location {
        Some(_) => suggestions_for(q.category),
        None => Vec::new(),
    };
    debug!(?location, category = ?q.category, count = suggestions.len(), "suggestions served");
    Json(SuggestionResponse {
        location,
        category: q.category,
        suggestions,
    })
}

pub async fn locate() -> Json<LocateResponse> {
    Json(LocateResponse { location: GPS_FIX })
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    use super::*;

    async fn get_json(uri: &str) -> (StatusCode, Option<Value>) {
        let app = discover_routes().with_state(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn defaults_to_food() {
        let (status, body) = get_json("/discover/suggestions?location=Austin").await;
        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["category"], "food");
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 2);
        assert_eq!(body["suggestions"][0]["name"], "The Local Kitchen");
    }

    #[tokio::test]
    async fn blank_location_yields_nothing() {
        let (status, body) = get_json("/discover/suggestions?location=%20%20&category=culture").await;
        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["location"], Value::Null);
        assert!(body["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn filters_by_category_and_echoes_location() {
        let (_, body) =
            get_json("/discover/suggestions?category=entertainment&location=%20Oakland%20").await;
        let body = body.unwrap();
        assert_eq!(body["location"], "Oakland");
        assert_eq!(body["suggestions"][0]["name"], "The Blue Note");
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let (status, _) = get_json("/discover/suggestions?category=nightlife").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn locate_returns_fixed_position() {
        let (_, body) = get_json("/discover/locate").await;
        assert_eq!(body.unwrap()["location"], GPS_FIX);
    }
}
