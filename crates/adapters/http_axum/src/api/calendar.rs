//! Calendar events and the agenda shown on the device.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use inksync_domain::calendar::{Agenda, CalendarEvent};
use inksync_domain::error::ValidationError;
use inksync_domain::id::CalendarEventId;

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Query of `GET /api/events`. Both bounds are inclusive dates.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: String,
    pub to: String,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<CalendarEvent>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/events?from=..&to=..`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    Ok(Json(
        state.calendar.list_between(&range.from, &range.to).await?,
    ))
}

/// `POST /api/events`
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Json(event): Json<CalendarEvent>,
) -> Result<CreateResponse, ApiError> {
    let created = state.calendar.create(event).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `DELETE /api/events/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = CalendarEventId::from_str(&id)
        .map_err(|_| ApiError::from(ValidationError::InvalidIdentifier(id.clone())))?;
    state.calendar.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/state` — today's agenda.
pub async fn agenda<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Agenda>, ApiError> {
    Ok(Json(state.calendar.today().await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::Harness;

    #[tokio::test]
    async fn should_create_list_and_delete_events() {
        let h = Harness::new();
        let (status, created) = h
            .call(
                "POST",
                "/api/events",
                Some(json!({
                    "name": "Standup",
                    "start": "2026-03-02T09:30",
                    "end": "2026-03-02T09:45"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, listed) = h
            .call("GET", "/api/events?from=2026-03-01&to=2026-03-07", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["name"], "Standup");

        let (_, outside) = h
            .call("GET", "/api/events?from=2026-04-01&to=2026-04-07", None)
            .await;
        assert_eq!(outside, json!([]));

        let (status, _) = h.call("DELETE", &format!("/api/events/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = h.call("DELETE", &format!("/api/events/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_reject_event_ending_before_start() {
        let h = Harness::new();
        let (status, _) = h
            .call(
                "POST",
                "/api/events",
                Some(json!({
                    "name": "Backwards",
                    "start": "2026-03-02T10:00",
                    "end": "2026-03-02T09:00"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_reject_unparseable_range() {
        let h = Harness::new();
        let (status, _) = h
            .call("GET", "/api/events?from=yesterday&to=2026-03-07", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_serve_empty_agenda() {
        let h = Harness::new();
        let (status, body) = h.call("GET", "/api/state", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"events": []}));
    }
}
