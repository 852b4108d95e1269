//! JSON REST handlers for automations.
//!
//! The editor saves the whole list on every change (`POST /api/automations`);
//! the per-item endpoints edit the same snapshot.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use inksync_domain::automation::Automation;
use inksync_domain::error::ValidationError;
use inksync_domain::id::AutomationId;

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for `PUT /api/automations/{id}/enabled`.
#[derive(Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

#[derive(Serialize)]
pub struct SavedBody {
    pub status: &'static str,
    pub count: usize,
}

/// Possible responses from the create endpoints.
pub enum CreateResponse {
    Created(Json<Automation>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<AutomationId, ApiError> {
    AutomationId::from_str(raw)
        .map_err(|_| ApiError::from(ValidationError::InvalidIdentifier(raw.to_string())))
}

/// `GET /api/automations` — the full snapshot, in saved order.
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<Json<Vec<Automation>>, ApiError> {
    Ok(Json(state.automations.list().await?))
}

/// `POST /api/automations` — replace the full snapshot.
pub async fn save_all<B: Backend>(
    State(state): State<AppState<B>>,
    Json(automations): Json<Vec<Automation>>,
) -> Result<Json<SavedBody>, ApiError> {
    let saved = state.automations.save_all(automations).await?;
    Ok(Json(SavedBody {
        status: "saved",
        count: saved.len(),
    }))
}

/// `POST /api/automations/new` — append a default automation.
pub async fn create_default<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<CreateResponse, ApiError> {
    let created = state.automations.create_default().await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `POST /api/automations/append` — append the posted automation.
pub async fn append<B: Backend>(
    State(state): State<AppState<B>>,
    Json(automation): Json<Automation>,
) -> Result<CreateResponse, ApiError> {
    let created = state.automations.create(automation).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/automations/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<Automation>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.automations.get(id).await?))
}

/// `PUT /api/automations/{id}` — replace one automation in place. The id in
/// the path wins over any id in the body.
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(mut automation): Json<Automation>,
) -> Result<Json<Automation>, ApiError> {
    automation.id = parse_id(&id)?;
    Ok(Json(state.automations.update(automation).await?))
}

/// `DELETE /api/automations/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.automations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/automations/{id}/variables` — names usable as `{name}` in
/// this automation's actions.
pub async fn variables<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let id = parse_id(&id)?;
    let automation = state.automations.get(id).await?;
    Ok(Json(automation.available_variables().into_iter().collect()))
}

/// `PUT /api/automations/{id}/enabled`
pub async fn set_enabled<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<Json<Automation>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.automations.set_enabled(id, req.enabled).await?))
}
