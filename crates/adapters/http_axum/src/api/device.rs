//! Device input ingestion.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use inksync_domain::device::DeviceEvent;
use inksync_domain::error::ValidationError;
use inksync_domain::id::{AutomationId, RunId};

use crate::error::ApiError;
use crate::state::{AppState, Backend};

#[derive(Debug, Serialize)]
pub struct StartedRun {
    pub run_id: RunId,
    pub automation_id: AutomationId,
}

#[derive(Debug, Serialize)]
pub struct AcceptedBody {
    pub runs: Vec<StartedRun>,
}

/// Possible responses from the ingest endpoint.
pub enum IngestResponse {
    /// Runs were started in the background; their progress is reported on
    /// the run event stream.
    Accepted(Json<AcceptedBody>),
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `POST /api/device/events` — hand one device input to the engine.
///
/// A body that does not decode as a device event (unknown type, a field
/// out of its integer range) is an invalid event, like one outside the
/// device layout.
pub async fn ingest<B: Backend>(
    State(state): State<AppState<B>>,
    payload: Result<Json<DeviceEvent>, JsonRejection>,
) -> Result<IngestResponse, ApiError> {
    let Json(event) =
        payload.map_err(|rejection| ValidationError::InvalidDeviceEvent(rejection.body_text()))?;
    let handles = state.engine.process_event(&event).await?;
    let runs = handles
        .iter()
        .map(|handle| StartedRun {
            run_id: handle.run_id,
            automation_id: handle.automation_id,
        })
        .collect();
    Ok(IngestResponse::Accepted(Json(AcceptedBody { runs })))
}
