//! Module connectivity, descriptors and key configs, as polled by the
//! device and the editor.

use axum::Json;
use axum::extract::{Path, State};

use inksync_domain::device::{ModuleConfig, ModuleDescriptor, ModuleStatus};

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// `GET /api/check` — which slots currently hold a module.
pub async fn check<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<Json<ModuleStatus>, ApiError> {
    Ok(Json(state.modules.status().await?))
}

/// `GET /api/module/{slot}`
pub async fn descriptor<B: Backend>(
    State(state): State<AppState<B>>,
    Path(slot): Path<String>,
) -> Result<Json<ModuleDescriptor>, ApiError> {
    Ok(Json(state.modules.descriptor(&slot).await?))
}

/// `GET /api/config/{uuid}` — created with defaults on first read.
pub async fn config<B: Backend>(
    State(state): State<AppState<B>>,
    Path(uuid): Path<String>,
) -> Result<Json<ModuleConfig>, ApiError> {
    Ok(Json(state.modules.config(&uuid).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::Harness;

    #[tokio::test]
    async fn should_report_connected_slots() {
        let h = Harness::new();
        let (status, body) = h.call("GET", "/api/check", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"module1": true, "module2": false}));
    }

    #[tokio::test]
    async fn should_return_descriptor_or_not_found() {
        let h = Harness::new();
        let (status, body) = h.call("GET", "/api/module/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["device_name"], "Macro Keys");

        let (status, _) = h.call("GET", "/api/module/2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = h.call("GET", "/api/module/7", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_serve_default_config() {
        let h = Harness::new();
        let (status, body) = h.call("GET", "/api/config/keypad-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["KEY0"], json!([null, null]));
        assert_eq!(body.as_object().unwrap().len(), 9);
    }
}
