//! Action and trigger catalogs for the automation editor.

use axum::Json;
use serde::Serialize;

use inksync_domain::automation::{ActionKind, TriggerKind};
use inksync_domain::registry::{ActionDef, ConfigMap, TriggerDef, actions, triggers};

/// One action kind with the config a freshly added action starts with.
#[derive(Serialize)]
pub struct ActionEntry {
    #[serde(flatten)]
    pub definition: &'static ActionDef,
    pub defaults: ConfigMap,
}

/// `GET /api/registry/actions`
pub async fn list_actions() -> Json<Vec<ActionEntry>> {
    let entries = ActionKind::ALL
        .iter()
        .map(|&kind| ActionEntry {
            definition: actions::definition(kind),
            defaults: actions::default_config(kind),
        })
        .collect();
    Json(entries)
}

/// `GET /api/registry/triggers`
pub async fn list_triggers() -> Json<Vec<&'static TriggerDef>> {
    Json(
        TriggerKind::ALL
            .iter()
            .map(|&kind| triggers::definition(kind))
            .collect(),
    )
}
