//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod calendar;
#[allow(clippy::missing_errors_doc)]
pub mod device;
#[allow(clippy::missing_errors_doc)]
pub mod modules;
pub mod registry;
pub mod sse;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::{AppState, Backend};

/// Build the `/api` sub-router.
pub fn routes<B: Backend>() -> Router<AppState<B>> {
    Router::new()
        // Automations
        .route(
            "/automations",
            get(automations::list::<B>).post(automations::save_all::<B>),
        )
        .route("/automations/save", post(automations::save_all::<B>))
        .route("/automations/new", post(automations::create_default::<B>))
        .route("/automations/append", post(automations::append::<B>))
        .route(
            "/automations/{id}",
            get(automations::get::<B>)
                .put(automations::update::<B>)
                .delete(automations::delete::<B>),
        )
        .route(
            "/automations/{id}/enabled",
            put(automations::set_enabled::<B>),
        )
        .route(
            "/automations/{id}/variables",
            get(automations::variables::<B>),
        )
        // Catalogs
        .route("/registry/actions", get(registry::list_actions))
        .route("/registry/triggers", get(registry::list_triggers))
        // Modules
        .route("/check", get(modules::check::<B>))
        .route("/module/{slot}", get(modules::descriptor::<B>))
        .route("/config/{uuid}", get(modules::config::<B>))
        // Device input
        .route("/device/events", post(device::ingest::<B>))
        // Calendar
        .route(
            "/events",
            get(calendar::list::<B>).post(calendar::create::<B>),
        )
        .route("/events/{id}", axum::routing::delete(calendar::delete::<B>))
        .route("/state", get(calendar::agenda::<B>))
        // Run stream
        .route("/runs/stream", get(sse::stream::<B>))
}
