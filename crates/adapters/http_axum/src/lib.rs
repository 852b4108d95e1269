//! # inksync-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API used by the automation editor and the device:
//!   automations, action/trigger catalogs, module descriptors and configs,
//!   calendar events and the daily agenda
//! - Accept device inputs and hand them to the automation engine
//! - Stream run lifecycle events over Server-Sent Events
//!
//! ## Dependency rule
//! Depends on `inksync-app` (for port traits, services and the engine) and
//! `inksync-domain` (for request/response types). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
