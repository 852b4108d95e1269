//! # inksync-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `AutomationStore` — load and save the automation snapshot
//!   - `CalendarStore` — calendar events used by `add_calendar_event`
//!   - `ModuleRegistry` — module connectivity, descriptors and key configs
//!   - `PcEndpoint` — key/mouse/gamepad/command primitives on the PC
//!   - `WebClient` — outbound HTTP for `web_request`
//!   - `EventPublisher` — run and snapshot notifications
//! - Execute runs (`RunExecutor`) and react to device events
//!   (`AutomationEngine`)
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `inksync-domain` only (plus tokio for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod automation_engine;
pub mod event_bus;
pub mod ports;
pub mod run_executor;
pub mod services;

#[cfg(test)]
mod fakes;
