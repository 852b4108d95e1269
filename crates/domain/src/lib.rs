//! # inksync-domain
//!
//! Pure domain model for the inksync macro-pad controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Automations** (trigger → ordered action rules)
//! - Define the **Action** and **Trigger** registries: parameter schemas,
//!   config validation and trigger matching
//! - Define the **Variable Resolver** used to interpolate `{name}` tokens
//! - Define the **Run** state machine and its outcomes
//! - Define **Device** input events, module descriptors and calendar events
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod calendar;
pub mod device;
pub mod event;
pub mod registry;
pub mod run;
pub mod variables;
