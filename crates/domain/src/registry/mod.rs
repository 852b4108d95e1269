//! Action and trigger catalogs.
//!
//! Each kind maps to a static [`ActionDef`] / [`TriggerDef`] carrying its
//! display name and ordered parameter schema. Configs are validated against
//! those schemas before they are saved and again, strictly, right before an
//! action executes.

pub mod actions;
pub mod param;
pub mod triggers;

pub use actions::ActionDef;
pub use param::{ConfigMap, ParamDef, ParamType, ValidationMode};
pub use triggers::TriggerDef;
