//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod automation_service;
pub mod calendar_service;
pub mod module_service;

pub use automation_service::AutomationService;
pub use calendar_service::CalendarService;
pub use module_service::ModuleService;
