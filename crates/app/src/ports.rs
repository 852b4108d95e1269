//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod automation_store;
pub mod calendar_store;
pub mod event_bus;
pub mod module_registry;
pub mod pc_endpoint;
pub mod web_client;

pub use automation_store::AutomationStore;
pub use calendar_store::CalendarStore;
pub use event_bus::EventPublisher;
pub use module_registry::ModuleRegistry;
pub use pc_endpoint::{CommandOutput, PcEndpoint};
pub use web_client::{WebClient, WebResponse};
