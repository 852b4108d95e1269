//! Shared application state for axum handlers.

use std::sync::Arc;

use inksync_app::automation_engine::AutomationEngine;
use inksync_app::event_bus::InProcessEventBus;
use inksync_app::ports::{AutomationStore, CalendarStore, ModuleRegistry, PcEndpoint, WebClient};
use inksync_app::services::{AutomationService, CalendarService, ModuleService};

/// The concrete port implementations a server is wired with.
///
/// Handlers are generic over one `Backend` instead of one type parameter
/// per port.
pub trait Backend: Send + Sync + 'static {
    type Store: AutomationStore + Send + Sync + 'static;
    type Calendar: CalendarStore + Send + Sync + 'static;
    type Modules: ModuleRegistry + Send + Sync + 'static;
    type Pc: PcEndpoint + Send + Sync + 'static;
    type Web: WebClient + Send + Sync + 'static;
}

pub type Engine<B> = AutomationEngine<
    Arc<<B as Backend>::Store>,
    Arc<<B as Backend>::Modules>,
    InProcessEventBus,
    Arc<<B as Backend>::Pc>,
    Arc<<B as Backend>::Web>,
    Arc<<B as Backend>::Calendar>,
>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<B: Backend> {
    pub automations: Arc<AutomationService<Arc<B::Store>, Arc<InProcessEventBus>>>,
    pub calendar: Arc<CalendarService<Arc<B::Calendar>>>,
    pub modules: Arc<ModuleService<Arc<B::Modules>>>,
    pub engine: Arc<Engine<B>>,
    /// Source of the run event stream.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            automations: Arc::clone(&self.automations),
            calendar: Arc::clone(&self.calendar),
            modules: Arc::clone(&self.modules),
            engine: Arc::clone(&self.engine),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

/// Port implementations handed to [`AppState::wire`].
pub struct Ports<B: Backend> {
    pub store: Arc<B::Store>,
    pub calendar: Arc<B::Calendar>,
    pub modules: Arc<B::Modules>,
    pub pc: Arc<B::Pc>,
    pub web: Arc<B::Web>,
}

impl<B: Backend> AppState<B> {
    /// Build every service and the engine on top of `ports`, sharing
    /// `event_bus` between them.
    pub fn wire(ports: Ports<B>, event_bus: Arc<InProcessEventBus>) -> Self {
        let executor = Arc::new(inksync_app::run_executor::RunExecutor::new(
            ports.pc,
            ports.web,
            Arc::clone(&ports.calendar),
        ));
        let engine = AutomationEngine::new(
            Arc::clone(&ports.store),
            Arc::clone(&ports.modules),
            Arc::clone(&event_bus),
            executor,
        );
        Self {
            automations: Arc::new(AutomationService::new(ports.store, Arc::clone(&event_bus))),
            calendar: Arc::new(CalendarService::new(ports.calendar)),
            modules: Arc::new(ModuleService::new(ports.modules)),
            engine: Arc::new(engine),
            event_bus,
        }
    }
}
