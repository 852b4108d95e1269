//! In-memory backend and request helpers for the router tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use inksync_adapter_virtual::VirtualPc;
use inksync_app::event_bus::InProcessEventBus;
use inksync_app::ports::{AutomationStore, CalendarStore, ModuleRegistry, WebClient, WebResponse};
use inksync_domain::automation::Automation;
use inksync_domain::automation::command::WebRequest;
use inksync_domain::calendar::CalendarEvent;
use inksync_domain::device::{
    ModuleConfig, ModuleDescriptor, ModuleStatus, ModuleType, default_module_config,
};
use inksync_domain::error::InkSyncError;
use inksync_domain::id::CalendarEventId;

use crate::state::{AppState, Backend, Ports};

#[derive(Default)]
pub struct MemoryStore(Mutex<Vec<Automation>>);

impl AutomationStore for MemoryStore {
    fn load_all(&self) -> impl Future<Output = Result<Vec<Automation>, InkSyncError>> + Send {
        let result = self.0.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn save_all(
        &self,
        automations: Vec<Automation>,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        *self.0.lock().unwrap() = automations;
        async { Ok(()) }
    }
}

#[derive(Default)]
pub struct MemoryCalendar(Mutex<Vec<CalendarEvent>>);

impl CalendarStore for MemoryCalendar {
    fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, InkSyncError>> + Send {
        let mut result: Vec<CalendarEvent> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.overlaps(from, to))
            .cloned()
            .collect();
        result.sort_by_key(|event| event.start);
        async { Ok(result) }
    }

    fn insert(
        &self,
        event: CalendarEvent,
    ) -> impl Future<Output = Result<CalendarEvent, InkSyncError>> + Send {
        self.0.lock().unwrap().push(event.clone());
        async { Ok(event) }
    }

    fn delete(
        &self,
        id: CalendarEventId,
    ) -> impl Future<Output = Result<bool, InkSyncError>> + Send {
        let mut events = self.0.lock().unwrap();
        let before = events.len();
        events.retain(|event| event.id != id);
        let removed = events.len() != before;
        async move { Ok(removed) }
    }
}

/// A keypad named "Macro Keys" in slot 1, nothing in slot 2.
pub struct KeypadOnly;

impl ModuleRegistry for KeypadOnly {
    fn status(&self) -> impl Future<Output = Result<ModuleStatus, InkSyncError>> + Send {
        async {
            Ok(ModuleStatus {
                module1: true,
                module2: false,
            })
        }
    }

    fn descriptor(
        &self,
        slot: u8,
    ) -> impl Future<Output = Result<Option<ModuleDescriptor>, InkSyncError>> + Send {
        let descriptor = (slot == 1).then(|| ModuleDescriptor {
            module_type: ModuleType::Keypad,
            device_name: "Macro Keys".to_string(),
            uuid: "keypad-1".to_string(),
            slot: 1,
            manufacturer: "inksync".to_string(),
            fw_version: "1.0.0".to_string(),
        });
        async { Ok(descriptor) }
    }

    fn config(&self, _uuid: &str) -> impl Future<Output = Result<ModuleConfig, InkSyncError>> + Send {
        async { Ok(default_module_config()) }
    }
}

pub struct OkWeb;

impl WebClient for OkWeb {
    fn send(
        &self,
        _request: &WebRequest,
    ) -> impl Future<Output = Result<WebResponse, InkSyncError>> + Send {
        async {
            Ok(WebResponse {
                status: 200,
                body: String::new(),
            })
        }
    }
}

pub struct TestBackend;

impl Backend for TestBackend {
    type Store = MemoryStore;
    type Calendar = MemoryCalendar;
    type Modules = KeypadOnly;
    type Pc = VirtualPc;
    type Web = OkWeb;
}

pub struct Harness {
    pub state: AppState<TestBackend>,
    pub pc: Arc<VirtualPc>,
}

impl Harness {
    pub fn new() -> Self {
        let pc = Arc::new(VirtualPc::default());
        let state = AppState::wire(
            Ports {
                store: Arc::new(MemoryStore::default()),
                calendar: Arc::new(MemoryCalendar::default()),
                modules: Arc::new(KeypadOnly),
                pc: Arc::clone(&pc),
                web: Arc::new(OkWeb),
            },
            Arc::new(InProcessEventBus::new(64)),
        );
        Self { state, pc }
    }

    pub fn router(&self) -> Router {
        crate::router::build(self.state.clone())
    }

    /// Send one request and decode the JSON body, `Null` when empty.
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
