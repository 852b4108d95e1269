//! In-memory port implementations shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use inksync_domain::automation::Automation;
use inksync_domain::automation::command::WebRequest;
use inksync_domain::calendar::CalendarEvent;
use inksync_domain::device::{
    ModuleConfig, ModuleDescriptor, ModuleStatus, ModuleType, default_module_config,
};
use inksync_domain::error::{ExecutionError, InkSyncError};
use inksync_domain::id::CalendarEventId;

use crate::ports::{
    AutomationStore, CalendarStore, CommandOutput, ModuleRegistry, PcEndpoint, WebClient,
    WebResponse,
};

#[derive(Default)]
pub struct InMemoryAutomationStore {
    pub automations: Mutex<Vec<Automation>>,
}

impl InMemoryAutomationStore {
    pub fn with(automations: Vec<Automation>) -> Self {
        Self {
            automations: Mutex::new(automations),
        }
    }
}

impl AutomationStore for InMemoryAutomationStore {
    fn load_all(&self) -> impl Future<Output = Result<Vec<Automation>, InkSyncError>> + Send {
        let result = self.automations.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn save_all(
        &self,
        automations: Vec<Automation>,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        *self.automations.lock().unwrap() = automations;
        async { Ok(()) }
    }
}

#[derive(Default)]
pub struct InMemoryCalendar {
    pub events: Mutex<Vec<CalendarEvent>>,
}

impl CalendarStore for InMemoryCalendar {
    fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, InkSyncError>> + Send {
        let mut result: Vec<CalendarEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.overlaps(from, to))
            .cloned()
            .collect();
        result.sort_by_key(|e| e.start);
        async { Ok(result) }
    }

    fn insert(
        &self,
        event: CalendarEvent,
    ) -> impl Future<Output = Result<CalendarEvent, InkSyncError>> + Send {
        self.events.lock().unwrap().push(event.clone());
        async { Ok(event) }
    }

    fn delete(
        &self,
        id: CalendarEventId,
    ) -> impl Future<Output = Result<bool, InkSyncError>> + Send {
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != id);
        let removed = events.len() != before;
        async move { Ok(removed) }
    }
}

/// PC endpoint that records every primitive as a line of text.
#[derive(Default)]
pub struct RecordingPc {
    pub calls: Mutex<Vec<String>>,
    pub unreachable: AtomicBool,
    pub exit_code: AtomicI32,
}

impl RecordingPc {
    fn record(&self, call: String) -> Result<(), InkSyncError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ExecutionError::Unreachable("agent offline".to_string()).into());
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PcEndpoint for RecordingPc {
    fn key_press(
        &self,
        key: &str,
        duration: Option<Duration>,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        let result = self.record(match duration {
            Some(d) => format!("key_press {key} {}ms", d.as_millis()),
            None => format!("key_press {key}"),
        });
        async { result }
    }

    fn mouse_move(&self, x: u16, y: u16) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        let result = self.record(format!("mouse_move {x},{y}"));
        async { result }
    }

    fn gamepad(
        &self,
        button: &str,
        value: f64,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        let result = self.record(format!("gamepad {button} {value}"));
        async { result }
    }

    fn execute_command(
        &self,
        command: &str,
    ) -> impl Future<Output = Result<CommandOutput, InkSyncError>> + Send {
        let exit_code = self.exit_code.load(Ordering::SeqCst);
        let result = self
            .record(format!("execute_command {command}"))
            .map(|()| CommandOutput {
                exit_code,
                stdout: String::new(),
                stderr: if exit_code == 0 {
                    String::new()
                } else {
                    "command not found".to_string()
                },
            });
        async { result }
    }
}

/// Web client answering every request with a fixed status.
pub struct StubWeb {
    pub status: u16,
    pub requests: Mutex<Vec<WebRequest>>,
}

impl Default for StubWeb {
    fn default() -> Self {
        Self::with_status(200)
    }
}

impl StubWeb {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl WebClient for StubWeb {
    fn send(
        &self,
        request: &WebRequest,
    ) -> impl Future<Output = Result<WebResponse, InkSyncError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let response = WebResponse {
            status: self.status,
            body: String::new(),
        };
        async { Ok(response) }
    }
}

#[derive(Default)]
pub struct StaticModules {
    pub status: ModuleStatus,
    pub descriptors: HashMap<u8, ModuleDescriptor>,
    pub configs: Mutex<HashMap<String, ModuleConfig>>,
}

impl StaticModules {
    /// A keypad named `name` in slot 1.
    pub fn with_keypad(name: &str) -> Self {
        let descriptor = ModuleDescriptor {
            module_type: ModuleType::Keypad,
            device_name: name.to_string(),
            uuid: "keypad-1".to_string(),
            slot: 1,
            manufacturer: "inksync".to_string(),
            fw_version: "1.0.0".to_string(),
        };
        Self {
            status: ModuleStatus {
                module1: true,
                module2: false,
            },
            descriptors: HashMap::from([(1, descriptor)]),
            configs: Mutex::default(),
        }
    }
}

impl ModuleRegistry for StaticModules {
    fn status(&self) -> impl Future<Output = Result<ModuleStatus, InkSyncError>> + Send {
        let status = self.status;
        async move { Ok(status) }
    }

    fn descriptor(
        &self,
        slot: u8,
    ) -> impl Future<Output = Result<Option<ModuleDescriptor>, InkSyncError>> + Send {
        let result = self.descriptors.get(&slot).cloned();
        async { Ok(result) }
    }

    fn config(&self, uuid: &str) -> impl Future<Output = Result<ModuleConfig, InkSyncError>> + Send {
        let config = self
            .configs
            .lock()
            .unwrap()
            .entry(uuid.to_string())
            .or_insert_with(default_module_config)
            .clone();
        async { Ok(config) }
    }
}
