//! Variable resolution for `{name}` interpolation.
//!
//! Lookup order is user-defined variables, then trigger context, then the
//! ambient snapshot taken when the run was triggered. Unknown names are left
//! verbatim, braces included.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDateTime, Timelike};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::automation::{ActionKind, TriggerKind};
use crate::device::{DeviceEvent, ModuleStatus};
use crate::registry::actions;
use crate::registry::param::{ConfigMap, ParamType};

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("reference pattern is valid"));

/// Built-in variables derived from the clock and the module registry.
pub const AMBIENT_VARIABLES: [&str; 8] = [
    "current_time",
    "current_hour",
    "current_minute",
    "current_day",
    "current_month",
    "connected_modules",
    "module1_name",
    "module2_name",
];

/// Built-in variables derived from the triggering event.
pub const TRIGGER_VARIABLES: [&str; 7] = [
    "key_id",
    "key_module",
    "key_value",
    "knob_id",
    "knob_module",
    "knob_value",
    "module_slot",
];

/// Whether `text` contains at least one `{name}` reference.
#[must_use]
pub fn has_reference(text: &str) -> bool {
    REFERENCE.is_match(text)
}

/// Names referenced by `text`, in order of appearance.
pub fn references(text: &str) -> impl Iterator<Item = &str> {
    REFERENCE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Values known before the first action runs: wall clock and module state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientSnapshot {
    pub now: NaiveDateTime,
    pub modules: ModuleStatus,
    pub module1_name: Option<String>,
    pub module2_name: Option<String>,
}

impl AmbientSnapshot {
    fn lookup(&self, name: &str) -> Option<String> {
        let value = match name {
            "current_time" => self.now.format("%H:%M").to_string(),
            "current_hour" => self.now.hour().to_string(),
            "current_minute" => self.now.minute().to_string(),
            "current_day" => self.now.day().to_string(),
            "current_month" => self.now.month().to_string(),
            "connected_modules" => self.modules.connected_count().to_string(),
            "module1_name" => self.module1_name.clone()?,
            "module2_name" => self.module2_name.clone()?,
            _ => return None,
        };
        Some(value)
    }
}

/// The variable scope of a single run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    ambient: AmbientSnapshot,
    trigger: HashMap<&'static str, String>,
    user: HashMap<String, String>,
}

impl RunContext {
    #[must_use]
    pub fn new(ambient: AmbientSnapshot) -> Self {
        Self {
            ambient,
            trigger: HashMap::new(),
            user: HashMap::new(),
        }
    }

    /// Context of a run started by `event`.
    #[must_use]
    pub fn for_event(ambient: AmbientSnapshot, event: &DeviceEvent) -> Self {
        Self {
            ambient,
            trigger: event.context_variables().into_iter().collect(),
            user: HashMap::new(),
        }
    }

    /// Assign a user-defined variable, shadowing any built-in of that name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.user.insert(name.into(), value.into());
    }

    /// Current value of `name`, if defined.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        if let Some(value) = self.user.get(name) {
            return Some(value.clone());
        }
        if let Some(value) = self.trigger.get(name) {
            return Some(value.clone());
        }
        self.ambient.lookup(name)
    }

    /// Replace every `{name}` in `template` with its value.
    #[must_use]
    pub fn resolve(&self, template: &str) -> String {
        if !has_reference(template) {
            return template.to_string();
        }
        REFERENCE
            .replace_all(template, |caps: &Captures<'_>| {
                self.get(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Resolve the top-level string values of a config for an action of
    /// `kind`. Json-typed params stay as written, even when stored as JSON
    /// text; their templates are expanded after parsing.
    #[must_use]
    pub fn resolve_config(&self, kind: ActionKind, config: &ConfigMap) -> ConfigMap {
        let params = actions::definition(kind).params;
        config
            .iter()
            .map(|(key, value)| {
                let is_json = params
                    .iter()
                    .any(|param| param.id == key && param.kind == ParamType::Json);
                let resolved = match value {
                    Value::String(s) if !is_json => Value::String(self.resolve(s)),
                    other => other.clone(),
                };
                (key.clone(), resolved)
            })
            .collect()
    }

    /// Value of an operand that may name a variable: the variable's value if
    /// one is defined under that exact name, otherwise the operand itself.
    #[must_use]
    pub fn operand(&self, raw: &str) -> String {
        let name = raw.trim();
        self.get(name).unwrap_or_else(|| raw.to_string())
    }
}

/// Trigger-context variables set by the events a `kind` trigger matches.
#[must_use]
pub fn trigger_variables(kind: TriggerKind) -> &'static [&'static str] {
    match kind {
        TriggerKind::KeyPress | TriggerKind::KeyRelease => &TRIGGER_VARIABLES[..3],
        TriggerKind::KnobChange | TriggerKind::KnobMin | TriggerKind::KnobMax => {
            &TRIGGER_VARIABLES[3..6]
        }
        TriggerKind::ModuleConnected | TriggerKind::ModuleDisconnected => &TRIGGER_VARIABLES[6..],
    }
}

/// Every variable name an editor can offer for an automation fired by a
/// `kind` trigger: the ambient built-ins, that trigger's context variables
/// and `extra`.
#[must_use]
pub fn available_names<'a>(
    kind: TriggerKind,
    extra: impl IntoIterator<Item = &'a str>,
) -> BTreeSet<String> {
    AMBIENT_VARIABLES
        .iter()
        .chain(trigger_variables(kind))
        .copied()
        .chain(extra)
        .map(ToString::to_string)
        .collect()
}
