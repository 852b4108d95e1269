//! Trigger — the device event pattern that activates an automation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::device::DeviceEvent;
use crate::error::{NotFoundError, ValidationError};
use crate::registry::param::{present, value_as_text};
use crate::registry::{ConfigMap, TriggerDef, triggers};

/// Kind of device event a trigger listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    KeyPress,
    KeyRelease,
    KnobChange,
    KnobMin,
    KnobMax,
    ModuleConnected,
    ModuleDisconnected,
}

impl TriggerKind {
    pub const ALL: [Self; 7] = [
        Self::KeyPress,
        Self::KeyRelease,
        Self::KnobChange,
        Self::KnobMin,
        Self::KnobMax,
        Self::ModuleConnected,
        Self::ModuleDisconnected,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeyPress => "key_press",
            Self::KeyRelease => "key_release",
            Self::KnobChange => "knob_change",
            Self::KnobMin => "knob_min",
            Self::KnobMax => "knob_max",
            Self::ModuleConnected => "module_connected",
            Self::ModuleDisconnected => "module_disconnected",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        triggers::get_definition(s).map(|def| def.kind)
    }
}

/// Describes which device event should activate an automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    #[serde(default)]
    pub config: ConfigMap,
}

impl Default for Trigger {
    fn default() -> Self {
        let mut config = ConfigMap::new();
        config.insert("key".to_string(), Value::from("1"));
        config.insert("module".to_string(), Value::from("1"));
        Self {
            kind: TriggerKind::KeyPress,
            config,
        }
    }
}

impl Trigger {
    #[must_use]
    pub fn new(kind: TriggerKind, config: ConfigMap) -> Self {
        Self { kind, config }
    }

    #[must_use]
    pub fn definition(&self) -> &'static TriggerDef {
        triggers::definition(self.kind)
    }

    /// Check whether this trigger fires on a given device event.
    #[must_use]
    pub fn matches_event(&self, event: &DeviceEvent) -> bool {
        triggers::matches(self.kind, &self.config, event)
    }

    /// Check the config against the trigger kind's schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] listing every bad field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        triggers::validate_config(self.kind, &self.config).map_err(|errors| {
            ValidationError::InvalidConfig {
                subject: format!("trigger {}", self.kind),
                errors,
            }
        })
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        let fields: Vec<String> = self
            .definition()
            .params
            .iter()
            .filter_map(|param| {
                present(&self.config, param.id)
                    .and_then(value_as_text)
                    .map(|value| format!("{}={value}", param.id))
            })
            .collect();
        if !fields.is_empty() {
            write!(f, "({})", fields.join(", "))?;
        }
        Ok(())
    }
}
