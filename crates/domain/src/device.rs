//! Device-side model: input events, module descriptors and per-module key
//! configuration.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::registry::param::format_number;

/// Module slots on the device.
pub const MODULE_SLOTS: [u8; 2] = [1, 2];

/// Key identifiers printed on a keypad module.
pub const KEY_IDS: [&str; 15] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "A", "B", "C", "D", "E", "F",
];

/// Highest knob index on a knob-array module.
pub const KNOB_MAX_ID: u8 = 3;
pub const KNOB_MIN_VALUE: u8 = 0;
pub const KNOB_MAX_VALUE: u8 = 100;

/// An input reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceEvent {
    KeyPress { module: u8, key: String },
    KeyRelease { module: u8, key: String },
    KnobChange { module: u8, knob: u8, value: u8 },
    ModuleConnected { module: u8 },
    ModuleDisconnected { module: u8 },
}

impl DeviceEvent {
    /// Wire name of the event kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyPress { .. } => "key_press",
            Self::KeyRelease { .. } => "key_release",
            Self::KnobChange { .. } => "knob_change",
            Self::ModuleConnected { .. } => "module_connected",
            Self::ModuleDisconnected { .. } => "module_disconnected",
        }
    }

    #[must_use]
    pub fn module(&self) -> u8 {
        match self {
            Self::KeyPress { module, .. }
            | Self::KeyRelease { module, .. }
            | Self::KnobChange { module, .. }
            | Self::ModuleConnected { module }
            | Self::ModuleDisconnected { module } => *module,
        }
    }

    /// Textual value of the field a trigger config refers to by `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<String> {
        match (self, name) {
            (_, "module") => Some(self.module().to_string()),
            (Self::KeyPress { key, .. } | Self::KeyRelease { key, .. }, "key") => {
                Some(key.clone())
            }
            (Self::KnobChange { knob, .. }, "knob") => Some(knob.to_string()),
            (Self::KnobChange { value, .. }, "value") => {
                Some(format_number(f64::from(*value)))
            }
            _ => None,
        }
    }

    /// Trigger-context variables exposed to the actions of a matched run.
    #[must_use]
    pub fn context_variables(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::KeyPress { module, key } => vec![
                ("key_id", key.clone()),
                ("key_module", module.to_string()),
                ("key_value", "1".to_string()),
            ],
            Self::KeyRelease { module, key } => vec![
                ("key_id", key.clone()),
                ("key_module", module.to_string()),
                ("key_value", "0".to_string()),
            ],
            Self::KnobChange {
                module,
                knob,
                value,
            } => vec![
                ("knob_id", knob.to_string()),
                ("knob_module", module.to_string()),
                ("knob_value", value.to_string()),
            ],
            Self::ModuleConnected { module } | Self::ModuleDisconnected { module } => {
                vec![("module_slot", module.to_string())]
            }
        }
    }

    /// Check the event against the device's physical layout.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDeviceEvent`] for an unknown module
    /// slot, key or knob, or a knob value above the maximum.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let module = self.module();
        if !MODULE_SLOTS.contains(&module) {
            return Err(ValidationError::InvalidDeviceEvent(format!(
                "unknown module slot {module}"
            )));
        }
        match self {
            Self::KeyPress { key, .. } | Self::KeyRelease { key, .. }
                if !KEY_IDS.contains(&key.as_str()) =>
            {
                Err(ValidationError::InvalidDeviceEvent(format!(
                    "unknown key {key:?}"
                )))
            }
            Self::KnobChange { knob, .. } if *knob > KNOB_MAX_ID => Err(
                ValidationError::InvalidDeviceEvent(format!("unknown knob {knob}")),
            ),
            Self::KnobChange { value, .. } if *value > KNOB_MAX_VALUE => {
                Err(ValidationError::InvalidDeviceEvent(format!(
                    "knob value {value} is above {KNOB_MAX_VALUE}"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for DeviceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyPress { module, key } | Self::KeyRelease { module, key } => {
                write!(f, "{}(module={module}, key={key})", self.kind())
            }
            Self::KnobChange {
                module,
                knob,
                value,
            } => write!(
                f,
                "knob_change(module={module}, knob={knob}, value={value})"
            ),
            Self::ModuleConnected { module } | Self::ModuleDisconnected { module } => {
                write!(f, "{}(module={module})", self.kind())
            }
        }
    }
}

/// Which module slots currently hold a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStatus {
    pub module1: bool,
    pub module2: bool,
}

impl ModuleStatus {
    #[must_use]
    pub fn is_connected(&self, slot: u8) -> bool {
        match slot {
            1 => self.module1,
            2 => self.module2,
            _ => false,
        }
    }

    #[must_use]
    pub fn connected_count(&self) -> usize {
        usize::from(self.module1) + usize::from(self.module2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Keypad,
    KnobArray,
    #[serde(other)]
    Unknown,
}

/// Hardware description of a module, as written by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub module_type: ModuleType,
    pub device_name: String,
    pub uuid: String,
    #[serde(default)]
    pub slot: u8,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub fw_version: String,
}

/// Per-module key bindings: `KEYn` → one entry per layer.
pub type ModuleConfig = BTreeMap<String, Vec<Option<String>>>;

/// Config written for a module the first time it is read.
#[must_use]
pub fn default_module_config() -> ModuleConfig {
    (0..9)
        .map(|idx| (format!("KEY{idx}"), vec![None, None]))
        .collect()
}

/// Validate a module slot supplied by a client.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIdentifier`] for anything but `1` or `2`.
pub fn parse_slot(raw: &str) -> Result<u8, ValidationError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|slot| MODULE_SLOTS.contains(slot))
        .ok_or_else(|| ValidationError::InvalidIdentifier(raw.to_string()))
}

/// Validate a module uuid used to name its config file.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIdentifier`] unless the value is a
/// non-empty run of ASCII alphanumerics, `-` and `_`.
pub fn validate_module_uuid(uuid: &str) -> Result<(), ValidationError> {
    let safe = !uuid.is_empty()
        && uuid.len() <= 128
        && uuid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if safe {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier(uuid.to_string()))
    }
}
