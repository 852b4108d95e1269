//! Catalog of trigger kinds and the trigger-matching rule.

use serde::Serialize;

use super::param::{self, ConfigMap, ParamDef, ValidationMode, present, value_as_text};
use crate::automation::TriggerKind;
use crate::device::{DeviceEvent, KEY_IDS, KNOB_MAX_VALUE, KNOB_MIN_VALUE};
use crate::error::{FieldError, NotFoundError};

/// Static description of one trigger kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TriggerDef {
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamDef],
}

const MODULE: ParamDef = ParamDef::select("module", "Module slot", &["1", "2"]).required();
const KEY: ParamDef = ParamDef::select("key", "Key ID", &KEY_IDS).required();
const KNOB: ParamDef = ParamDef::number("knob", "Knob ID").required().range(0.0, 3.0);

/// Every trigger kind, in editor order.
pub static TRIGGER_DEFINITIONS: [TriggerDef; 7] = [
    TriggerDef {
        kind: TriggerKind::KeyPress,
        name: "On key press",
        description: "Trigger when a key is pressed",
        params: &[KEY, MODULE],
    },
    TriggerDef {
        kind: TriggerKind::KeyRelease,
        name: "On key release",
        description: "Trigger when a key is released",
        params: &[KEY, MODULE],
    },
    TriggerDef {
        kind: TriggerKind::KnobChange,
        name: "On knob change",
        description: "Trigger when knob value changes",
        params: &[
            KNOB,
            MODULE,
            ParamDef::number("value", "Value (optional)").range(0.0, 100.0),
        ],
    },
    TriggerDef {
        kind: TriggerKind::KnobMin,
        name: "On knob at minimum",
        description: "Trigger when knob reaches minimum value",
        params: &[KNOB, MODULE],
    },
    TriggerDef {
        kind: TriggerKind::KnobMax,
        name: "On knob at maximum",
        description: "Trigger when knob reaches maximum value",
        params: &[KNOB, MODULE],
    },
    TriggerDef {
        kind: TriggerKind::ModuleConnected,
        name: "On module connected",
        description: "Trigger when module is connected",
        params: &[MODULE],
    },
    TriggerDef {
        kind: TriggerKind::ModuleDisconnected,
        name: "On module disconnected",
        description: "Trigger when module is disconnected",
        params: &[MODULE],
    },
];

/// Definition of a known trigger kind.
#[must_use]
pub fn definition(kind: TriggerKind) -> &'static TriggerDef {
    // TRIGGER_DEFINITIONS follows the declaration order of TriggerKind.
    &TRIGGER_DEFINITIONS[kind as usize]
}

/// Look up a trigger definition by its wire name.
///
/// # Errors
///
/// Returns [`NotFoundError`] when no trigger kind has that name.
pub fn get_definition(trigger_type: &str) -> Result<&'static TriggerDef, NotFoundError> {
    TRIGGER_DEFINITIONS
        .iter()
        .find(|def| def.kind.as_str() == trigger_type)
        .ok_or_else(|| NotFoundError {
            entity: "TriggerKind",
            id: trigger_type.to_string(),
        })
}

/// Validate a trigger config. Trigger configs never contain variable
/// references, so validation is always strict.
///
/// # Errors
///
/// Returns every field error found.
pub fn validate_config(kind: TriggerKind, config: &ConfigMap) -> Result<(), Vec<FieldError>> {
    let errors = param::validate_params(definition(kind).params, config, ValidationMode::Strict);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether a trigger of `kind` configured with `config` fires on `event`.
///
/// The event kind must correspond to the trigger kind, then every non-empty
/// configured field must equal the event's field of the same name.
#[must_use]
pub fn matches(kind: TriggerKind, config: &ConfigMap, event: &DeviceEvent) -> bool {
    let kind_matches = match (kind, event) {
        (TriggerKind::KeyPress, DeviceEvent::KeyPress { .. })
        | (TriggerKind::KeyRelease, DeviceEvent::KeyRelease { .. })
        | (TriggerKind::KnobChange, DeviceEvent::KnobChange { .. })
        | (TriggerKind::ModuleConnected, DeviceEvent::ModuleConnected { .. })
        | (TriggerKind::ModuleDisconnected, DeviceEvent::ModuleDisconnected { .. }) => true,
        (TriggerKind::KnobMin, DeviceEvent::KnobChange { value, .. }) => *value <= KNOB_MIN_VALUE,
        (TriggerKind::KnobMax, DeviceEvent::KnobChange { value, .. }) => *value >= KNOB_MAX_VALUE,
        _ => false,
    };
    kind_matches
        && definition(kind).params.iter().all(|param| {
            let Some(expected) = present(config, param.id).and_then(value_as_text) else {
                return true;
            };
            event
                .field(param.id)
                .is_some_and(|actual| same_value(&expected, &actual))
        })
}

/// Textual equality, with numeric equality as a fallback so `"2.0"` and `2`
/// compare equal.
fn same_value(expected: &str, actual: &str) -> bool {
    if expected.trim() == actual {
        return true;
    }
    match (param::parse_number(expected), param::parse_number(actual)) {
        (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
        _ => false,
    }
}
