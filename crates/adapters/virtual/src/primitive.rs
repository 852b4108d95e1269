//! Primitives recorded by the virtual PC.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    KeyPress {
        key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u128>,
    },
    MouseMove {
        x: u16,
        y: u16,
    },
    Gamepad {
        button: String,
        value: f64,
    },
    Command {
        command: String,
    },
}

impl Primitive {
    pub(crate) fn key_press(key: &str, duration: Option<Duration>) -> Self {
        Self::KeyPress {
            key: key.to_string(),
            duration_ms: duration.map(|d| d.as_millis()),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyPress {
                key,
                duration_ms: Some(ms),
            } => write!(f, "key_press {key} for {ms}ms"),
            Self::KeyPress { key, .. } => write!(f, "key_press {key}"),
            Self::MouseMove { x, y } => write!(f, "mouse_move {x},{y}"),
            Self::Gamepad { button, value } => write!(f, "gamepad {button}={value}"),
            Self::Command { command } => write!(f, "execute {command:?}"),
        }
    }
}
