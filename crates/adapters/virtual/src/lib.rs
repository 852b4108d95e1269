//! # inksync-adapter-virtual
//!
//! Simulated PC endpoint for running automations without a companion agent
//! (demos, development and tests).
//!
//! ## Behaviour
//!
//! | Primitive | Effect |
//! |-----------|--------|
//! | key press | recorded; waits for the requested duration |
//! | mouse move | recorded; updates the virtual cursor |
//! | gamepad | recorded; updates the button's axis value |
//! | command | recorded; `echo <text>` prints `<text>`, `exit <n>` exits with `n`, anything else succeeds silently |
//!
//! The endpoint can be switched offline to exercise failure paths.
//!
//! ## Dependency rule
//!
//! Depends on `inksync-app` (port traits) and `inksync-domain` only.

mod primitive;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use inksync_app::ports::{CommandOutput, PcEndpoint};
use inksync_domain::error::{ExecutionError, InkSyncError};

pub use primitive::Primitive;

#[derive(Debug, Default)]
struct State {
    history: Vec<Primitive>,
    cursor: (u16, u16),
    gamepad: HashMap<String, f64>,
}

/// A PC that only exists in memory.
#[derive(Debug)]
pub struct VirtualPc {
    state: Mutex<State>,
    online: AtomicBool,
    history_limit: usize,
}

impl Default for VirtualPc {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl VirtualPc {
    /// A virtual PC keeping at most `history_limit` primitives.
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            online: AtomicBool::new(true),
            history_limit: history_limit.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate the agent going offline or coming back.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        tracing::info!(online, "virtual PC availability changed");
    }

    /// Primitives received so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Primitive> {
        self.lock().history.clone()
    }

    #[must_use]
    pub fn cursor(&self) -> (u16, u16) {
        self.lock().cursor
    }

    #[must_use]
    pub fn gamepad_value(&self, button: &str) -> Option<f64> {
        self.lock().gamepad.get(button).copied()
    }

    fn record(&self, primitive: Primitive) -> Result<(), InkSyncError> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(ExecutionError::Unreachable("virtual PC is offline".to_string()).into());
        }
        tracing::info!(%primitive, "virtual PC");
        let mut state = self.lock();
        match &primitive {
            Primitive::MouseMove { x, y } => state.cursor = (*x, *y),
            Primitive::Gamepad { button, value } => {
                state.gamepad.insert(button.clone(), *value);
            }
            Primitive::KeyPress { .. } | Primitive::Command { .. } => {}
        }
        if state.history.len() == self.history_limit {
            state.history.remove(0);
        }
        state.history.push(primitive);
        Ok(())
    }
}

fn simulate_command(command: &str) -> CommandOutput {
    let command = command.trim();
    if let Some(text) = command.strip_prefix("echo ") {
        return CommandOutput {
            exit_code: 0,
            stdout: format!("{text}\n"),
            stderr: String::new(),
        };
    }
    if let Some(code) = command.strip_prefix("exit ") {
        let exit_code = code.trim().parse().unwrap_or(1);
        return CommandOutput {
            exit_code,
            stdout: String::new(),
            stderr: if exit_code == 0 {
                String::new()
            } else {
                format!("exited with {exit_code}")
            },
        };
    }
    CommandOutput::default()
}

impl PcEndpoint for VirtualPc {
    async fn key_press(&self, key: &str, duration: Option<Duration>) -> Result<(), InkSyncError> {
        self.record(Primitive::key_press(key, duration))?;
        if let Some(duration) = duration {
            tokio::time::sleep(duration).await;
        }
        Ok(())
    }

    async fn mouse_move(&self, x: u16, y: u16) -> Result<(), InkSyncError> {
        self.record(Primitive::MouseMove { x, y })
    }

    async fn gamepad(&self, button: &str, value: f64) -> Result<(), InkSyncError> {
        self.record(Primitive::Gamepad {
            button: button.to_string(),
            value,
        })
    }

    async fn execute_command(&self, command: &str) -> Result<CommandOutput, InkSyncError> {
        self.record(Primitive::Command {
            command: command.to_string(),
        })?;
        Ok(simulate_command(command))
    }
}
