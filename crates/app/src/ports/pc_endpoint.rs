//! PC endpoint port — input primitives performed on the user's computer.

use std::future::Future;
use std::time::Duration;

use inksync_domain::error::InkSyncError;

/// Result of a shell command run by the PC agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Performs key, mouse, gamepad and command primitives.
///
/// Implementations report an unreachable agent as
/// [`ExecutionError::Unreachable`](inksync_domain::error::ExecutionError::Unreachable)
/// and never retry.
pub trait PcEndpoint {
    fn key_press(
        &self,
        key: &str,
        duration: Option<Duration>,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send;

    fn mouse_move(&self, x: u16, y: u16) -> impl Future<Output = Result<(), InkSyncError>> + Send;

    fn gamepad(
        &self,
        button: &str,
        value: f64,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send;

    fn execute_command(
        &self,
        command: &str,
    ) -> impl Future<Output = Result<CommandOutput, InkSyncError>> + Send;
}

impl<T: PcEndpoint + Send + Sync> PcEndpoint for std::sync::Arc<T> {
    fn key_press(
        &self,
        key: &str,
        duration: Option<Duration>,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        (**self).key_press(key, duration)
    }

    fn mouse_move(&self, x: u16, y: u16) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        (**self).mouse_move(x, y)
    }

    fn gamepad(
        &self,
        button: &str,
        value: f64,
    ) -> impl Future<Output = Result<(), InkSyncError>> + Send {
        (**self).gamepad(button, value)
    }

    fn execute_command(
        &self,
        command: &str,
    ) -> impl Future<Output = Result<CommandOutput, InkSyncError>> + Send {
        (**self).execute_command(command)
    }
}
