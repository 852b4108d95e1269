//! PC endpoint selected at startup: the companion agent when one is
//! configured, otherwise the in-memory virtual PC.

use std::time::Duration;

use inksync_adapter_pc_link::PcAgentClient;
use inksync_adapter_virtual::VirtualPc;
use inksync_app::ports::{CommandOutput, PcEndpoint};
use inksync_domain::error::InkSyncError;

pub enum PcBackend {
    Agent(PcAgentClient),
    Virtual(VirtualPc),
}

impl PcBackend {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Agent(_) => "agent",
            Self::Virtual(_) => "virtual",
        }
    }
}

impl PcEndpoint for PcBackend {
    async fn key_press(&self, key: &str, duration: Option<Duration>) -> Result<(), InkSyncError> {
        match self {
            Self::Agent(agent) => agent.key_press(key, duration).await,
            Self::Virtual(pc) => pc.key_press(key, duration).await,
        }
    }

    async fn mouse_move(&self, x: u16, y: u16) -> Result<(), InkSyncError> {
        match self {
            Self::Agent(agent) => agent.mouse_move(x, y).await,
            Self::Virtual(pc) => pc.mouse_move(x, y).await,
        }
    }

    async fn gamepad(&self, button: &str, value: f64) -> Result<(), InkSyncError> {
        match self {
            Self::Agent(agent) => agent.gamepad(button, value).await,
            Self::Virtual(pc) => pc.gamepad(button, value).await,
        }
    }

    async fn execute_command(&self, command: &str) -> Result<CommandOutput, InkSyncError> {
        match self {
            Self::Agent(agent) => agent.execute_command(command).await,
            Self::Virtual(pc) => pc.execute_command(command).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_delegate_to_virtual_pc() {
        let backend = PcBackend::Virtual(VirtualPc::default());
        backend.mouse_move(10, 20).await.unwrap();
        let output = backend.execute_command("echo hi").await.unwrap();

        assert_eq!(output.stdout, "hi\n");
        assert_eq!(backend.label(), "virtual");
        let PcBackend::Virtual(pc) = &backend else {
            unreachable!()
        };
        assert_eq!(pc.cursor(), (10, 20));
    }
}
