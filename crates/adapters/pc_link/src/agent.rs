//! Client for the PC companion agent.
//!
//! Every primitive is a JSON `POST` to `<base_url>/<primitive>`:
//!
//! | Path | Body | Answer |
//! |------|------|--------|
//! | `key_press` | `{key, duration_ms?}` | any 2xx |
//! | `mouse_move` | `{x, y}` | any 2xx |
//! | `gamepad` | `{button, value}` | any 2xx |
//! | `execute` | `{command}` | `{exit_code, stdout, stderr}` |
//!
//! Requests are never retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use inksync_app::ports::{CommandOutput, PcEndpoint};
use inksync_domain::error::InkSyncError;

use crate::error::PcLinkError;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the agent, e.g. `http://192.168.1.20:8765`.
    pub base_url: String,
    pub timeout: Duration,
}

impl AgentConfig {
    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`PcLinkError`] for a base URL that is not `http(s)` or when
    /// the underlying HTTP client cannot be built.
    pub fn build(self) -> Result<PcAgentClient, PcLinkError> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PcLinkError::InvalidUrl(self.base_url));
        }
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(PcLinkError::Client)?;
        Ok(PcAgentClient {
            client,
            base_url,
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

#[derive(Serialize)]
struct KeyPressBody<'a> {
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
}

#[derive(Serialize)]
struct MouseMoveBody {
    x: u16,
    y: u16,
}

#[derive(Serialize)]
struct GamepadBody<'a> {
    button: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct ExecuteBody<'a> {
    command: &'a str,
}

#[derive(Deserialize)]
struct ExecuteAnswer {
    exit_code: i32,
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
}

/// [`PcEndpoint`] talking to the companion agent over HTTP.
#[derive(Debug, Clone)]
pub struct PcAgentClient {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl PcAgentClient {
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, PcLinkError> {
        let endpoint = format!("{}/{path}", self.base_url);
        tracing::debug!(%endpoint, "calling PC agent");
        let response = self
            .client
            .post(&endpoint)
            .json(body)
            .send()
            .await
            .map_err(|err| PcLinkError::from_send(&endpoint, self.timeout_ms, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PcLinkError::Rejected {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl PcEndpoint for PcAgentClient {
    async fn key_press(&self, key: &str, duration: Option<Duration>) -> Result<(), InkSyncError> {
        let body = KeyPressBody {
            key,
            duration_ms: duration.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        };
        self.post("key_press", &body).await?;
        Ok(())
    }

    async fn mouse_move(&self, x: u16, y: u16) -> Result<(), InkSyncError> {
        self.post("mouse_move", &MouseMoveBody { x, y }).await?;
        Ok(())
    }

    async fn gamepad(&self, button: &str, value: f64) -> Result<(), InkSyncError> {
        self.post("gamepad", &GamepadBody { button, value }).await?;
        Ok(())
    }

    async fn execute_command(&self, command: &str) -> Result<CommandOutput, InkSyncError> {
        let response = self.post("execute", &ExecuteBody { command }).await?;
        let endpoint = response.url().to_string();
        let answer: ExecuteAnswer = response
            .json()
            .await
            .map_err(|source| PcLinkError::Decode { endpoint, source })?;
        Ok(CommandOutput {
            exit_code: answer.exit_code,
            stdout: answer.stdout,
            stderr: answer.stderr,
        })
    }
}
