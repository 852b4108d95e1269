//! Outbound HTTP client for `web_request` actions.

use std::time::Duration;

use inksync_app::ports::{WebClient, WebResponse};
use inksync_domain::automation::command::{HttpMethod, WebRequest};
use inksync_domain::error::{ExecutionError, InkSyncError};

use crate::error::PcLinkError;

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("inksync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl WebConfig {
    /// # Errors
    ///
    /// Returns [`PcLinkError::Client`] when the HTTP client cannot be built.
    pub fn build(self) -> Result<ReqwestWebClient, PcLinkError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(PcLinkError::Client)?;
        Ok(ReqwestWebClient {
            client,
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// [`WebClient`] backed by [`reqwest`]. Any HTTP status is returned as a
/// response; only transport failures and timeouts are errors.
#[derive(Debug, Clone)]
pub struct ReqwestWebClient {
    client: reqwest::Client,
    timeout_ms: u64,
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

impl WebClient for ReqwestWebClient {
    async fn send(&self, request: &WebRequest) -> Result<WebResponse, InkSyncError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending web request");
        let mut builder = self.client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                ExecutionError::Timeout(self.timeout_ms)
            } else {
                ExecutionError::Transport(err.to_string())
            }
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| ExecutionError::Transport(err.to_string()))?;
        Ok(WebResponse { status, body })
    }
}
