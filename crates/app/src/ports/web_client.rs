//! Web client port — outbound HTTP for `web_request` actions.

use std::future::Future;

use inksync_domain::automation::command::WebRequest;
use inksync_domain::error::InkSyncError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebResponse {
    pub status: u16,
    pub body: String,
}

impl WebResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one HTTP request. Transport failures and timeouts are errors;
/// any HTTP status, including 4xx/5xx, is a response.
pub trait WebClient {
    fn send(
        &self,
        request: &WebRequest,
    ) -> impl Future<Output = Result<WebResponse, InkSyncError>> + Send;
}

impl<T: WebClient + Send + Sync> WebClient for std::sync::Arc<T> {
    fn send(
        &self,
        request: &WebRequest,
    ) -> impl Future<Output = Result<WebResponse, InkSyncError>> + Send {
        (**self).send(request)
    }
}
