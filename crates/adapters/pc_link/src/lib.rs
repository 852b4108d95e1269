//! # inksync-adapter-pc-link
//!
//! Outbound HTTP adapters built on [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - [`PcAgentClient`] implements `PcEndpoint` against the companion agent
//!   running on the user's computer
//! - [`ReqwestWebClient`] implements `WebClient` for `web_request` actions
//! - Map transport failures, timeouts and refusals to `ExecutionError`
//!
//! Neither client retries.

pub mod agent;
pub mod error;
pub mod web;

pub use agent::{AgentConfig, PcAgentClient};
pub use error::PcLinkError;
pub use web::{ReqwestWebClient, WebConfig};
