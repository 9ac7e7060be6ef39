//! # Switchyard Transport
//!
//! The network edges of a Switchyard bot.
//!
//! ## Features
//!
//! - `http-server` (default): the axum webhook server for the events and
//!   slash-command endpoints, with token and signature verification
//! - `http-client` (default): [`ApiClient`], a `reqwest`-backed
//!   [`Client`](switchyard_core::Client) for the Web API
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  Bot code            │  (handlers registered on a Router)
//! ├──────────────────────┤
//! │  switchyard-framework│  (chain, commands, router)
//! ├──────────────────────┤
//! │  switchyard-transport│  <- This crate (HTTP in, Web API out)
//! ├──────────────────────┤
//! │  Network (TCP/HTTP)  │
//! └──────────────────────┘
//! ```

pub mod error;

#[cfg(feature = "http-client")]
pub mod client;

#[cfg(feature = "http-server")]
pub mod envelope;
#[cfg(feature = "http-server")]
pub mod server;
#[cfg(feature = "http-server")]
pub mod signature;

pub use error::{ServerError, ServerResult, VerifyError};

#[cfg(feature = "http-client")]
pub use client::{ApiClient, ApiClientConfig};

#[cfg(feature = "http-server")]
pub use envelope::{Envelope, InnerEvent, decode_event};
#[cfg(feature = "http-server")]
pub use server::{ServerHandle, WebhookConfig, WebhookServer};
#[cfg(feature = "http-server")]
pub use signature::SignatureVerifier;
