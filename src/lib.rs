//! # whatsapp-cloud
//!
//! Rust client library for the WhatsApp Cloud messaging API, usable against
//! the direct API or through a pass-through proxy service.
//!
//! ## Features
//!
//! - Typed, validated builders for every outbound message kind (text,
//!   media, location, contacts, templates, reactions, interactive, flows)
//! - Media upload/metadata/download, template management, phone-number
//!   registration, calling, and proxy-side conversation/contact endpoints
//! - Deterministic error classification with retry hints for caller-side
//!   retry loops; mechanical transport retries stay inside the client
//! - Pluggable [`Transport`] for testing without a network
//!
//! ## Example
//!
//! ```ignore
//! use whatsapp_cloud::{Client, ClientConfig, Credential};
//! use whatsapp_cloud::payload::TextMessage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::new(Credential::access_token("EAAB..."));
//!     let client = Client::new(config)?;
//!     let resp = client
//!         .messages()
//!         .send_text("106540352242922", TextMessage::new("+1234567890", "Hello"))
//!         .await?;
//!     println!("sent: {:?}", resp.message_id());
//!     Ok(())
//! }
//! ```

pub mod casing;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod payload;
pub mod response;
pub mod transport;
pub mod types;

pub use client::Client;
pub use config::{ClientConfig, Credential};
pub use error::{
    ApiError, Error, ErrorCategory, Result, RetryAction, RetryHint, ValidationError,
};
pub use transport::Transport;
