//! Minimal blocking client for the chat platform's v8 REST API.
//!
//! # Overview
//! Authenticates with a user token, fetches the current account, shows a
//! typing indicator and posts text messages to a channel.
//!
//! # Design
//! - `DiscordClient` is sans-IO: `build_*` produces an `HttpRequest`,
//!   `parse_*` turns an `HttpResponse` into a typed result or `ApiError`.
//! - `Session` executes those requests through a `Transport` (ureq in
//!   production) and owns the only state: the token and the account fetched
//!   on connect.
//! - `TypingPlan` slices a typing duration into indicator refreshes without
//!   doing any I/O.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;
pub mod typing;

pub use client::DiscordClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::Session;
pub use transport::{Pause, ThreadPause, Transport, UreqTransport};
pub use types::{CreateMessage, Message, RateLimited, User};
pub use typing::{TypingPlan, TYPING_INTERVAL};
