//! Wire DTOs for the chat platform's v8 REST API.
//!
//! # Design
//! Only the fields this client reads are modelled. Unknown fields are ignored
//! and missing optional fields fall back to their defaults, so the structs
//! keep decoding when the platform adds to its payloads. The mock-server
//! defines its own copies; integration tests catch schema drift.

use serde::{Deserialize, Serialize};

/// The authenticated account, as returned by `GET /users/@me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub mfa_enabled: bool,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub flags: u64,
    #[serde(default)]
    pub phone: Option<String>,
}

impl User {
    /// `username#discriminator`, the way the platform displays accounts.
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }
}

/// Request payload for `POST /channels/{id}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessage {
    pub content: String,
    pub tts: bool,
}

impl CreateMessage {
    pub fn text(content: &str) -> Self {
        Self {
            content: content.to_string(),
            tts: false,
        }
    }
}

/// A message as echoed back by the platform after it was posted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub author: Option<User>,
}

/// Body of a 429 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimited {
    #[serde(default)]
    pub message: String,
    pub retry_after: f64,
    #[serde(default)]
    pub global: bool,
}
