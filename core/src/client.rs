//! Stateless HTTP request builder and response parser for the chat API.
//!
//! # Design
//! `DiscordClient` holds the token and the fixed request headers and carries
//! no mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. `Session` drives the round-trip through a `Transport`.

use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateMessage, Message, RateLimited, User};

#[derive(Clone)]
pub struct DiscordClient {
    token: String,
    base_url: String,
    user_agent: String,
    accept_language: String,
}

impl DiscordClient {
    /// Client against the public API with the default headers.
    pub fn new(token: &str) -> Result<Self, ApiError> {
        Self::from_config(&ClientConfig::new(token))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        if config.token.is_empty() {
            return Err(ApiError::NoToken);
        }
        Ok(Self {
            token: config.token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_current_user(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/users/@me", self.base_url),
            headers: self.headers(),
            body: None,
        }
    }

    pub fn build_typing(&self, channel_id: &str) -> Result<HttpRequest, ApiError> {
        check_channel_id(channel_id)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/channels/{channel_id}/typing", self.base_url),
            headers: self.headers(),
            body: None,
        })
    }

    pub fn build_send_message(&self, channel_id: &str, content: &str) -> Result<HttpRequest, ApiError> {
        check_channel_id(channel_id)?;
        if content.is_empty() {
            return Err(ApiError::NoContent);
        }
        let body = serde_json::to_string(&CreateMessage::text(content))
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut headers = self.headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/channels/{channel_id}/messages", self.base_url),
            headers,
            body: Some(body),
        })
    }

    pub fn parse_current_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_status(&response, &[200])?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// The platform answers a typing signal with 204; 200 is tolerated too.
    pub fn parse_typing(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])
    }

    pub fn parse_send_message(&self, response: HttpResponse) -> Result<Message, ApiError> {
        check_status(&response, &[200])?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("authorization".to_string(), self.token.clone()),
            ("user-agent".to_string(), self.user_agent.clone()),
            ("accept-language".to_string(), self.accept_language.clone()),
        ]
    }
}

impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("accept_language", &self.accept_language)
            .finish()
    }
}

/// Reject ids that would change the request path once interpolated.
fn check_channel_id(channel_id: &str) -> Result<(), ApiError> {
    if channel_id.is_empty() {
        return Err(ApiError::NoChannelId);
    }
    if !channel_id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ApiError::InvalidChannelId(channel_id.to_string()));
    }
    Ok(())
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    let err = match response.status {
        401 => ApiError::Unauthorized,
        403 => ApiError::Forbidden,
        404 => ApiError::NotFound,
        429 => ApiError::TooManyRequests {
            retry_after: serde_json::from_str::<RateLimited>(&response.body)
                .ok()
                .map(|r| r.retry_after),
        },
        500 => ApiError::InternalServerError,
        status => ApiError::UnexpectedStatus {
            status,
            body: response.body.clone(),
        },
    };
    warn!(status = response.status, error = %err, "request rejected");
    Err(err)
}
