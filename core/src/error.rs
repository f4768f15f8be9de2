//! Error types for the chat API client.
//!
//! # Design
//! Each status code the platform uses to reject a request gets its own
//! variant so callers can react (ask for a new token, pick another channel,
//! wait out a rate limit). Any other non-success status lands in
//! `UnexpectedStatus` with the raw code and body.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no token")]
    NoToken,

    #[error("no channel id")]
    NoChannelId,

    /// Channel ids are snowflakes; anything else could rewrite the URL path.
    #[error("invalid channel id {0:?}")]
    InvalidChannelId(String),

    #[error("no content")]
    NoContent,

    /// 401
    #[error("invalid authorization, try using a new token")]
    Unauthorized,

    /// 403
    #[error(
        "forbidden, you may not have permission to send in the channel (i.e. you aren't in the \
         server or don't have send message permissions in the channel), your account might need \
         verification, or your ip address may have been blocked"
    )]
    Forbidden,

    /// 404
    #[error("not found, make sure your channel id is valid")]
    NotFound,

    /// 429. `retry_after` is in seconds, when the body carried one.
    #[error("you are being rate limited, try waiting some time and trying again")]
    TooManyRequests { retry_after: Option<f64> },

    /// 500
    #[error("remote server internal server error")]
    InternalServerError,

    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("error while encoding request as json: {0}")]
    Serialization(String),

    #[error("error while decoding body: {0}")]
    Deserialization(String),

    #[error("error while sending http request: {0}")]
    Transport(String),

    /// The cause is reported through `source()` only.
    #[error("could not get user information")]
    UserInfo(#[source] Box<ApiError>),
}

impl ApiError {
    /// The HTTP status this error was mapped from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden => Some(403),
            ApiError::NotFound => Some(404),
            ApiError::TooManyRequests { .. } => Some(429),
            ApiError::InternalServerError => Some(500),
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            ApiError::UserInfo(inner) => inner.status(),
            _ => None,
        }
    }
}
