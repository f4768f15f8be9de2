use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub use axum::http::StatusCode;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub discriminator: String,
    pub avatar: Option<String>,
    pub bot: bool,
    pub verified: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub content: String,
    pub tts: bool,
    pub author: User,
}

#[derive(Deserialize)]
pub struct CreateMessage {
    pub content: String,
    #[serde(default)]
    pub tts: bool,
}

/// One text channel as seen by the mock's single account.
#[derive(Clone, Debug, Default)]
pub struct Channel {
    pub read_only: bool,
    /// Every request against the channel is answered with this status.
    pub forced_status: Option<StatusCode>,
    pub messages: Vec<Message>,
    pub typing_count: usize,
}

#[derive(Debug)]
pub struct MockState {
    pub token: String,
    pub user: User,
    pub channels: HashMap<String, Channel>,
    /// Held before answering `/users/@me`, to exercise client timeouts.
    pub delay: Option<Duration>,
    next_id: u64,
}

impl MockState {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            user: User {
                id: "80351110224678912".to_string(),
                username: "Nelly".to_string(),
                discriminator: "1337".to_string(),
                avatar: None,
                bot: false,
                verified: true,
            },
            channels: HashMap::new(),
            delay: None,
            next_id: 800_000_000_000_000_000,
        }
    }

    pub fn with_channel(mut self, id: &str) -> Self {
        self.channels.insert(id.to_string(), Channel::default());
        self
    }

    pub fn with_read_only_channel(mut self, id: &str) -> Self {
        self.channels.insert(
            id.to_string(),
            Channel {
                read_only: true,
                ..Channel::default()
            },
        );
        self
    }

    pub fn with_forced_status(mut self, id: &str, status: StatusCode) -> Self {
        self.channels.insert(
            id.to_string(),
            Channel {
                forced_status: Some(status),
                ..Channel::default()
            },
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn into_db(self) -> Db {
        Arc::new(RwLock::new(self))
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == self.token)
    }

    /// Resolve a channel the caller may post in, or the status to fail with.
    fn writable_channel(&mut self, headers: &HeaderMap, id: &str) -> Result<&mut Channel, StatusCode> {
        if !self.authorized(headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let channel = self.channels.get_mut(id).ok_or(StatusCode::NOT_FOUND)?;
        if let Some(status) = channel.forced_status {
            return Err(status);
        }
        if channel.read_only {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(channel)
    }
}

pub type Db = Arc<RwLock<MockState>>;

pub fn app(db: Db) -> Router {
    Router::new()
        .route("/users/@me", get(current_user))
        .route("/channels/{channel_id}/typing", post(trigger_typing))
        .route("/channels/{channel_id}/messages", post(create_message))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

/// Error body shaped like the platform's.
fn failure(status: StatusCode) -> Response {
    let body = if status == StatusCode::TOO_MANY_REQUESTS {
        json!({"message": "You are being rate limited.", "retry_after": 2.5, "global": false})
    } else {
        json!({"message": status.canonical_reason().unwrap_or("error"), "code": 0})
    };
    (status, Json(body)).into_response()
}

async fn current_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, Response> {
    let delay = db.read().await.delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let state = db.read().await;
    if !state.authorized(&headers) {
        return Err(failure(StatusCode::UNAUTHORIZED));
    }
    Ok(Json(state.user.clone()))
}

async fn trigger_typing(
    State(db): State<Db>,
    Path(channel_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, Response> {
    let mut state = db.write().await;
    let channel = state.writable_channel(&headers, &channel_id).map_err(failure)?;
    channel.typing_count += 1;
    debug!(channel_id = %channel_id, "typing");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_message(
    State(db): State<Db>,
    Path(channel_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<CreateMessage>,
) -> Result<Json<Message>, Response> {
    let mut state = db.write().await;
    state.writable_channel(&headers, &channel_id).map_err(failure)?;
    if input.content.is_empty() {
        let body = json!({"message": "Cannot send an empty message", "code": 50006});
        return Err((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    state.next_id += 1;
    let message = Message {
        id: state.next_id.to_string(),
        channel_id: channel_id.clone(),
        content: input.content,
        tts: input.tts,
        author: state.user.clone(),
    };
    if let Some(channel) = state.channels.get_mut(&channel_id) {
        channel.messages.push(message.clone());
    }
    debug!(channel_id = %channel_id, message_id = %message.id, "message created");
    Ok(Json(message))
}
