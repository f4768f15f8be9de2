//! An authenticated identity that performs requests one at a time.
//!
//! # Design
//! `Session` pairs a `DiscordClient` with a `Transport` and a `Pause`.
//! Connecting fetches the current user once and keeps it; that and the token
//! are the only state. There is no retry and no backoff: the first error
//! from the platform is returned to the caller.

use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::client::DiscordClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{Pause, ThreadPause, Transport, UreqTransport};
use crate::typing::TypingPlan;
use crate::types::{Message, User};

#[derive(Debug)]
pub struct Session<T, P = ThreadPause> {
    client: DiscordClient,
    transport: T,
    pause: P,
    user: User,
}

impl Session<UreqTransport> {
    /// Connect over HTTPS using the configured timeout.
    pub fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_transport(config, UreqTransport::new(config.timeout))
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self, ApiError> {
        Self::with_parts(config, transport, ThreadPause)
    }
}

impl<T: Transport, P: Pause> Session<T, P> {
    /// Validate the token and fetch the account behind it.
    ///
    /// Fails with `NoToken` before any I/O, or with `UserInfo` wrapping
    /// whatever went wrong while fetching the user.
    pub fn with_parts(config: &ClientConfig, transport: T, pause: P) -> Result<Self, ApiError> {
        let client = DiscordClient::from_config(config)?;
        let user = fetch_user(&client, &transport).map_err(|e| ApiError::UserInfo(Box::new(e)))?;
        info!(user_id = %user.id, user = %user.tag(), "authenticated");
        Ok(Self {
            client,
            transport,
            pause,
            user,
        })
    }

    /// The account fetched when the session was created.
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn client(&self) -> &DiscordClient {
        &self.client
    }

    /// Fetch the account again. Only needed if it may have changed since
    /// connecting; otherwise use `user()`. The cached copy is left alone.
    pub fn current_user(&self) -> Result<User, ApiError> {
        fetch_user(&self.client, &self.transport)
    }

    /// Fetch the account and replace the cached copy.
    pub fn refresh_user(&mut self) -> Result<&User, ApiError> {
        self.user = self.current_user()?;
        Ok(&self.user)
    }

    /// Post `content` to `channel_id`.
    ///
    /// With a non-zero `typing` duration the account first shows as typing
    /// for that long, refreshing the indicator as it expires. Any failure
    /// while typing aborts the send.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn send_message(&self, content: &str, channel_id: &str, typing: Duration) -> Result<Message, ApiError> {
        let request = self.client.build_send_message(channel_id, content)?;

        let plan = TypingPlan::new(typing);
        for slice in plan.slices() {
            self.typing(channel_id)?;
            self.pause.pause(slice);
        }

        let response = self.transport.execute(&request)?;
        let message = self.client.parse_send_message(response)?;
        debug!(message_id = %message.id, "message sent");
        Ok(message)
    }

    fn typing(&self, channel_id: &str) -> Result<(), ApiError> {
        let request = self.client.build_typing(channel_id)?;
        let response = self.transport.execute(&request)?;
        self.client.parse_typing(response)
    }
}

fn fetch_user<T: Transport>(client: &DiscordClient, transport: &T) -> Result<User, ApiError> {
    let response = transport.execute(&client.build_current_user())?;
    client.parse_current_user(response)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    const USER_JSON: &str = r#"{"id":"1","username":"Nelly","discriminator":"1337"}"#;
    const MESSAGE_JSON: &str = r#"{"id":"9","channel_id":"42","content":"pls beg"}"#;

    /// Replays canned responses and records every request it was given.
    #[derive(Debug, Default)]
    struct Scripted {
        responses: RefCell<VecDeque<HttpResponse>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(script: &[(u16, &str)]) -> Self {
            let responses = script
                .iter()
                .map(|(status, body)| HttpResponse {
                    status: *status,
                    headers: Vec::new(),
                    body: (*body).to_string(),
                })
                .collect();
            Self {
                responses: RefCell::new(responses),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.requests.borrow().iter().map(|r| r.url.clone()).collect()
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ApiError::Transport("script exhausted".to_string()))
        }
    }

    #[derive(Debug, Default)]
    struct Recorded(RefCell<Vec<Duration>>);

    impl Pause for &Recorded {
        fn pause(&self, duration: Duration) {
            self.0.borrow_mut().push(duration);
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("tok").with_base_url("http://mock")
    }

    #[test]
    fn connect_caches_user() {
        let transport = Scripted::new(&[(200, USER_JSON)]);
        let session = Session::with_transport(&config(), &transport).unwrap();
        assert_eq!(session.user().tag(), "Nelly#1337");
        assert_eq!(transport.urls(), vec!["http://mock/users/@me"]);
    }

    #[test]
    fn connect_without_token_sends_nothing() {
        let transport = Scripted::new(&[]);
        let err = Session::with_transport(&ClientConfig::new(""), &transport).unwrap_err();
        assert!(matches!(err, ApiError::NoToken));
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn connect_wraps_user_fetch_failure() {
        let transport = Scripted::new(&[(401, "")]);
        let err = Session::with_transport(&config(), &transport).unwrap_err();
        match err {
            ApiError::UserInfo(inner) => assert!(matches!(*inner, ApiError::Unauthorized)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn send_without_typing_posts_once() {
        let transport = Scripted::new(&[(200, USER_JSON), (200, MESSAGE_JSON)]);
        let pause = Recorded::default();
        let session = Session::with_parts(&config(), &transport, &pause).unwrap();

        let message = session.send_message("pls beg", "42", Duration::ZERO).unwrap();
        assert_eq!(message.id, "9");
        assert_eq!(
            transport.urls(),
            vec!["http://mock/users/@me", "http://mock/channels/42/messages"]
        );
        assert!(pause.0.borrow().is_empty());
    }

    #[test]
    fn send_with_typing_refreshes_indicator() {
        let transport = Scripted::new(&[
            (200, USER_JSON),
            (204, ""),
            (204, ""),
            (204, ""),
            (200, MESSAGE_JSON),
        ]);
        let pause = Recorded::default();
        let session = Session::with_parts(&config(), &transport, &pause).unwrap();

        session
            .send_message("pls beg", "42", Duration::from_millis(25_000))
            .unwrap();

        let requests = transport.requests.borrow();
        let typing: Vec<_> = requests.iter().filter(|r| r.url.ends_with("/typing")).collect();
        assert_eq!(typing.len(), 3);
        assert!(typing.iter().all(|r| r.method == HttpMethod::Post && r.body.is_none()));
        assert!(requests.last().unwrap().url.ends_with("/messages"));
        assert_eq!(
            *pause.0.borrow(),
            vec![Duration::from_secs(10), Duration::from_secs(10), Duration::from_secs(5)]
        );
    }

    #[test]
    fn typing_failure_aborts_send() {
        let transport = Scripted::new(&[(200, USER_JSON), (403, "")]);
        let pause = Recorded::default();
        let session = Session::with_parts(&config(), &transport, &pause).unwrap();

        let err = session
            .send_message("pls beg", "42", Duration::from_secs(3))
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
        assert!(!transport.urls().iter().any(|u| u.ends_with("/messages")));
        assert!(pause.0.borrow().is_empty());
    }

    #[test]
    fn huge_typing_duration_walks_lazily() {
        let transport = Scripted::new(&[(200, USER_JSON), (204, ""), (429, "")]);
        let pause = Recorded::default();
        let session = Session::with_parts(&config(), &transport, &pause).unwrap();

        let err = session
            .send_message("pls beg", "42", Duration::MAX)
            .unwrap_err();
        assert!(matches!(err, ApiError::TooManyRequests { .. }));
        assert_eq!(*pause.0.borrow(), vec![Duration::from_secs(10)]);
        assert!(!transport.urls().iter().any(|u| u.ends_with("/messages")));
    }

    #[test]
    fn invalid_input_sends_nothing() {
        let transport = Scripted::new(&[(200, USER_JSON)]);
        let pause = Recorded::default();
        let session = Session::with_parts(&config(), &transport, &pause).unwrap();

        let err = session.send_message("hi", "", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ApiError::NoChannelId));
        let err = session.send_message("", "42", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ApiError::NoContent));
        assert_eq!(transport.requests.borrow().len(), 1);
    }

    #[test]
    fn current_user_does_not_touch_cache() {
        let renamed = r#"{"id":"1","username":"Renamed","discriminator":"1337"}"#;
        let transport = Scripted::new(&[(200, USER_JSON), (200, renamed), (200, renamed)]);
        let mut session = Session::with_transport(&config(), &transport).unwrap();

        assert_eq!(session.current_user().unwrap().username, "Renamed");
        assert_eq!(session.user().username, "Nelly");

        session.refresh_user().unwrap();
        assert_eq!(session.user().username, "Renamed");
    }
}
