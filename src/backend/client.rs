use crate::backend::models::{Session, User};
use crate::backend::{Backend, SESSION_ENDED_EVENT, Subscription};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend reached over HTTP with a bearer token.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: String,
    timeout: Duration,
    session_ended_event: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout: DEFAULT_TIMEOUT,
            session_ended_event: SESSION_ENDED_EVENT.to_string(),
        }
    }

    /// Per-request timeout. The event stream is exempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_ended_event(mut self, name: &str) -> Self {
        self.session_ended_event = name.to_string();
        self
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.timeout(self.timeout).send().await?;
        let response = check_status(response, what)?;

        response
            .json::<T>()
            .await
            .map_err(|err| SyncError::Transport(format!("failed to parse {} response: {}", what, err)))
    }
}

fn check_status(response: Response, what: &str) -> Result<Response> {
    if !response.status().is_success() {
        return Err(SyncError::Transport(format!(
            "{} API error: status {}",
            what,
            response.status()
        )));
    }
    Ok(response)
}

/// Longest event line kept while waiting for its newline.
const MAX_EVENT_LINE: usize = 16 * 1024;

/// Splits a byte stream into lines. A line that outgrows
/// [`MAX_EVENT_LINE`] without a newline is discarded.
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
    overflowed: bool,
    finished: bool,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                if !self.overflowed {
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                }
                self.pending.clear();
                self.overflowed = false;
            } else if !self.overflowed {
                self.pending.push(byte);
                if self.pending.len() > MAX_EVENT_LINE {
                    warn!(limit = MAX_EVENT_LINE, "Dropping oversized event line");
                    self.pending = Vec::new();
                    self.overflowed = true;
                }
            }
        }
        lines
    }

    /// Trailing line left when the stream closed without a final newline.
    fn finish(&mut self) -> Option<String> {
        self.finished = true;
        let rest = std::mem::take(&mut self.pending);
        if self.overflowed || rest.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Event name carried by one line of the event stream. Accepts bare names
/// and server-sent-event `data:` lines.
fn event_name(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix("data:").map(str::trim).unwrap_or(line)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn start_session(&self) -> Result<Option<Session>> {
        self.fetch(self.post("/session/start"), "start session").await
    }

    async fn stop_session(&self) -> Result<bool> {
        self.fetch(self.post("/session/stop"), "stop session").await
    }

    async fn get_session(&self) -> Result<Option<Session>> {
        // Backend returns null when no session was ever started
        self.fetch(self.get("/session"), "get session").await
    }

    async fn get_user(&self) -> Result<Option<User>> {
        self.fetch(self.get("/user"), "get user").await
    }

    async fn get_time_tracked_today(&self) -> Result<u64> {
        self.fetch(self.get("/tracked/today"), "get time tracked today")
            .await
    }

    async fn subscribe_session_ended(&self) -> Result<Subscription> {
        let response = self.get("/events").send().await?;
        let mut response = check_status(response, "subscribe")?;

        let (tx, rx) = mpsc::channel(8);
        let wanted = self.session_ended_event.clone();

        let pump = tokio::spawn(async move {
            let mut lines = LineBuffer::default();
            loop {
                let received = match response.chunk().await {
                    Ok(Some(chunk)) => lines.push(&chunk),
                    Ok(None) => {
                        warn!("Backend closed the event stream");
                        lines.finish().into_iter().collect()
                    }
                    Err(err) => {
                        warn!(error = %err, "Event stream failed");
                        return;
                    }
                };
                for line in received {
                    if event_name(&line) != wanted {
                        continue;
                    }
                    debug!(event = %wanted, "Backend notification received");
                    if tx.send(()).await.is_err() {
                        return;
                    }
                }
                if lines.is_finished() {
                    return;
                }
            }
        });

        Ok(Subscription::with_pump(rx, pump))
    }
}
