use std::{fmt, time::Duration};

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tokio::time::timeout;

use crate::config::ValidatorConfig;

// HLS media segments are served as video/mp2t; octet-stream is a common
// mislabel for Icecast/Shoutcast audio.
const PLAYABLE_CONTENT_TYPES: &[&str] = &["audio", "ogg", "video/mp2t", "application/octet-stream"];

/// Why a stream was classified as not playable. `Display` is the
/// operator-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("Status {0}")]
    Status(u16),
    #[error("Timeout")]
    Timeout,
    #[error("Connection Error")]
    Connection,
    #[error("HTML Page (Not Audio)")]
    HtmlPage,
    #[error("Invalid Type: {0}")]
    InvalidType(String),
    #[error("{0}")]
    Transport(String),
    #[error("Probe task failed: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Playable,
    Dead(ProbeFailure),
}

impl ProbeOutcome {
    pub fn is_playable(&self) -> bool {
        matches!(self, ProbeOutcome::Playable)
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Playable => f.write_str("OK"),
            ProbeOutcome::Dead(failure) => write!(f, "{failure}"),
        }
    }
}

/// Classifies a single stream URL with a header-only request, falling back to
/// a streamed GET whose body is never read when the server answers HEAD with
/// 404 or 405.
#[derive(Debug, Clone)]
pub struct StreamProber {
    client: Client,
    timeout: Duration,
}

impl StreamProber {
    pub fn new(config: &ValidatorConfig) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(config.user_agent.clone()).build()?;
        Ok(Self::with_client(client, config.timeout()))
    }

    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.fetch_headers(url).await {
            Ok((status, content_type)) => classify_response(status, &content_type),
            Err(failure) => ProbeOutcome::Dead(failure),
        }
    }

    async fn fetch_headers(&self, url: &str) -> Result<(StatusCode, String), ProbeFailure> {
        let mut response = self.send(self.client.head(url)).await?;
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
        ) {
            response = self.send(self.client.get(url)).await?;
        }

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        // Dropping the response closes the connection without reading the body.
        drop(response);
        Ok((status, content_type))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ProbeFailure> {
        timeout(self.timeout, request.send())
            .await
            .map_err(|_| ProbeFailure::Timeout)?
            .map_err(classify_transport_error)
    }
}

pub fn classify_response(status: StatusCode, content_type: &str) -> ProbeOutcome {
    if status.as_u16() >= 400 {
        return ProbeOutcome::Dead(ProbeFailure::Status(status.as_u16()));
    }

    let lower = content_type.to_ascii_lowercase();
    if PLAYABLE_CONTENT_TYPES
        .iter()
        .any(|candidate| lower.contains(candidate))
    {
        return ProbeOutcome::Playable;
    }
    if lower.contains("text/html") {
        return ProbeOutcome::Dead(ProbeFailure::HtmlPage);
    }
    ProbeOutcome::Dead(ProbeFailure::InvalidType(lower))
}

fn classify_transport_error(error: reqwest::Error) -> ProbeFailure {
    if error.is_timeout() {
        ProbeFailure::Timeout
    } else if error.is_connect() {
        ProbeFailure::Connection
    } else {
        ProbeFailure::Transport(error.to_string())
    }
}
