//! Outbound HTTP seam.
//!
//! The dispatcher talks to the registration API through the [`Transport`]
//! trait so tests can substitute scripted doubles and applications can reuse
//! an existing HTTP client. [`HttpTransport`] is the production
//! implementation: a `POST` with a JSON body and the detached signature in a
//! `Signature` header. [`RecordingTransport`] replays scripted responses and
//! records everything sent, for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};

/// Production document-creation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Raw response from the registration API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, read to completion.
    pub body: String,
}

/// Errors raised while building or performing the outbound call.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// HTTP client construction failed.
    #[error("client build: {0}")]
    Build(#[source] reqwest::Error),
    /// The signature contains bytes that cannot appear in an HTTP header.
    #[error("invalid signature header: {0}")]
    InvalidSignature(#[from] reqwest::header::InvalidHeaderValue),
    /// The request failed before a response arrived, or the body could not
    /// be read.
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    /// Failure raised by a non-HTTP transport implementation.
    #[error("transport: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Where serialized documents get sent.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Performs one document-creation call and returns the raw response.
    async fn send(&self, body: String, signature: &str)
        -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Transport against the production endpoint.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Transport against a custom endpoint (staging, sandboxes, local stubs).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().build().map_err(TransportError::Build)?;
        Ok(Self::from_client(client, endpoint))
    }

    /// Reuses an existing `reqwest` client, sharing its connection pool.
    pub fn from_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    /// The endpoint this transport posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        body: String,
        signature: &str,
    ) -> Result<TransportResponse, TransportError> {
        let signature = HeaderValue::from_str(signature)?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header("Signature", signature)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// One request captured by a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    /// Serialized payload that was sent.
    pub body: String,
    /// Signature header value that accompanied it.
    pub signature: String,
}

#[derive(Debug)]
enum ScriptedReply {
    Respond(TransportResponse),
    Fail(String),
}

/// Test transport that records every send and replays scripted replies.
///
/// Replies queued with [`push_response`](Self::push_response) and
/// [`push_failure`](Self::push_failure) are consumed in order; once the
/// script is exhausted every call is answered with `200 "ok"`. Clones share
/// the same script and recording.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    sent: Arc<Mutex<Vec<SentRequest>>>,
    latency: Option<Duration>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            latency: None,
        }
    }

    /// Simulates a round trip of `latency` before every reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queues a scripted HTTP response.
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script
            .lock()
            .expect("transport script poisoned")
            .push_back(ScriptedReply::Respond(TransportResponse { status, body: body.into() }));
    }

    /// Queues a scripted transport failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .expect("transport script poisoned")
            .push_back(ScriptedReply::Fail(message.into()));
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().expect("transport recording poisoned").clone()
    }

    /// Number of sends observed so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("transport recording poisoned").len()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        body: String,
        signature: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.sent
            .lock()
            .expect("transport recording poisoned")
            .push(SentRequest { body, signature: signature.to_string() });

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let reply = self.script.lock().expect("transport script poisoned").pop_front();
        match reply {
            Some(ScriptedReply::Respond(response)) => Ok(response),
            Some(ScriptedReply::Fail(message)) => Err(TransportError::Other(message.into())),
            None => Ok(TransportResponse { status: 200, body: "ok".to_string() }),
        }
    }
}
