/*
    transport.rs - Transport seam

    The library never opens connections. Whatever moves frames to and from
    the server implements Transport; operations only see request in,
    response out.

    ReplayTransport answers from a queue of canned responses, for tests and
    for replaying captured traffic.
*/

use crate::core_proto::errors::TransportError;
use crate::core_proto::message::ProtocolMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

/// One request/response exchange with the server
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and wait for its response.
    ///
    /// Connection handling, timeouts and retries all live behind this call.
    async fn exchange(&self, request: ProtocolMessage) -> Result<ProtocolMessage, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn exchange(&self, request: ProtocolMessage) -> Result<ProtocolMessage, TransportError> {
        (**self).exchange(request).await
    }
}

/// Shared transport handle
pub type TransportHandle = Arc<dyn Transport>;

/// Transport that replays queued responses in order
#[derive(Default)]
pub struct ReplayTransport {
    responses: Mutex<VecDeque<Result<ProtocolMessage, TransportError>>>,
    requests: Mutex<Vec<ProtocolMessage>>,
}

impl ReplayTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from responses that all succeed
    pub fn from_responses<I: IntoIterator<Item = ProtocolMessage>>(responses: I) -> Self {
        ReplayTransport {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push_response(&self, response: ProtocolMessage) {
        self.responses.lock().await.push_back(Ok(response));
    }

    pub async fn push_failure(&self, error: TransportError) {
        self.responses.lock().await.push_back(Err(error));
    }

    /// Responses not yet handed out
    pub async fn pending(&self) -> usize {
        self.responses.lock().await.len()
    }

    /// Requests seen so far, oldest first
    pub async fn requests(&self) -> Vec<ProtocolMessage> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Transport for ReplayTransport {
    async fn exchange(&self, request: ProtocolMessage) -> Result<ProtocolMessage, TransportError> {
        trace!(code = request.code(), "replaying response");
        self.requests.lock().await.push(request);

        match self.responses.lock().await.pop_front() {
            Some(response) => response,
            None => Err(TransportError::Connection("replay queue exhausted".to_string())),
        }
    }
}
