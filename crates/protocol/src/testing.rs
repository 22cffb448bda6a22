//! In-memory [`Transport`] for tests.
//!
//! [`MockTransport`] records every request it is given and answers with
//! scripted [`MockReply`] values. Available to this crate's tests and, with
//! the `test-support` feature, to downstream crates.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{OutboundRequest, Transport, TransportError, TransportResponse};

/// A scripted answer.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Respond with `status` and `body`.
    Respond {
        /// HTTP status code.
        status: u16,
        /// Response body bytes.
        body: Vec<u8>,
    },
    /// Respond with `status`, then fail while the body is read.
    BrokenBody {
        /// HTTP status code.
        status: u16,
    },
    /// Fail before any response is produced.
    Fail(TransportError),
}

impl MockReply {
    /// Response with the given status and body.
    pub fn respond(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::Respond {
            status,
            body: body.into(),
        }
    }

    /// Response with the given status and an empty body.
    pub fn status(status: u16) -> Self {
        Self::respond(status, Vec::new())
    }

    /// Connection failure.
    pub fn connection_refused() -> Self {
        Self::Fail(TransportError::ConnectionFailed(
            "connection refused".to_string(),
        ))
    }
}

/// Records requests and plays back scripted replies.
///
/// Replies queued with [`MockTransport::push`] are used first, in order; once
/// the queue is empty every request gets the default reply.
#[derive(Debug)]
pub struct MockTransport {
    default_reply: MockReply,
    queued: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<OutboundRequest>>,
    body_reads: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Answers every request with `reply`.
    pub fn always(reply: MockReply) -> Self {
        Self {
            default_reply: reply,
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            body_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queues a one-off reply ahead of the default.
    pub fn push(&self, reply: MockReply) {
        lock(&self.queued).push_back(reply);
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        lock(&self.requests).clone()
    }

    /// How many times a response body has been read.
    pub fn body_reads(&self) -> usize {
        self.body_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: OutboundRequest,
    ) -> Result<Box<dyn TransportResponse>, TransportError> {
        lock(&self.requests).push(request);

        let reply = lock(&self.queued)
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        let (status, body) = match reply {
            MockReply::Respond { status, body } => (status, Ok(body)),
            MockReply::BrokenBody { status } => (
                status,
                Err(TransportError::Body("connection reset".to_string())),
            ),
            MockReply::Fail(e) => return Err(e),
        };

        Ok(Box::new(MockResponse {
            status,
            body: Some(body),
            reads: Arc::clone(&self.body_reads),
        }))
    }
}

struct MockResponse {
    status: u16,
    body: Option<Result<Vec<u8>, TransportError>>,
    reads: Arc<AtomicUsize>,
}

#[async_trait]
impl TransportResponse for MockResponse {
    fn status(&self) -> u16 {
        self.status
    }

    async fn read_body(&mut self) -> Result<Vec<u8>, TransportError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.body.take().unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn lock<V>(mutex: &Mutex<V>) -> std::sync::MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
