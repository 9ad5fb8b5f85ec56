//! Sending reader messages into a thread.
//!
//! A send is split in two so the UI can disable input while the request is in
//! flight: [`Outbox::begin`] validates the body and marks the thread pending,
//! [`Outbox::complete`] records the result in the [`ThreadCache`].
//!
//! The reader's message is never lost. When the remote call fails, a local
//! copy is appended anyway with [`Delivery::LocalOnly`] and the caller gets
//! [`SendOutcome::Failed`] to surface a notice.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::cache::{CacheError, ThreadCache};
use crate::models::{Author, Delivery, Message, MessageId, SendRequest, ThreadId};
use crate::remote::{ReaderApi, RemoteError};
use crate::tags::parse_tagged_agent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a message is already being sent to thread {0}")]
    AlreadyPending(ThreadId),
    #[error("no thread is selected")]
    NoThreadSelected,
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// How a completed send ended up
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Messages stored by the server, in the order they were appended
    Confirmed(Vec<Message>),
    /// The server was not reached; a local-only copy was appended instead
    Failed(RemoteError),
}

impl SendOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SendOutcome::Confirmed(_))
    }
}

/// A validated message waiting for its remote round trip
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    request: SendRequest,
}

impl OutgoingMessage {
    pub fn thread_id(&self) -> &ThreadId {
        &self.request.thread_id
    }

    pub fn request(&self) -> &SendRequest {
        &self.request
    }

    /// Stand-in for the reader's message when the server never stored it
    fn local_copy(&self, error: &RemoteError) -> Message {
        Message {
            message_id: MessageId(format!("msg_{}", Uuid::new_v4().simple())),
            thread_id: self.request.thread_id.clone(),
            author: Author::User,
            content: self.request.content.clone(),
            references: Vec::new(),
            tagged_agent: self.request.tagged_agent,
            timestamp: Utc::now(),
            delivery: Delivery::LocalOnly {
                reason: error.to_string(),
            },
        }
    }
}

/// Tracks which threads have a send in flight
#[derive(Debug, Default)]
pub struct Outbox {
    pending: HashSet<ThreadId>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `body` and mark the thread as sending
    pub fn begin(&mut self, thread_id: &ThreadId, body: &str) -> Result<OutgoingMessage, SendError> {
        let content = body.trim();
        if content.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if self.pending.contains(thread_id) {
            return Err(SendError::AlreadyPending(thread_id.clone()));
        }

        self.pending.insert(thread_id.clone());
        Ok(OutgoingMessage {
            request: SendRequest {
                thread_id: thread_id.clone(),
                content: content.to_string(),
                tagged_agent: parse_tagged_agent(content),
            },
        })
    }

    /// Record the result of a send and release the thread.
    ///
    /// Appends the server's messages on success and a local-only copy of the
    /// reader's message on failure.
    pub fn complete(
        &mut self,
        cache: &mut ThreadCache,
        outgoing: OutgoingMessage,
        result: Result<Vec<Message>, RemoteError>,
    ) -> Result<SendOutcome, SendError> {
        self.pending.remove(outgoing.thread_id());

        let (messages, outcome) = match result {
            Ok(messages) => (messages.clone(), SendOutcome::Confirmed(messages)),
            Err(err) => {
                log::warn!(
                    "sending to thread {} failed, keeping local copy: {err}",
                    outgoing.thread_id()
                );
                (vec![outgoing.local_copy(&err)], SendOutcome::Failed(err))
            }
        };

        cache.append_messages(outgoing.thread_id(), messages)?;
        Ok(outcome)
    }

    /// Validate, send and record in one step
    pub async fn send(
        &mut self,
        cache: &mut ThreadCache,
        api: &dyn ReaderApi,
        thread_id: &ThreadId,
        body: &str,
    ) -> Result<SendOutcome, SendError> {
        if !cache.contains(thread_id) {
            return Err(CacheError::NotCached(thread_id.clone()).into());
        }
        let outgoing = self.begin(thread_id, body)?;
        let result = api.send_message(outgoing.request()).await;
        self.complete(cache, outgoing, result)
    }

    pub fn is_pending(&self, thread_id: &ThreadId) -> bool {
        self.pending.contains(thread_id)
    }
}
