//! Remote collaborators.
//!
//! The engine never talks to the network itself. Document retrieval, thread
//! retrieval and message sending go through [`ReaderApi`], implemented by the
//! host (HTTP client, offline stub, test fake). Timeouts and retries belong
//! to the implementation; the engine only distinguishes success from failure.
//!
//! Everything runs on a single UI thread, so futures are not required to be
//! `Send`.

use async_trait::async_trait;

use crate::models::{Document, DocumentId, Message, SendRequest, Thread, ThreadId, ThreadSummary};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("remote service unavailable")]
    Unavailable,
}

#[async_trait(?Send)]
pub trait ReaderApi {
    async fn fetch_document(&self, document_id: &DocumentId) -> Result<Document, RemoteError>;

    /// Summary list of all threads generated for a document
    async fn list_threads(&self, document_id: &DocumentId)
    -> Result<Vec<ThreadSummary>, RemoteError>;

    /// Full thread including message history
    async fn fetch_thread(&self, thread_id: &ThreadId) -> Result<Thread, RemoteError>;

    /// Store a reader message; may also return agent replies
    async fn send_message(&self, request: &SendRequest) -> Result<Vec<Message>, RemoteError>;

    /// Ask the agents to continue a discussion
    async fn generate_more(&self, thread_id: &ThreadId) -> Result<Vec<Message>, RemoteError>;
}

/// Collaborator for sessions without a backend: every call fails with
/// [`RemoteError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineApi;

#[async_trait(?Send)]
impl ReaderApi for OfflineApi {
    async fn fetch_document(&self, _document_id: &DocumentId) -> Result<Document, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn list_threads(
        &self,
        _document_id: &DocumentId,
    ) -> Result<Vec<ThreadSummary>, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn fetch_thread(&self, _thread_id: &ThreadId) -> Result<Thread, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn send_message(&self, _request: &SendRequest) -> Result<Vec<Message>, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn generate_more(&self, _thread_id: &ThreadId) -> Result<Vec<Message>, RemoteError> {
        Err(RemoteError::Unavailable)
    }
}
