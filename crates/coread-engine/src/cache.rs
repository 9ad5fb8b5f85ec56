//! # Thread Cache
//!
//! Full thread contents keyed by thread id, for the currently loaded
//! document only. Switching documents calls [`ThreadCache::reset`].
//!
//! Reads are local-first: [`ThreadCache::get_or_fetch`] goes to the remote
//! collaborator only on a miss, and a failed fetch leaves the cache untouched
//! so the next request retries. Once a thread is cached it is only ever
//! extended through [`ThreadCache::append_messages`].

use std::collections::HashMap;

use crate::models::{DocumentId, Message, Thread, ThreadId};
use crate::remote::{ReaderApi, RemoteError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("failed to fetch thread {thread_id}: {source}")]
    FetchFailed {
        thread_id: ThreadId,
        #[source]
        source: RemoteError,
    },
    #[error("thread {0} is not cached")]
    NotCached(ThreadId),
}

#[derive(Debug, Default)]
pub struct ThreadCache {
    document_id: Option<DocumentId>,
    threads: HashMap<ThreadId, Thread>,
}

impl ThreadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialise for a freshly loaded document, pre-seeded with any full
    /// threads already at hand
    pub fn seed(&mut self, document_id: DocumentId, threads: impl IntoIterator<Item = Thread>) {
        self.reset();
        self.threads = threads
            .into_iter()
            .map(|thread| (thread.thread_id.clone(), thread))
            .collect();
        log::info!(
            "thread cache seeded for document {document_id} with {} threads",
            self.threads.len()
        );
        self.document_id = Some(document_id);
    }

    /// Return the cached thread, fetching it on a miss.
    pub async fn get_or_fetch(
        &mut self,
        thread_id: &ThreadId,
        api: &dyn ReaderApi,
    ) -> Result<&Thread, CacheError> {
        if self.threads.contains_key(thread_id) {
            log::debug!("thread cache hit for {thread_id}");
        } else {
            log::debug!("thread cache miss for {thread_id}, fetching");
            let thread = api.fetch_thread(thread_id).await.map_err(|source| {
                log::warn!("fetching thread {thread_id} failed: {source}");
                CacheError::FetchFailed {
                    thread_id: thread_id.clone(),
                    source,
                }
            })?;
            self.put_full(thread);
        }

        self.threads
            .get(thread_id)
            .ok_or_else(|| CacheError::NotCached(thread_id.clone()))
    }

    /// Store a full thread, replacing any cached copy
    pub fn put_full(&mut self, thread: Thread) {
        self.threads.insert(thread.thread_id.clone(), thread);
    }

    /// Append messages to a cached thread in the given order.
    ///
    /// `updated_at` moves to the latest appended timestamp and never
    /// backwards. Unknown threads are left alone.
    pub fn append_messages(
        &mut self,
        thread_id: &ThreadId,
        messages: Vec<Message>,
    ) -> Result<&Thread, CacheError> {
        let thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| CacheError::NotCached(thread_id.clone()))?;

        if let Some(latest) = messages.iter().map(|m| m.timestamp).max()
            && latest > thread.updated_at
        {
            thread.updated_at = latest;
        }
        thread.messages.extend(messages);

        Ok(thread)
    }

    /// Drop all cached threads and forget the current document
    pub fn reset(&mut self) {
        if let Some(document_id) = self.document_id.take() {
            log::info!("thread cache reset (was document {document_id})");
        }
        self.threads.clear();
    }

    pub fn get(&self, thread_id: &ThreadId) -> Option<&Thread> {
        self.threads.get(thread_id)
    }

    pub fn contains(&self, thread_id: &ThreadId) -> bool {
        self.threads.contains_key(thread_id)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document_id.as_ref()
    }
}
