//! # Reader Session
//!
//! State for one open document: its sections, the thread list, the thread
//! cache, the current selection, in-flight sends, and marker positions per
//! section.
//!
//! A session is an ordinary value owned by the host UI. Opening another
//! document goes through [`ReaderSession::switch_document`], which resets the
//! cache before the new document is installed.
//!
//! ## Marker passes
//!
//! Each section gets its own [`MarkerPositioner`]. Changing the thread set or
//! the selection schedules a `ThreadsChanged` pass on every positioner; the
//! host checks [`MarkerPositioner::needs_pass`] after committing a section
//! and runs the measurement.

use std::collections::HashMap;

use crate::cache::{CacheError, ThreadCache};
use crate::markers::{LayoutTrigger, MarkerPositioner};
use crate::models::{Document, DocumentId, Section, SectionId, Thread, ThreadId, ThreadSummary};
use crate::outbox::{OutgoingMessage, Outbox, SendError, SendOutcome};
use crate::remote::{ReaderApi, RemoteError};
use crate::segments::{SectionRender, resolve_section};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown section: {0}")]
    UnknownSection(SectionId),
    #[error("unknown thread: {0}")]
    UnknownThread(ThreadId),
    #[error("failed to load document {document_id}: {source}")]
    LoadFailed {
        document_id: DocumentId,
        #[source]
        source: RemoteError,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Send(#[from] SendError),
}

#[derive(Debug)]
pub struct ReaderSession {
    document: Document,
    threads: Vec<ThreadSummary>,
    cache: ThreadCache,
    outbox: Outbox,
    selected: Option<ThreadId>,
    positioners: HashMap<SectionId, MarkerPositioner>,
}

impl ReaderSession {
    /// Open a document whose full threads are already at hand, e.g. offline
    /// pipeline output. The cache is seeded with every thread.
    pub fn load(document: Document, threads: Vec<Thread>) -> Self {
        let summaries = threads.iter().map(Thread::summary).collect();
        Self::open(document, summaries, threads)
    }

    /// Fetch a document and its thread list. Full threads are fetched lazily
    /// on selection.
    pub async fn load_remote(
        document_id: &DocumentId,
        api: &dyn ReaderApi,
    ) -> Result<Self, SessionError> {
        let (document, summaries) = fetch_document(document_id, api).await?;
        Ok(Self::open(document, summaries, Vec::new()))
    }

    /// Replace the open document with another one from the backend.
    ///
    /// The current document stays open when loading fails.
    pub async fn switch_document(
        &mut self,
        document_id: &DocumentId,
        api: &dyn ReaderApi,
    ) -> Result<(), SessionError> {
        let (document, summaries) = fetch_document(document_id, api).await?;
        self.cache.reset();
        *self = Self::open(document, summaries, Vec::new());
        Ok(())
    }

    fn open(document: Document, threads: Vec<ThreadSummary>, full: Vec<Thread>) -> Self {
        log::info!(
            "opened document {} ({} sections, {} threads)",
            document.document_id,
            document.parsed_content.sections.len(),
            threads.len()
        );
        let mut cache = ThreadCache::new();
        cache.seed(document.document_id.clone(), full);

        Self {
            document,
            threads,
            cache,
            outbox: Outbox::new(),
            selected: None,
            positioners: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Sections in reading order
    pub fn sections(&self) -> Vec<&Section> {
        self.document.sections_in_order()
    }

    pub fn threads(&self) -> &[ThreadSummary] {
        &self.threads
    }

    /// Threads anchored to `section_id`, in list order
    pub fn threads_in_section<'a>(
        &'a self,
        section_id: &'a SectionId,
    ) -> impl Iterator<Item = &'a ThreadSummary> + 'a {
        self.threads
            .iter()
            .filter(move |t| &t.anchor.section_id == section_id)
    }

    pub fn selected(&self) -> Option<&ThreadId> {
        self.selected.as_ref()
    }

    /// Full contents of the selected thread, once loaded
    pub fn selected_thread(&self) -> Option<&Thread> {
        self.selected.as_ref().and_then(|id| self.cache.get(id))
    }

    pub fn cache(&self) -> &ThreadCache {
        &self.cache
    }

    /// Select a thread, loading its full contents local-first.
    ///
    /// The previous selection is kept when the thread cannot be loaded.
    pub async fn select(
        &mut self,
        thread_id: &ThreadId,
        api: &dyn ReaderApi,
    ) -> Result<&Thread, SessionError> {
        if !self.threads.iter().any(|t| &t.thread_id == thread_id) {
            return Err(SessionError::UnknownThread(thread_id.clone()));
        }
        self.cache.get_or_fetch(thread_id, api).await?;
        self.sync_message_count(thread_id);

        if self.selected.as_ref() != Some(thread_id) {
            self.selected = Some(thread_id.clone());
            self.invalidate_markers(LayoutTrigger::ThreadsChanged);
        }
        self.cache
            .get(thread_id)
            .ok_or_else(|| CacheError::NotCached(thread_id.clone()).into())
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.invalidate_markers(LayoutTrigger::ThreadsChanged);
        }
    }

    /// Resolve anchors and build segments for one section
    pub fn render_section(&self, section_id: &SectionId) -> Result<SectionRender, SessionError> {
        let section = self
            .document
            .section(section_id)
            .ok_or_else(|| SessionError::UnknownSection(section_id.clone()))?;
        Ok(resolve_section(
            section,
            &self.threads,
            self.selected.as_ref(),
        ))
    }

    pub fn positioner(&self, section_id: &SectionId) -> Option<&MarkerPositioner> {
        self.positioners.get(section_id)
    }

    /// Marker positions for a section, created with an initial pass pending
    pub fn positioner_mut(&mut self, section_id: &SectionId) -> &mut MarkerPositioner {
        self.positioners
            .entry(section_id.clone())
            .or_insert_with(|| {
                let mut positioner = MarkerPositioner::new();
                positioner.schedule(LayoutTrigger::ThreadsChanged);
                positioner
            })
    }

    /// Schedule a pass on every section, e.g. after a viewport resize
    pub fn invalidate_markers(&mut self, trigger: LayoutTrigger) {
        for positioner in self.positioners.values_mut() {
            positioner.schedule(trigger);
        }
    }

    /// Send a reader message to the selected thread
    pub async fn send(
        &mut self,
        body: &str,
        api: &dyn ReaderApi,
    ) -> Result<SendOutcome, SessionError> {
        let outgoing = self.begin_send(body)?;
        self.finish_send(outgoing, api).await
    }

    /// Validate `body` for the selected thread and mark it as sending.
    ///
    /// The thread reports [`is_sending`](Self::is_sending) until the returned
    /// message is passed to [`finish_send`](Self::finish_send), so a host can
    /// show the pending state before it awaits the network.
    pub fn begin_send(&mut self, body: &str) -> Result<OutgoingMessage, SessionError> {
        let thread_id = self.selected.clone().ok_or(SendError::NoThreadSelected)?;
        if !self.cache.contains(&thread_id) {
            return Err(CacheError::NotCached(thread_id).into());
        }
        Ok(self.outbox.begin(&thread_id, body)?)
    }

    pub async fn finish_send(
        &mut self,
        outgoing: OutgoingMessage,
        api: &dyn ReaderApi,
    ) -> Result<SendOutcome, SessionError> {
        let thread_id = outgoing.thread_id().clone();
        let result = api.send_message(outgoing.request()).await;
        let outcome = self.outbox.complete(&mut self.cache, outgoing, result)?;
        self.sync_message_count(&thread_id);
        Ok(outcome)
    }

    pub fn is_sending(&self, thread_id: &ThreadId) -> bool {
        self.outbox.is_pending(thread_id)
    }

    /// Ask the agents for more turns in a discussion and append them.
    ///
    /// Unlike a send, a failure appends nothing.
    pub async fn continue_discussion(
        &mut self,
        thread_id: &ThreadId,
        api: &dyn ReaderApi,
    ) -> Result<&Thread, SessionError> {
        self.cache.get_or_fetch(thread_id, api).await?;
        let messages = api.generate_more(thread_id).await.map_err(|source| {
            log::warn!("generating more turns for thread {thread_id} failed: {source}");
            CacheError::FetchFailed {
                thread_id: thread_id.clone(),
                source,
            }
        })?;
        self.cache.append_messages(thread_id, messages)?;
        self.sync_message_count(thread_id);

        self.cache
            .get(thread_id)
            .ok_or_else(|| CacheError::NotCached(thread_id.clone()).into())
    }

    /// Keep the list's message count in step with the cached thread
    fn sync_message_count(&mut self, thread_id: &ThreadId) {
        if let Some(thread) = self.cache.get(thread_id)
            && let Some(summary) = self.threads.iter_mut().find(|t| &t.thread_id == thread_id)
        {
            summary.message_count = thread.messages.len();
        }
    }
}

async fn fetch_document(
    document_id: &DocumentId,
    api: &dyn ReaderApi,
) -> Result<(Document, Vec<ThreadSummary>), SessionError> {
    let load_failed = |source| SessionError::LoadFailed {
        document_id: document_id.clone(),
        source,
    };
    let document = api.fetch_document(document_id).await.map_err(load_failed)?;
    let threads = api.list_threads(document_id).await.map_err(load_failed)?;
    Ok((document, threads))
}
