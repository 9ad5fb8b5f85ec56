//! Shared fixtures and an in-memory remote collaborator for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::{
    AgentId, Anchor, Author, DiscussionType, Document, DocumentId, Message, MessageId,
    ParsedContent, Section, SectionId, SendRequest, Thread, ThreadId, ThreadSummary, ThreadType,
};
use crate::remote::{ReaderApi, RemoteError};

/// Fixed reference time all fixtures are built around
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
}

/// Message stamped `offset_secs` after [`base_time`]
pub fn message_at(
    thread_id: &str,
    message_id: &str,
    author: Author,
    content: &str,
    offset_secs: i64,
) -> Message {
    Message {
        message_id: MessageId::from(message_id),
        thread_id: ThreadId::from(thread_id),
        author,
        content: content.to_string(),
        references: Vec::new(),
        tagged_agent: None,
        timestamp: base_time() + Duration::seconds(offset_secs),
        delivery: Default::default(),
    }
}

/// Discussion thread anchored on `snippet` with one opening agent message
pub fn thread(thread_id: &str, section_id: &str, snippet: &str) -> Thread {
    Thread {
        thread_id: ThreadId::from(thread_id),
        document_id: Some(DocumentId::from("doc")),
        seed_id: None,
        thread_type: ThreadType::Discussion,
        discussion_type: Some(DiscussionType::Deepening),
        tension_point: format!("What does \"{snippet}\" mean here?"),
        keywords: Vec::new(),
        anchor: Anchor::new(section_id, snippet),
        participants: vec![AgentId::Critical, AgentId::Aesthetic],
        messages: vec![message_at(
            thread_id,
            &format!("{thread_id}_m1"),
            Author::Agent(AgentId::Critical),
            "Why is it blue?",
            0,
        )],
        created_at: base_time() - Duration::minutes(1),
        updated_at: base_time(),
    }
}


pub fn section(section_id: &str, order: i64, content: &str) -> Section {
    Section {
        section_id: SectionId::from(section_id),
        title: format!("Section {order}"),
        content: content.to_string(),
        order,
    }
}

pub fn document(sections: Vec<Section>, threads: &[&Thread]) -> Document {
    Document {
        document_id: DocumentId::from("doc"),
        user_id: None,
        title: "Sky Colours".to_string(),
        original_pdf_url: None,
        parsed_content: ParsedContent { sections },
        threads: threads.iter().map(|t| t.thread_id.clone()).collect(),
        uploaded_at: None,
        last_accessed_at: None,
    }
}

/// In-memory [`ReaderApi`] that records how often it is called
#[derive(Default)]
pub struct FakeApi {
    documents: HashMap<DocumentId, Document>,
    threads: HashMap<ThreadId, Thread>,
    replies: Vec<Message>,
    fail_sends: bool,
    fetch_thread_calls: Cell<usize>,
    send_calls: Cell<usize>,
    sent: RefCell<Vec<SendRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.documents.insert(document.document_id.clone(), document);
        self
    }

    pub fn with_thread(mut self, thread: Thread) -> Self {
        self.threads.insert(thread.thread_id.clone(), thread);
        self
    }

    /// Agent replies returned after the echoed user message
    pub fn with_replies(mut self, replies: Vec<Message>) -> Self {
        self.replies = replies;
        self
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn fetch_thread_calls(&self) -> usize {
        self.fetch_thread_calls.get()
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.get()
    }

    pub fn sent(&self) -> Vec<SendRequest> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ReaderApi for FakeApi {
    async fn fetch_document(&self, document_id: &DocumentId) -> Result<Document, RemoteError> {
        self.documents
            .get(document_id)
            .cloned()
            .ok_or(RemoteError::Status {
                status: 404,
                body: "Document not found".to_string(),
            })
    }

    async fn list_threads(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<ThreadSummary>, RemoteError> {
        let mut summaries: Vec<ThreadSummary> = self
            .threads
            .values()
            .filter(|t| t.document_id.as_ref() == Some(document_id))
            .map(Thread::summary)
            .collect();
        summaries.sort_by(|a, b| a.thread_id.cmp(&b.thread_id));
        Ok(summaries)
    }

    async fn fetch_thread(&self, thread_id: &ThreadId) -> Result<Thread, RemoteError> {
        self.fetch_thread_calls.set(self.fetch_thread_calls.get() + 1);
        self.threads
            .get(thread_id)
            .cloned()
            .ok_or(RemoteError::Status {
                status: 404,
                body: "Thread not found".to_string(),
            })
    }

    async fn send_message(&self, request: &SendRequest) -> Result<Vec<Message>, RemoteError> {
        self.send_calls.set(self.send_calls.get() + 1);
        self.sent.borrow_mut().push(request.clone());
        if self.fail_sends {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }

        let n = self.send_calls.get();
        let mut echoed = message_at(
            &request.thread_id.0,
            &format!("srv_{n}"),
            Author::User,
            &request.content,
            300 + n as i64,
        );
        echoed.tagged_agent = request.tagged_agent;

        let mut messages = vec![echoed];
        messages.extend(self.replies.iter().cloned());
        Ok(messages)
    }

    async fn generate_more(&self, _thread_id: &ThreadId) -> Result<Vec<Message>, RemoteError> {
        if self.replies.is_empty() {
            return Err(RemoteError::Unavailable);
        }
        Ok(self.replies.clone())
    }
}
