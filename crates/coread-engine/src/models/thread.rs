use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::agent::{AgentId, Author, DiscussionType};
use super::document::{DocumentId, SectionId};
use super::timestamp;

/// Identifier of a discussion thread or comment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

/// Identifier of a single message within a thread
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(value: &str) -> Self {
        ThreadId(value.to_string())
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        MessageId(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadType {
    /// Multi-agent discussion
    Discussion,
    /// Single comment by one agent
    Comment,
}

/// A thread's reference to a span of section text.
///
/// `snippet_text` is the durable identifier, captured verbatim at generation
/// time. The recorded offsets are hints only; they are recomputed against the
/// live section content on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub section_id: SectionId,
    pub snippet_text: String,
    #[serde(default)]
    pub start_offset: Option<usize>,
    #[serde(default)]
    pub end_offset: Option<usize>,
}

impl Anchor {
    /// Anchor without recorded offsets
    pub fn new(section_id: impl Into<SectionId>, snippet_text: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            snippet_text: snippet_text.into(),
            start_offset: None,
            end_offset: None,
        }
    }
}

/// A span of the document quoted by a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReference {
    pub section_id: SectionId,
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: String,
}

/// Whether the server has seen a message.
///
/// Local metadata only, never sent over the wire. Messages decoded from the
/// backend are `Confirmed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Delivery {
    #[default]
    Confirmed,
    /// Synthesized locally after a failed send
    LocalOnly { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: MessageId,
    pub thread_id: ThreadId,
    pub author: Author,
    pub content: String,
    #[serde(default)]
    pub references: Vec<MessageReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagged_agent: Option<AgentId>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub delivery: Delivery,
}

impl Message {
    pub fn is_local_only(&self) -> bool {
        matches!(self.delivery, Delivery::LocalOnly { .. })
    }
}

/// Summary form of a thread used for list and overview rendering.
///
/// Wire name on the backend is `ThreadListItem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub thread_id: ThreadId,
    pub thread_type: ThreadType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussion_type: Option<DiscussionType>,
    pub tension_point: String,
    pub participants: Vec<AgentId>,
    #[serde(default)]
    pub message_count: usize,
    pub anchor: Anchor,
}

impl ThreadSummary {
    /// The agent whose colour represents a comment
    pub fn lead_agent(&self) -> Option<AgentId> {
        self.participants.first().copied()
    }
}

/// Full thread with its message history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub thread_id: ThreadId,
    #[serde(default)]
    pub document_id: Option<DocumentId>,
    #[serde(default)]
    pub seed_id: Option<String>,
    pub thread_type: ThreadType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussion_type: Option<DiscussionType>,
    pub tension_point: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub anchor: Anchor,
    pub participants: Vec<AgentId>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn summary(&self) -> ThreadSummary {
        ThreadSummary {
            thread_id: self.thread_id.clone(),
            thread_type: self.thread_type,
            discussion_type: self.discussion_type,
            tension_point: self.tension_point.clone(),
            participants: self.participants.clone(),
            message_count: self.messages.len(),
            anchor: self.anchor.clone(),
        }
    }
}

/// Body of a send-message request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(skip)]
    pub thread_id: ThreadId,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagged_agent: Option<AgentId>,
}

/// The send endpoint returns either the stored user message or that message
/// plus agent replies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SendResponse {
    Many(Vec<Message>),
    One(Box<Message>),
}

impl SendResponse {
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            SendResponse::Many(messages) => messages,
            SendResponse::One(message) => vec![*message],
        }
    }
}
