pub mod agent;
pub mod document;
pub mod thread;
pub mod timestamp;

pub use agent::{AgentId, Author, DiscussionType, UnknownAgent};
pub use document::{Document, DocumentId, ParsedContent, Section, SectionId};
pub use thread::{
    Anchor, Delivery, Message, MessageId, MessageReference, SendRequest, SendResponse, Thread,
    ThreadId, ThreadSummary, ThreadType,
};
