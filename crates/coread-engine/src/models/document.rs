use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::thread::ThreadId;
use super::timestamp;

/// Identifier of a parsed document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

/// Identifier of a section within a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        DocumentId(value.to_string())
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        SectionId(value.to_string())
    }
}

impl From<String> for SectionId {
    fn from(value: String) -> Self {
        SectionId(value)
    }
}

/// A titled block of a parsed document's content.
///
/// Immutable once loaded for a given document version; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_id: SectionId,
    pub title: String,
    pub content: String,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedContent {
    pub sections: Vec<Section>,
}

/// A document as returned by the document service after PDF parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: DocumentId,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_pdf_url: Option<String>,
    #[serde(default)]
    pub parsed_content: ParsedContent,
    /// Ids of the threads generated for this document
    #[serde(default)]
    pub threads: Vec<ThreadId>,
    #[serde(default, with = "timestamp::option")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Sections in reading order (ascending `order`, stable for ties)
    pub fn sections_in_order(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.parsed_content.sections.iter().collect();
        sections.sort_by_key(|s| s.order);
        sections
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.parsed_content
            .sections
            .iter()
            .find(|s| &s.section_id == id)
    }

    /// Title for display, falling back when the parser found none
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled Document"
        } else {
            &self.title
        }
    }
}
