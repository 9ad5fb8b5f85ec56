//! # Anchor Resolution
//!
//! Maps a thread's recorded snippet back onto a live byte range of a
//! section's content.
//!
//! Matching is an exact literal substring search. The snippet is captured
//! verbatim from the same content at generation time, so no normalization or
//! fuzzy matching is attempted. When the snippet occurs more than once the
//! first occurrence wins; surrounding context is not used to disambiguate.
//!
//! Recorded `startOffset`/`endOffset` values are never trusted. They only
//! feed a debug log line when they drift from the resolved range.

use std::ops::Range;

use crate::models::{Anchor, ThreadId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
    #[error("snippet not found in section content: {snippet:?}")]
    NotFound { snippet: String },
    #[error("anchor has an empty snippet")]
    EmptySnippet,
}

/// A thread's anchor after resolution against live content.
///
/// Invariant: `range.start < range.end` and the range lies on char boundaries
/// of the content it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnchor {
    pub thread_id: ThreadId,
    pub range: Range<usize>,
}

/// Resolve `anchor` against `content`, returning the byte range of the first
/// occurrence of its snippet.
pub fn resolve(content: &str, anchor: &Anchor) -> Result<Range<usize>, AnchorError> {
    let snippet = anchor.snippet_text.as_str();
    if snippet.is_empty() {
        return Err(AnchorError::EmptySnippet);
    }

    let start = content.find(snippet).ok_or_else(|| AnchorError::NotFound {
        snippet: preview(snippet),
    })?;
    let range = start..start + snippet.len();

    if let (Some(hint_start), Some(hint_end)) = (anchor.start_offset, anchor.end_offset)
        && (hint_start, hint_end) != (range.start, range.end)
    {
        log::debug!(
            "anchor in section {} drifted: recorded {}..{}, resolved {}..{}",
            anchor.section_id,
            hint_start,
            hint_end,
            range.start,
            range.end
        );
    }

    Ok(range)
}

/// Resolve the anchor of one thread, tagging the result with its id
pub fn resolve_for_thread(
    content: &str,
    thread_id: &ThreadId,
    anchor: &Anchor,
) -> Result<ResolvedAnchor, AnchorError> {
    resolve(content, anchor).map(|range| ResolvedAnchor {
        thread_id: thread_id.clone(),
        range,
    })
}

/// First 50 chars of a snippet, for log and error messages
fn preview(snippet: &str) -> String {
    const MAX_CHARS: usize = 50;
    match snippet.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &snippet[..cut]),
        None => snippet.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn anchor(snippet: &str) -> Anchor {
        Anchor::new("s1", snippet)
    }

    #[rstest]
    #[case("The sky is blue.", "sky", 4..7)]
    #[case("The sky is blue.", "The", 0..3)]
    #[case("The sky is blue.", "blue.", 11..16)]
    #[case("The sky is blue.", "The sky is blue.", 0..16)]
    #[case("sky, sky and more sky", "sky", 0..3)]
    #[case("Ünïcode before the sky", "sky", 21..24)]
    fn resolves_first_occurrence(
        #[case] content: &str,
        #[case] snippet: &str,
        #[case] expected: Range<usize>,
    ) {
        let range = resolve(content, &anchor(snippet)).unwrap();
        assert_eq!(range, expected);
        assert_eq!(&content[range], snippet);
    }

    #[test]
    fn missing_snippet_is_not_found() {
        let err = resolve("The sky is blue.", &anchor("sea")).unwrap_err();
        assert_eq!(
            err,
            AnchorError::NotFound {
                snippet: "sea".to_string()
            }
        );
    }

    #[test]
    fn matching_is_exact_not_normalized() {
        // Case and whitespace differences are drift, not matches
        assert!(resolve("The sky is blue.", &anchor("Sky")).is_err());
        assert!(resolve("The sky is blue.", &anchor("sky  is")).is_err());
    }

    #[test]
    fn empty_snippet_is_rejected() {
        assert_eq!(
            resolve("anything", &anchor("")),
            Err(AnchorError::EmptySnippet)
        );
    }

    #[test]
    fn recorded_offsets_are_ignored() {
        let mut stale = anchor("blue");
        stale.start_offset = Some(0);
        stale.end_offset = Some(4);
        assert_eq!(resolve("The sky is blue.", &stale).unwrap(), 11..15);
    }

    #[test]
    fn long_snippets_are_truncated_in_errors() {
        let snippet = "x".repeat(80);
        let AnchorError::NotFound { snippet: shown } =
            resolve("short", &anchor(&snippet)).unwrap_err()
        else {
            panic!("expected NotFound");
        };
        assert_eq!(shown.len(), 53);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn resolve_for_thread_keeps_thread_id() {
        let resolved =
            resolve_for_thread("The sky is blue.", &ThreadId::from("t1"), &anchor("sky")).unwrap();
        assert_eq!(resolved.thread_id, ThreadId::from("t1"));
        assert_eq!(resolved.range, 4..7);
    }
}
