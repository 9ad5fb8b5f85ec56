//! # Segment Builder
//!
//! Partitions a section's content into an ordered, non-overlapping sequence
//! of plain and highlighted [`Segment`]s.
//!
//! ## Overlap policy
//!
//! Anchors are walked left to right with a single cursor. An anchor that
//! starts before the cursor is clipped to start at the cursor, so a later
//! overlapping anchor keeps only its non-overlapping remainder, and an anchor
//! fully contained in an earlier one emits nothing. Ranges are never merged or
//! nested.
//!
//! ## Subsection headings
//!
//! The parser embeds subsection titles as lines starting with
//! [`HEADING_MARKER`]. Each segment is split into line [`Piece`]s and a piece
//! is flagged as a heading when its line starts with the marker in the full
//! section content. Detection therefore works even when the marker straddles
//! a highlight boundary or sits inside a highlight.

use std::fmt::Write;
use std::ops::Range;

use crate::anchor::{ResolvedAnchor, resolve_for_thread};
use crate::models::{Section, ThreadId, ThreadSummary};

/// Prefix that marks an embedded subsection heading line
pub const HEADING_MARKER: &str = "### ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Highlight { thread_id: ThreadId, selected: bool },
}

/// A line-sized slice of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Byte range in the section content, including any trailing newline
    pub range: Range<usize>,
    /// Whether this piece lies on an embedded heading line
    pub heading: bool,
    /// Part of `range` to display; excludes heading marker bytes
    pub visible: Range<usize>,
}

impl Piece {
    pub fn visible_text<'a>(&self, content: &'a str) -> &'a str {
        &content[self.visible.clone()]
    }
}

/// A contiguous run of section content, plain or highlighted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub range: Range<usize>,
    pub pieces: Vec<Piece>,
}

impl Segment {
    pub fn text<'a>(&self, content: &'a str) -> &'a str {
        &content[self.range.clone()]
    }

    /// Owning thread for highlighted segments
    pub fn thread_id(&self) -> Option<&ThreadId> {
        match &self.kind {
            SegmentKind::Highlight { thread_id, .. } => Some(thread_id),
            SegmentKind::Plain => None,
        }
    }

    pub fn is_highlight(&self) -> bool {
        matches!(self.kind, SegmentKind::Highlight { .. })
    }

    pub fn is_selected(&self) -> bool {
        matches!(self.kind, SegmentKind::Highlight { selected: true, .. })
    }
}

/// Build the segment sequence for `content`.
///
/// `anchors` must already be resolved against `content`. They are sorted by
/// start offset, ties keeping their input order. The concatenated segment
/// texts always reproduce `content` exactly.
pub fn build_segments(
    content: &str,
    anchors: &[ResolvedAnchor],
    selected: Option<&ThreadId>,
) -> Vec<Segment> {
    let mut sorted: Vec<&ResolvedAnchor> = anchors.iter().collect();
    sorted.sort_by_key(|a| a.range.start);

    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = 0;

    for anchor in sorted {
        let end = anchor.range.end.min(content.len());
        let start = anchor.range.start.max(cursor).min(content.len());

        if start > cursor {
            segments.push(make_segment(content, SegmentKind::Plain, cursor..start));
        }
        if end <= start {
            log::debug!(
                "highlight for thread {} fully overlapped, dropped",
                anchor.thread_id
            );
            continue;
        }

        let kind = SegmentKind::Highlight {
            thread_id: anchor.thread_id.clone(),
            selected: selected == Some(&anchor.thread_id),
        };
        segments.push(make_segment(content, kind, start..end));
        cursor = end;
    }

    if cursor < content.len() {
        segments.push(make_segment(content, SegmentKind::Plain, cursor..content.len()));
    }

    segments
}

fn make_segment(content: &str, kind: SegmentKind, range: Range<usize>) -> Segment {
    let pieces = split_pieces(content, range.clone());
    Segment {
        kind,
        range,
        pieces,
    }
}

/// Split `range` at line boundaries of `content`, flagging heading lines
fn split_pieces(content: &str, range: Range<usize>) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut pos = range.start;

    while pos < range.end {
        let line_start = content[..pos].rfind('\n').map_or(0, |i| i + 1);
        let piece_end = content[pos..range.end]
            .find('\n')
            .map_or(range.end, |i| pos + i + 1);

        let heading = content[line_start..].starts_with(HEADING_MARKER);
        let visible = if heading {
            let marker_end = line_start + HEADING_MARKER.len();
            pos.max(marker_end).min(piece_end)..piece_end
        } else {
            pos..piece_end
        };

        pieces.push(Piece {
            range: pos..piece_end,
            heading,
            visible,
        });
        pos = piece_end;
    }

    pieces
}

/// Result of resolving and segmenting one section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRender {
    pub segments: Vec<Segment>,
    /// Threads anchored to this section whose snippet could not be resolved
    pub unresolved: Vec<(ThreadId, crate::anchor::AnchorError)>,
}

impl SectionRender {
    /// Threads that own a visible highlight, in document order
    pub fn highlighted_threads(&self) -> impl Iterator<Item = &ThreadId> {
        self.segments.iter().filter_map(Segment::thread_id)
    }
}

/// Resolve every thread anchored to `section` and build its segments.
///
/// Threads anchored to other sections are ignored. Resolution failures are
/// logged and reported in [`SectionRender::unresolved`]; they never fail the
/// render as a whole.
pub fn resolve_section(
    section: &Section,
    threads: &[ThreadSummary],
    selected: Option<&ThreadId>,
) -> SectionRender {
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();

    for thread in threads
        .iter()
        .filter(|t| t.anchor.section_id == section.section_id)
    {
        match resolve_for_thread(&section.content, &thread.thread_id, &thread.anchor) {
            Ok(anchor) => resolved.push(anchor),
            Err(err) => {
                log::warn!(
                    "thread {} not shown in section {}: {err}",
                    thread.thread_id,
                    section.section_id
                );
                unresolved.push((thread.thread_id.clone(), err));
            }
        }
    }

    SectionRender {
        segments: build_segments(&section.content, &resolved, selected),
        unresolved,
    }
}

/// Format segments as a readable string for snapshot testing
pub fn format_segments(segments: &[Segment], content: &str) -> String {
    let mut out = String::new();
    for segment in segments {
        let label = match &segment.kind {
            SegmentKind::Plain => "Plain".to_string(),
            SegmentKind::Highlight {
                thread_id,
                selected: true,
            } => format!("Highlight({thread_id}, selected)"),
            SegmentKind::Highlight { thread_id, .. } => format!("Highlight({thread_id})"),
        };
        writeln!(
            out,
            "{label} [{}..{}] {:?}",
            segment.range.start,
            segment.range.end,
            segment.text(content)
        )
        .unwrap();
        for piece in segment.pieces.iter().filter(|p| p.heading) {
            writeln!(
                out,
                "  heading [{}..{}] {:?}",
                piece.range.start,
                piece.range.end,
                piece.visible_text(content)
            )
            .unwrap();
        }
    }
    out
}
