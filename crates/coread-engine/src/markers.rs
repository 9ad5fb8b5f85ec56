//! # Marker Positioner
//!
//! Keeps an out-of-flow column of thread markers aligned with the highlighted
//! spans they belong to.
//!
//! Positions depend on realized text layout (wrapping, font metrics), so they
//! are computed in two strictly ordered phases:
//!
//! 1. **Commit**: the renderer commits a section's [`Segment`]s to its visual
//!    tree and lets layout run.
//! 2. **Measure**: a [`LayoutProbe`] reports realized geometry and
//!    [`MarkerPositioner::measure`] turns it into [`MarkerPlacement`]s.
//!
//! Every layout-affecting event is a [`LayoutTrigger`] that schedules a new
//! pass. Passes carry the generation they were scheduled under and
//! [`MarkerPositioner::apply`] only installs the latest one; a pass that was
//! overtaken by a newer trigger is discarded whole. Passes are idempotent, so
//! running one redundantly is harmless.
//!
//! Threads whose highlight was dropped (unresolved anchor, fully overlapped)
//! or never realized get no marker at all.

use std::collections::HashSet;

use crate::models::ThreadId;
use crate::segments::Segment;

/// Realized geometry of a committed section.
///
/// Units are whatever the rendering target uses: pixels for a DOM, rows for a
/// terminal grid.
pub trait LayoutProbe {
    /// Top edge of the section's content container
    fn container_top(&self) -> f32;

    /// Top edge of the highlight owned by `thread_id`, if it was laid out
    fn highlight_top(&self, thread_id: &ThreadId) -> Option<f32>;
}

/// Events that invalidate marker positions for a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutTrigger {
    /// Threads were added, removed or re-selected
    ThreadsChanged,
    /// The section's text changed
    ContentChanged,
    /// The viewport or container was resized
    Resized,
}

/// Handle for one scheduled recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    generation: u64,
    trigger: LayoutTrigger,
}

impl PassTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn trigger(&self) -> LayoutTrigger {
        self.trigger
    }
}

/// Where a thread's marker goes, relative to the container top
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPlacement {
    pub thread_id: ThreadId,
    pub offset: f32,
    pub selected: bool,
}

/// Output of a measurement pass, not yet installed
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredPass {
    pub ticket: PassTicket,
    pub placements: Vec<MarkerPlacement>,
}

/// Marker positions for one section
#[derive(Debug, Default)]
pub struct MarkerPositioner {
    scheduled: u64,
    applied: u64,
    latest: Option<PassTicket>,
    placements: Vec<MarkerPlacement>,
}

impl MarkerPositioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a full recomputation. Any pass scheduled earlier is superseded.
    pub fn schedule(&mut self, trigger: LayoutTrigger) -> PassTicket {
        self.scheduled += 1;
        let ticket = PassTicket {
            generation: self.scheduled,
            trigger,
        };
        self.latest = Some(ticket);
        ticket
    }

    /// The latest scheduled pass, while it has not been applied
    pub fn pending(&self) -> Option<PassTicket> {
        self.latest.filter(|_| self.needs_pass())
    }

    /// True while a scheduled pass has not been applied yet
    pub fn needs_pass(&self) -> bool {
        self.applied < self.scheduled
    }

    /// Measure committed `segments` through `probe`.
    ///
    /// Must run after the segments are laid out. One placement per
    /// highlighted thread, in document order.
    pub fn measure(
        ticket: PassTicket,
        segments: &[Segment],
        probe: &dyn LayoutProbe,
    ) -> MeasuredPass {
        let container_top = probe.container_top();
        let mut seen = HashSet::new();
        let mut placements = Vec::new();

        for segment in segments {
            let Some(thread_id) = segment.thread_id() else {
                continue;
            };
            if segment.range.is_empty() || !seen.insert(thread_id) {
                continue;
            }
            match probe.highlight_top(thread_id) {
                Some(top) => placements.push(MarkerPlacement {
                    thread_id: thread_id.clone(),
                    offset: top - container_top,
                    selected: segment.is_selected(),
                }),
                None => log::debug!("no realized geometry for thread {thread_id}, marker omitted"),
            }
        }

        MeasuredPass { ticket, placements }
    }

    /// Install a measured pass. Returns `false` and changes nothing when a
    /// newer pass has been scheduled since `pass` was issued.
    pub fn apply(&mut self, pass: MeasuredPass) -> bool {
        if pass.ticket.generation != self.scheduled {
            log::debug!(
                "discarding superseded marker pass {} ({:?}), latest is {}",
                pass.ticket.generation,
                pass.ticket.trigger,
                self.scheduled
            );
            return false;
        }
        self.placements = pass.placements;
        self.applied = pass.ticket.generation;
        true
    }

    /// Schedule, measure and apply in one step for renderers that lay out
    /// synchronously.
    pub fn refresh(
        &mut self,
        trigger: LayoutTrigger,
        segments: &[Segment],
        probe: &dyn LayoutProbe,
    ) -> &[MarkerPlacement] {
        let ticket = self.schedule(trigger);
        let pass = Self::measure(ticket, segments, probe);
        self.apply(pass);
        &self.placements
    }

    pub fn placements(&self) -> &[MarkerPlacement] {
        &self.placements
    }

    pub fn offset_of(&self, thread_id: &ThreadId) -> Option<f32> {
        self.placements
            .iter()
            .find(|p| &p.thread_id == thread_id)
            .map(|p| p.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::ResolvedAnchor;
    use crate::segments::build_segments;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Probe with fixed geometry, standing in for a measured DOM
    struct FixedProbe {
        top: f32,
        highlights: HashMap<ThreadId, f32>,
    }

    impl FixedProbe {
        fn new(top: f32, highlights: &[(&str, f32)]) -> Self {
            Self {
                top,
                highlights: highlights
                    .iter()
                    .map(|(id, y)| (ThreadId::from(*id), *y))
                    .collect(),
            }
        }
    }

    impl LayoutProbe for FixedProbe {
        fn container_top(&self) -> f32 {
            self.top
        }

        fn highlight_top(&self, thread_id: &ThreadId) -> Option<f32> {
            self.highlights.get(thread_id).copied()
        }
    }

    fn segments(content: &str, anchors: &[(&str, std::ops::Range<usize>)]) -> Vec<Segment> {
        let resolved: Vec<ResolvedAnchor> = anchors
            .iter()
            .map(|(id, range)| ResolvedAnchor {
                thread_id: ThreadId::from(*id),
                range: range.clone(),
            })
            .collect();
        build_segments(content, &resolved, Some(&ThreadId::from("t2")))
    }

    #[test]
    fn offsets_are_relative_to_container_top() {
        let segs = segments("The sky is blue.", &[("t1", 4..7), ("t2", 11..15)]);
        let probe = FixedProbe::new(100.0, &[("t1", 100.0), ("t2", 124.0)]);
        let mut positioner = MarkerPositioner::new();

        let placements = positioner.refresh(LayoutTrigger::ThreadsChanged, &segs, &probe);

        assert_eq!(
            placements,
            &[
                MarkerPlacement {
                    thread_id: ThreadId::from("t1"),
                    offset: 0.0,
                    selected: false,
                },
                MarkerPlacement {
                    thread_id: ThreadId::from("t2"),
                    offset: 24.0,
                    selected: true,
                },
            ]
        );
    }

    #[test]
    fn dropped_highlights_get_no_marker() {
        // "inner" is fully contained in "outer" and never becomes a segment
        let segs = segments("The sky is blue.", &[("outer", 4..15), ("inner", 8..10)]);
        let probe = FixedProbe::new(0.0, &[("outer", 10.0), ("inner", 10.0)]);
        let mut positioner = MarkerPositioner::new();

        positioner.refresh(LayoutTrigger::ThreadsChanged, &segs, &probe);

        assert_eq!(positioner.placements().len(), 1);
        assert_eq!(positioner.offset_of(&ThreadId::from("inner")), None);
    }

    #[test]
    fn unrealized_highlights_get_no_marker() {
        let segs = segments("The sky is blue.", &[("t1", 4..7)]);
        let probe = FixedProbe::new(0.0, &[]);
        let mut positioner = MarkerPositioner::new();

        positioner.refresh(LayoutTrigger::Resized, &segs, &probe);

        assert!(positioner.placements().is_empty());
    }

    #[test]
    fn superseded_pass_is_discarded_whole() {
        let segs = segments("The sky is blue.", &[("t1", 4..7)]);
        let mut positioner = MarkerPositioner::new();

        let old = positioner.schedule(LayoutTrigger::ThreadsChanged);
        let old_pass = MarkerPositioner::measure(old, &segs, &FixedProbe::new(0.0, &[("t1", 5.0)]));

        let new = positioner.schedule(LayoutTrigger::Resized);
        let new_pass = MarkerPositioner::measure(new, &segs, &FixedProbe::new(0.0, &[("t1", 9.0)]));

        assert!(positioner.apply(new_pass));
        assert!(!positioner.apply(old_pass));
        assert_eq!(positioner.offset_of(&ThreadId::from("t1")), Some(9.0));
    }

    #[test]
    fn stale_pass_applied_before_newer_one_is_rejected() {
        let segs = segments("The sky is blue.", &[("t1", 4..7)]);
        let mut positioner = MarkerPositioner::new();

        let old = positioner.schedule(LayoutTrigger::ContentChanged);
        positioner.schedule(LayoutTrigger::Resized);
        let old_pass = MarkerPositioner::measure(old, &segs, &FixedProbe::new(0.0, &[("t1", 5.0)]));

        assert!(!positioner.apply(old_pass));
        assert!(positioner.placements().is_empty());
        assert!(positioner.needs_pass());
    }

    #[test]
    fn pending_pass_keeps_its_trigger() {
        let segs = segments("The sky is blue.", &[("t1", 4..7)]);
        let mut positioner = MarkerPositioner::new();
        assert_eq!(positioner.pending(), None);

        positioner.schedule(LayoutTrigger::ThreadsChanged);
        let latest = positioner.schedule(LayoutTrigger::Resized);
        let ticket = positioner.pending().unwrap();
        assert_eq!(ticket, latest);
        assert_eq!(ticket.trigger(), LayoutTrigger::Resized);

        let pass = MarkerPositioner::measure(ticket, &segs, &FixedProbe::new(0.0, &[("t1", 2.0)]));
        assert!(positioner.apply(pass));
        assert_eq!(positioner.pending(), None);
        assert_eq!(positioner.offset_of(&ThreadId::from("t1")), Some(2.0));
    }

    #[test]
    fn passes_are_idempotent() {
        let segs = segments("The sky is blue.", &[("t1", 4..7), ("t2", 11..15)]);
        let probe = FixedProbe::new(3.0, &[("t1", 3.0), ("t2", 4.0)]);
        let mut positioner = MarkerPositioner::new();

        let first = positioner
            .refresh(LayoutTrigger::ThreadsChanged, &segs, &probe)
            .to_vec();
        let second = positioner
            .refresh(LayoutTrigger::ThreadsChanged, &segs, &probe)
            .to_vec();

        assert_eq!(first, second);
        assert!(!positioner.needs_pass());
    }
}
