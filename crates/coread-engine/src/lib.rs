pub mod anchor;
pub mod cache;
pub mod io;
pub mod layout;
pub mod markers;
pub mod models;
pub mod outbox;
pub mod remote;
pub mod segments;
pub mod session;
pub mod tags;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use anchor::{AnchorError, ResolvedAnchor, resolve, resolve_for_thread};
pub use cache::{CacheError, ThreadCache};
pub use io::*;
pub use layout::{GridLayout, GridLine, GridRun};
pub use markers::{
    LayoutProbe, LayoutTrigger, MarkerPlacement, MarkerPositioner, MeasuredPass, PassTicket,
};
pub use models::*;
pub use outbox::{OutgoingMessage, Outbox, SendError, SendOutcome};
pub use remote::{OfflineApi, ReaderApi, RemoteError};
pub use segments::{
    HEADING_MARKER, Piece, SectionRender, Segment, SegmentKind, build_segments, resolve_section,
};
pub use session::{ReaderSession, SessionError};
pub use tags::parse_tagged_agent;
