//! Reference implementations of the measurement phase.
//!
//! Each rendering target measures realized geometry its own way; the grid
//! layout here serves terminal renderers.

pub mod grid;

pub use grid::{GridLayout, GridLine, GridRun};
