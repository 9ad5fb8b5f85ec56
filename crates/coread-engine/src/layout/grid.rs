//! Terminal-grid layout for segmented sections.
//!
//! Word-wraps the visible text of a section's segments to a fixed column
//! width and records the row of each highlight's first visible cell. The
//! renderer draws [`GridLayout::lines`] directly, so what is measured is
//! exactly what is drawn.

use unicode_width::UnicodeWidthChar;

use crate::markers::LayoutProbe;
use crate::models::ThreadId;
use crate::segments::{Segment, SegmentKind};

/// Styled run of text on one grid line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRun {
    pub text: String,
    pub kind: SegmentKind,
    pub heading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridLine {
    pub runs: Vec<GridRun>,
}

impl GridLine {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// One cell of the flattened input stream
struct Cell {
    ch: char,
    width: usize,
    style: usize,
}

#[derive(Clone)]
struct Style {
    kind: SegmentKind,
    heading: bool,
}

/// A section laid out on a character grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    width: usize,
    lines: Vec<GridLine>,
    highlight_rows: Vec<(ThreadId, usize)>,
}

impl GridLayout {
    /// Lay out `segments` of `content` in `width` columns
    pub fn wrap(content: &str, segments: &[Segment], width: usize) -> Self {
        let width = width.max(1);
        let (cells, styles) = flatten(content, segments);
        let mut builder = Builder::new(width, &styles);

        let mut i = 0;
        while i < cells.len() {
            let cell = &cells[i];
            if cell.ch == '\n' {
                builder.hard_break();
                i += 1;
            } else if cell.ch == ' ' {
                if builder.col + cell.width > width {
                    // Spaces are swallowed at a soft wrap
                    builder.soft_break();
                } else {
                    builder.place(cell);
                }
                i += 1;
            } else {
                let end = cells[i..]
                    .iter()
                    .position(|c| c.ch == ' ' || c.ch == '\n')
                    .map_or(cells.len(), |n| i + n);
                let word_width: usize = cells[i..end].iter().map(|c| c.width).sum();
                if builder.col > 0 && builder.col + word_width > width {
                    builder.soft_break();
                }
                for cell in &cells[i..end] {
                    if builder.col > 0 && builder.col + cell.width > width {
                        builder.soft_break();
                    }
                    builder.place(cell);
                }
                i = end;
            }
        }

        builder.finish()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    /// Number of rows the section occupies
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Row of the first visible cell of a thread's highlight
    pub fn row_of(&self, thread_id: &ThreadId) -> Option<usize> {
        self.highlight_rows
            .iter()
            .find(|(id, _)| id == thread_id)
            .map(|(_, row)| *row)
    }
}

impl LayoutProbe for GridLayout {
    fn container_top(&self) -> f32 {
        0.0
    }

    fn highlight_top(&self, thread_id: &ThreadId) -> Option<f32> {
        self.row_of(thread_id).map(|row| row as f32)
    }
}

/// Flatten the visible text of all pieces into styled cells
fn flatten(content: &str, segments: &[Segment]) -> (Vec<Cell>, Vec<Style>) {
    let mut cells = Vec::with_capacity(content.len());
    let mut styles = Vec::new();

    for segment in segments {
        for piece in &segment.pieces {
            let style = styles.len();
            styles.push(Style {
                kind: segment.kind.clone(),
                heading: piece.heading,
            });
            for ch in piece.visible_text(content).chars() {
                match ch {
                    '\r' => {}
                    '\n' => cells.push(Cell {
                        ch,
                        width: 0,
                        style,
                    }),
                    c if c.is_whitespace() || c.is_control() => cells.push(Cell {
                        ch: ' ',
                        width: 1,
                        style,
                    }),
                    c => cells.push(Cell {
                        ch: c,
                        width: c.width().unwrap_or(0),
                        style,
                    }),
                }
            }
        }
    }

    (cells, styles)
}

struct Builder<'a> {
    width: usize,
    styles: &'a [Style],
    lines: Vec<GridLine>,
    current: GridLine,
    current_style: Option<usize>,
    col: usize,
    highlight_rows: Vec<(ThreadId, usize)>,
}

impl<'a> Builder<'a> {
    fn new(width: usize, styles: &'a [Style]) -> Self {
        Self {
            width,
            styles,
            lines: Vec::new(),
            current: GridLine::default(),
            current_style: None,
            col: 0,
            highlight_rows: Vec::new(),
        }
    }

    fn row(&self) -> usize {
        self.lines.len()
    }

    fn place(&mut self, cell: &Cell) {
        let styles = self.styles;
        let style = &styles[cell.style];
        let row = self.row();
        if let SegmentKind::Highlight { thread_id, .. } = &style.kind
            && cell.ch != ' '
            && !self.highlight_rows.iter().any(|(id, _)| id == thread_id)
        {
            self.highlight_rows.push((thread_id.clone(), row));
        }

        if self.current_style == Some(cell.style)
            && let Some(run) = self.current.runs.last_mut()
        {
            run.text.push(cell.ch);
        } else {
            self.current.runs.push(GridRun {
                text: cell.ch.to_string(),
                kind: style.kind.clone(),
                heading: style.heading,
            });
            self.current_style = Some(cell.style);
        }
        self.col += cell.width;
    }

    /// Wrap to the next row, dropping trailing spaces left on this one
    fn soft_break(&mut self) {
        while let Some(run) = self.current.runs.last_mut() {
            let trimmed = run.text.trim_end_matches(' ').len();
            run.text.truncate(trimmed);
            if !run.text.is_empty() {
                break;
            }
            self.current.runs.pop();
        }
        self.end_line();
    }

    fn hard_break(&mut self) {
        self.end_line();
    }

    fn end_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.current_style = None;
        self.col = 0;
    }

    fn finish(mut self) -> GridLayout {
        if !self.current.runs.is_empty() {
            self.end_line();
        }
        GridLayout {
            width: self.width,
            lines: self.lines,
            highlight_rows: self.highlight_rows,
        }
    }
}
