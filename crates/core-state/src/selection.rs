//! Visual-mode selection: an anchor/cursor pair plus the kind that decides how
//! the pair resolves into an operator range.

use crate::mode::VisualKind;
use core_text::{Buffer, Position, grapheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    anchor: Position,
    cursor: Position,
    kind: VisualKind,
}

/// A selection normalized for operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRange {
    /// Half-open character range `[start, end)`.
    Chars { start: Position, end: Position },
    /// Inclusive row range.
    Lines { first: usize, last: usize },
    /// Inclusive rows, half-open display columns `[left, right)`.
    Block {
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
    },
}

impl SelectionRange {
    pub fn rows(&self) -> (usize, usize) {
        match *self {
            SelectionRange::Chars { start, end } => (start.row, end.row),
            SelectionRange::Lines { first, last } => (first, last),
            SelectionRange::Block { top, bottom, .. } => (top, bottom),
        }
    }
}

impl Selection {
    /// Start a selection with the anchor on the current cursor.
    pub fn enter(kind: VisualKind, at: Position) -> Self {
        Self {
            anchor: at,
            cursor: at,
            kind,
        }
    }

    /// Move the free end; the anchor stays put.
    pub fn extend(&mut self, to: Position) {
        self.cursor = to;
    }

    /// Swap anchor and cursor (`o`). Returns the new cursor.
    pub fn swap(&mut self) -> Position {
        std::mem::swap(&mut self.anchor, &mut self.cursor);
        self.cursor
    }

    pub fn set_kind(&mut self, kind: VisualKind) {
        self.kind = kind;
    }

    pub fn set_anchor(&mut self, anchor: Position) {
        self.anchor = anchor;
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn kind(&self) -> VisualKind {
        self.kind
    }

    /// `(min, max)` of anchor and cursor by `(row, col)`.
    pub fn bounds(&self) -> (Position, Position) {
        if self.anchor <= self.cursor {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        }
    }

    /// Resolve into a range. Character-wise ranges include the grapheme under the
    /// far end; an end resting on a line break takes the break with it.
    pub fn resolve(&self, buf: &Buffer) -> SelectionRange {
        let (start, end) = self.bounds();
        match self.kind {
            VisualKind::Line => SelectionRange::Lines {
                first: start.row,
                last: end.row,
            },
            VisualKind::Char => {
                let start = buf.clamp(start);
                let end = buf.clamp(end);
                let len = buf.line_len(end.row);
                let end = if end.col >= len && end.row < buf.last_row() {
                    Position::new(end.row + 1, 0)
                } else {
                    let line = buf.line(end.row).unwrap_or_default();
                    Position::new(end.row, grapheme::next_boundary(&line, end.col))
                };
                SelectionRange::Chars { start, end }
            }
            VisualKind::Block => {
                let (a_left, a_right) = display_span(buf, self.anchor);
                let (c_left, c_right) = display_span(buf, self.cursor);
                SelectionRange::Block {
                    top: start.row,
                    bottom: end.row,
                    left: a_left.min(c_left),
                    right: a_right.max(c_right),
                }
            }
        }
    }
}

/// Display columns covered by the grapheme at `pos` (one cell past end of line).
fn display_span(buf: &Buffer, pos: Position) -> (usize, usize) {
    let line = buf.line(pos.row).unwrap_or_default();
    let left = grapheme::visual_col(&line, pos.col);
    let width = grapheme::at(&line, pos.col)
        .map(grapheme::cluster_width)
        .unwrap_or(1);
    (left, left + width)
}

/// Byte range of the graphemes of `line` overlapping display columns `[left, right)`.
pub fn block_byte_range(line: &str, left: usize, right: usize) -> (usize, usize) {
    let mut col = 0;
    let mut start = line.len();
    let mut end = line.len();
    let mut found_start = false;
    for (b, g) in grapheme::iter_indices(line) {
        let w = grapheme::cluster_width(g);
        if !found_start && col + w > left {
            start = b;
            found_start = true;
        }
        if col >= right {
            end = b;
            break;
        }
        col += w;
    }
    (start, end.max(start))
}
