//! Visual mode: selection maintenance and operators over the selection.
//!
//! Operators consume the selection exactly once: the mode returns to Normal
//! and the selection is dropped before the buffer is touched. The shape of
//! the consumed region is recorded so `.` can apply the same edit to a
//! region of the same size anchored at the cursor.

use super::{Change, EditorContext, operator, repeat};
use crate::{OperatorKind, TextObject, VisualExtent, text_object};
use core_state::{
    CursorContext, EngineError, EngineResult, Mode, ModeEvent, PutPlacement, RegisterContent,
    RegisterKind, Selection, SelectionRange, TextBuffer, VisualKind,
};
use core_text::{Position, grapheme};
use tracing::trace;

/// Size of a consumed selection, independent of where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VisualShape {
    /// `rows` extra rows; `cols` graphemes on one row, else the end byte on the last row.
    Chars { rows: usize, cols: usize },
    Lines { rows: usize },
    Block { rows: usize, width: usize },
}

impl VisualShape {
    fn of(text: &TextBuffer, range: SelectionRange) -> Self {
        match range {
            SelectionRange::Chars { start, end } if start.row == end.row => {
                let line = text.line(start.row);
                let cols = grapheme::count(&line[start.col.min(line.len())..end.col.min(line.len())]);
                VisualShape::Chars { rows: 0, cols }
            }
            SelectionRange::Chars { start, end } => VisualShape::Chars {
                rows: end.row - start.row,
                cols: end.col,
            },
            SelectionRange::Lines { first, last } => VisualShape::Lines {
                rows: last - first + 1,
            },
            SelectionRange::Block {
                top,
                bottom,
                left,
                right,
            } => VisualShape::Block {
                rows: bottom - top + 1,
                width: right - left,
            },
        }
    }

    /// The same shape anchored at the cursor, clamped into the buffer.
    pub(crate) fn place(self, text: &TextBuffer) -> SelectionRange {
        let cur = text.cursor();
        let last_row = text.last_row();
        match self {
            VisualShape::Chars { rows: 0, cols } => {
                let line = text.line(cur.row);
                let mut end = cur.col;
                for _ in 0..cols {
                    end = grapheme::next_boundary(&line, end);
                }
                SelectionRange::Chars {
                    start: cur,
                    end: Position::new(cur.row, end),
                }
            }
            VisualShape::Chars { rows, cols } => {
                let row = (cur.row + rows).min(last_row);
                SelectionRange::Chars {
                    start: cur,
                    end: Position::new(row, cols.min(text.line_len(row))),
                }
            }
            VisualShape::Lines { rows } => SelectionRange::Lines {
                first: cur.row,
                last: (cur.row + rows.max(1) - 1).min(last_row),
            },
            VisualShape::Block { rows, width } => {
                let left = grapheme::visual_col(&text.line(cur.row), cur.col);
                SelectionRange::Block {
                    top: cur.row,
                    bottom: (cur.row + rows.max(1) - 1).min(last_row),
                    left,
                    right: left + width,
                }
            }
        }
    }
}

/// Visual edits that `.` can replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VisualEdit {
    Delete,
    Change,
    Join { spaces: bool },
    Replace(char),
    Put { count: usize },
}

/// `v`, `V`, `<C-v>`: enter, switch kind, or leave when the kind matches.
pub(super) fn toggle(ctx: &mut EditorContext, kind: VisualKind) -> EngineResult<()> {
    match ctx.modes.apply(ModeEvent::EnterVisual(kind))? {
        Mode::Visual(k) => match ctx.selection.as_mut() {
            Some(sel) => sel.set_kind(k),
            None => ctx.selection = Some(Selection::enter(k, ctx.text.cursor())),
        },
        _ => {
            ctx.selection = None;
            ctx.text.clamp_cursor(CursorContext::Normal);
        }
    }
    Ok(())
}

pub(super) fn swap(ctx: &mut EditorContext) -> EngineResult<()> {
    let sel = ctx.selection.as_mut().ok_or(EngineError::MotionFailed)?;
    let to = sel.swap();
    ctx.text.set_cursor(to, CursorContext::Normal);
    Ok(())
}

/// Replace the selection with a text object around the cursor.
pub(super) fn select_object(ctx: &mut EditorContext, object: TextObject, count: usize) -> EngineResult<()> {
    let cursor = ctx.text.cursor();
    let range = text_object::resolve(ctx.text.buffer(), cursor, object, count)?;
    let (anchor, to) = match range {
        SelectionRange::Chars { start, end } if start < end => {
            let to = if end.col == 0 {
                Position::new(end.row - 1, ctx.text.line_len(end.row - 1))
            } else {
                Position::new(end.row, grapheme::prev_boundary(&ctx.text.line(end.row), end.col))
            };
            (start, to)
        }
        SelectionRange::Chars { .. } => return Ok(()),
        SelectionRange::Lines { first, last } => {
            if ctx.mode() != Mode::Visual(VisualKind::Line) {
                ctx.modes.apply(ModeEvent::EnterVisual(VisualKind::Line))?;
            }
            (Position::new(first, 0), Position::new(last, 0))
        }
        SelectionRange::Block { top, bottom, .. } => (Position::new(top, 0), Position::new(bottom, 0)),
    };
    let kind = match ctx.mode() {
        Mode::Visual(k) => k,
        _ => VisualKind::Char,
    };
    let sel = ctx.selection.get_or_insert_with(|| Selection::enter(kind, anchor));
    sel.set_kind(kind);
    sel.set_anchor(anchor);
    sel.extend(to);
    ctx.text.set_cursor(to, CursorContext::Normal);
    trace!(target: "actions.dispatch", ?object, count, ?anchor, ?to, "visual_object");
    Ok(())
}

/// Resolve the selection, leave Visual mode and hand back the range. The
/// cursor moves to the start of the region first, so an undo of the edit
/// that follows lands there.
fn consume(ctx: &mut EditorContext) -> EngineResult<SelectionRange> {
    let sel = ctx.selection.ok_or(EngineError::MotionFailed)?;
    let range = sel.resolve(ctx.text.buffer());
    ctx.modes.apply(ModeEvent::OperatorApplied)?;
    ctx.selection = None;
    let start = match range {
        SelectionRange::Chars { start, .. } => start,
        SelectionRange::Lines { .. } => sel.bounds().0,
        SelectionRange::Block { top, left, .. } => operator::block_origin(&ctx.text, top, left),
    };
    ctx.text.set_cursor(start, CursorContext::Normal);
    Ok(range)
}

fn widen(text: &TextBuffer, range: SelectionRange, extent: VisualExtent) -> SelectionRange {
    let (first, last) = range.rows();
    match (extent, range) {
        (VisualExtent::Selection, _) => range,
        (VisualExtent::ToLineEnd, SelectionRange::Block { top, bottom, left, .. }) => {
            let right = (top..=bottom)
                .map(|r| grapheme::display_width(&text.line(r)))
                .max()
                .unwrap_or(left)
                .max(left);
            SelectionRange::Block {
                top,
                bottom,
                left,
                right,
            }
        }
        _ => SelectionRange::Lines { first, last },
    }
}

pub(super) fn handle_operator(
    ctx: &mut EditorContext,
    op: OperatorKind,
    extent: VisualExtent,
    register: Option<char>,
) -> EngineResult<()> {
    let consumed = consume(ctx)?;
    let range = widen(&ctx.text, consumed, extent);
    trace!(target: "actions.dispatch", ?op, ?extent, ?register, ?range, "visual_operator");
    let shape = VisualShape::of(&ctx.text, range);
    let record = |edit| Change::Visual {
        edit,
        shape,
        register,
        inserted: Vec::new(),
    };
    match op {
        OperatorKind::Yank => operator::yank(ctx, range, register),
        OperatorKind::Delete => {
            operator::delete(ctx, range, register, false)?;
            repeat::record(ctx, record(VisualEdit::Delete));
            Ok(())
        }
        OperatorKind::Change => operator::change(ctx, range, register, record(VisualEdit::Change)),
    }
}

pub(super) fn handle_join(ctx: &mut EditorContext, spaces: bool) -> EngineResult<()> {
    let range = consume(ctx)?;
    let shape = VisualShape::of(&ctx.text, range);
    join_rows(ctx, range, spaces)?;
    record_visual(ctx, VisualEdit::Join { spaces }, shape, None);
    Ok(())
}

pub(super) fn join_rows(ctx: &mut EditorContext, range: SelectionRange, spaces: bool) -> EngineResult<()> {
    let (first, last) = range.rows();
    if !ctx.text.join_lines(first, last - first + 1, spaces) {
        return Err(EngineError::MotionFailed);
    }
    Ok(())
}

pub(super) fn handle_replace(ctx: &mut EditorContext, ch: char) -> EngineResult<()> {
    let range = consume(ctx)?;
    let shape = VisualShape::of(&ctx.text, range);
    replace_in(ctx, range, ch);
    record_visual(ctx, VisualEdit::Replace(ch), shape, None);
    Ok(())
}

/// Overwrite every grapheme of a range with `ch`; line breaks stay.
pub(super) fn replace_in(ctx: &mut EditorContext, range: SelectionRange, ch: char) {
    let text = &mut ctx.text;
    text.begin_change();
    let start = match range {
        SelectionRange::Block {
            top,
            bottom,
            left,
            right,
        } => {
            text.replace_block(top, bottom, left, right, ch);
            operator::block_origin(text, top, left)
        }
        SelectionRange::Chars { start, end } => {
            for row in start.row..=end.row.min(text.last_row()) {
                let a = if row == start.row { start.col } else { 0 };
                let b = if row == end.row { end.col } else { text.line_len(row) };
                replace_segment(text, row, a, b, ch);
            }
            start
        }
        SelectionRange::Lines { first, last } => {
            for row in first..=last.min(text.last_row()) {
                let len = text.line_len(row);
                replace_segment(text, row, 0, len, ch);
            }
            Position::new(first, 0)
        }
    };
    text.set_cursor(start, CursorContext::Normal);
    text.end_change();
}

fn replace_segment(text: &mut TextBuffer, row: usize, a: usize, b: usize, ch: char) {
    let line = text.line(row);
    let (a, b) = (a.min(line.len()), b.min(line.len()));
    if a >= b {
        return;
    }
    let n = grapheme::count(&line[a..b]);
    let fill: String = std::iter::repeat_n(ch, n).collect();
    text.replace_range(Position::new(row, a), Position::new(row, b), &fill);
}

pub(super) fn handle_put(ctx: &mut EditorContext, count: usize, register: Option<char>) -> EngineResult<()> {
    let range = consume(ctx)?;
    let shape = VisualShape::of(&ctx.text, range);
    put_over(ctx, range, register, count)?;
    record_visual(ctx, VisualEdit::Put { count }, shape, register);
    Ok(())
}

/// Replace a range with register content. The replaced text goes to the
/// unnamed register afterwards.
pub(super) fn put_over(
    ctx: &mut EditorContext,
    range: SelectionRange,
    register: Option<char>,
    count: usize,
) -> EngineResult<()> {
    let content = ctx.registers.get(register)?;
    if content.is_empty() {
        return match register {
            Some(name) if name != '"' => Err(EngineError::RegisterMiss(name)),
            _ => Ok(()),
        };
    }
    let replaced = operator::capture(&ctx.text, range);
    let text = &mut ctx.text;
    text.begin_change();
    match range {
        SelectionRange::Lines { first, last } => {
            text.delete_lines(first, last);
            let lines = match content.kind {
                RegisterKind::LineWise => content.clone(),
                _ => RegisterContent::linewise(&content.lines()),
            };
            let placement = if first > text.last_row() {
                text.set_cursor(Position::new(text.last_row(), 0), CursorContext::Normal);
                PutPlacement::After
            } else {
                text.set_cursor(Position::new(first, 0), CursorContext::Normal);
                PutPlacement::Before
            };
            text.put(&lines, placement, count);
        }
        SelectionRange::Chars { start, end } => {
            text.delete_range(start, end);
            if content.kind == RegisterKind::LineWise {
                text.insert_at(start, "\n");
                text.set_cursor(Position::new(start.row + 1, 0), CursorContext::Normal);
            } else {
                text.set_cursor(start, CursorContext::Insert);
            }
            text.put(&content, PutPlacement::Before, count);
        }
        SelectionRange::Block {
            top,
            bottom,
            left,
            right,
        } => {
            text.delete_block(top, bottom, left, right);
            let origin = operator::block_origin(text, top, left);
            text.set_cursor(origin, CursorContext::Insert);
            text.put(&content, PutPlacement::Before, count);
        }
    }
    text.end_change();
    ctx.registers.delete(None, replaced)?;
    Ok(())
}

fn record_visual(ctx: &mut EditorContext, edit: VisualEdit, shape: VisualShape, register: Option<char>) {
    repeat::record(
        ctx,
        Change::Visual {
            edit,
            shape,
            register,
            inserted: Vec::new(),
        },
    );
}
