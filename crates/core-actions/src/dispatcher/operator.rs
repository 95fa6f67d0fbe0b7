//! Operators over resolved ranges.
//!
//! Register content is captured and written before the buffer is touched, so a
//! rejected register name leaves the buffer alone. Deletes and changes run in
//! one change group; a change keeps its group open across the insert session
//! that follows.

use super::{Change, EditorContext, SessionOrigin, mode, repeat};
use crate::{MotionKind, OperatorKind, OperatorTarget, span_resolver, text_object};
use core_state::{
    CursorContext, EngineResult, InsertVariant, RegisterContent, SelectionRange, TextBuffer,
};
use core_text::{Position, grapheme, motion};
use tracing::trace;

pub(super) fn handle_operator(
    ctx: &mut EditorContext,
    op: OperatorKind,
    target: OperatorTarget,
    count: Option<usize>,
    register: Option<char>,
) -> EngineResult<()> {
    let range = resolve_target(ctx, op, target, count)?;
    trace!(target: "actions.dispatch", ?op, ?target, ?count, ?register, ?range, "operator");
    let record = Change::Operator {
        op,
        target,
        count,
        register,
        inserted: Vec::new(),
    };
    match op {
        OperatorKind::Yank => yank(ctx, range, register),
        OperatorKind::Delete => {
            delete(ctx, range, register, false)?;
            repeat::record(ctx, record);
            Ok(())
        }
        OperatorKind::Change => change(ctx, range, register, record),
    }
}

fn resolve_target(
    ctx: &mut EditorContext,
    op: OperatorKind,
    target: OperatorTarget,
    count: Option<usize>,
) -> EngineResult<SelectionRange> {
    match target {
        OperatorTarget::Motion(m) => {
            if let MotionKind::Find(spec) = m {
                ctx.last_find = Some(spec);
            }
            span_resolver::resolve_operator_span(&ctx.text, op, m, count, ctx.last_find)
        }
        OperatorTarget::Lines => {
            let first = ctx.text.cursor().row;
            let n = count.unwrap_or(1).max(1);
            Ok(SelectionRange::Lines {
                first,
                last: first.saturating_add(n - 1).min(ctx.text.last_row()),
            })
        }
        OperatorTarget::Object(object) => {
            text_object::resolve(ctx.text.buffer(), ctx.text.cursor(), object, count.unwrap_or(1))
        }
    }
}

/// Register payload for a range.
pub(crate) fn capture(text: &TextBuffer, range: SelectionRange) -> RegisterContent {
    match range {
        SelectionRange::Chars { start, end } => RegisterContent::charwise(text.buffer().slice(start, end)),
        SelectionRange::Lines { first, last } => {
            let lines: Vec<String> = (first..=last.min(text.last_row())).map(|r| text.line(r)).collect();
            RegisterContent::linewise(&lines)
        }
        SelectionRange::Block {
            top,
            bottom,
            left,
            right,
        } => RegisterContent::blockwise(&text.block_text(top, bottom, left, right), right - left),
    }
}

fn is_empty(range: SelectionRange) -> bool {
    matches!(range, SelectionRange::Chars { start, end } if start >= end)
}

/// Top-left corner of a block in byte terms.
pub(super) fn block_origin(text: &TextBuffer, top: usize, left: usize) -> Position {
    Position::new(top, grapheme::byte_for_visual_col(&text.line(top), left))
}

pub(super) fn yank(ctx: &mut EditorContext, range: SelectionRange, register: Option<char>) -> EngineResult<()> {
    if is_empty(range) {
        return Ok(());
    }
    ctx.registers.yank(register, capture(&ctx.text, range))?;
    let cursor = ctx.text.cursor();
    let to = match range {
        SelectionRange::Chars { start, .. } => start,
        SelectionRange::Lines { first, .. } => Position::new(first, cursor.col),
        SelectionRange::Block { top, left, .. } => block_origin(&ctx.text, top, left),
    };
    ctx.text.set_cursor(to, CursorContext::Normal);
    Ok(())
}

/// Delete a range into a register. With `change` whole lines are emptied
/// rather than removed and the cursor may rest past the end of the line.
pub(crate) fn delete(
    ctx: &mut EditorContext,
    range: SelectionRange,
    register: Option<char>,
    change: bool,
) -> EngineResult<()> {
    if is_empty(range) {
        return Ok(());
    }
    ctx.registers.delete(register, capture(&ctx.text, range))?;
    let cursor_ctx = if change {
        CursorContext::Insert
    } else {
        CursorContext::Normal
    };
    let text = &mut ctx.text;
    text.begin_change();
    match range {
        SelectionRange::Chars { start, end } => {
            text.delete_range(start, end);
            text.set_cursor(start, cursor_ctx);
        }
        SelectionRange::Lines { first, last } if change => {
            text.set_line(first, "");
            if last > first {
                text.delete_lines(first + 1, last);
            }
            text.set_cursor(Position::new(first, 0), cursor_ctx);
        }
        SelectionRange::Lines { first, last } => {
            text.delete_lines(first, last);
            let mut pos = Position::new(first.min(text.last_row()), 0);
            motion::first_non_blank(text.buffer(), &mut pos);
            text.set_cursor(pos, cursor_ctx);
        }
        SelectionRange::Block {
            top,
            bottom,
            left,
            right,
        } => {
            text.delete_block(top, bottom, left, right);
            let origin = block_origin(text, top, left);
            text.set_cursor(origin, cursor_ctx);
        }
    }
    text.end_change();
    Ok(())
}

/// Delete a range and start an insert session that completes `record`.
pub(super) fn change(
    ctx: &mut EditorContext,
    range: SelectionRange,
    register: Option<char>,
    record: Change,
) -> EngineResult<()> {
    ctx.text.begin_change();
    let result = delete(ctx, range, register, true)
        .and_then(|()| mode::start_insert(ctx, InsertVariant::Change, 1, SessionOrigin::Change(record)));
    ctx.text.end_change();
    result
}
