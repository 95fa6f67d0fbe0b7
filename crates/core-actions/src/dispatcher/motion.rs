//! Motion sub-dispatch (cursor movement, marks, jump list).
//!
//! Landing positions come from `span_resolver::evaluate`; this module only
//! applies them: the sticky column, jump recording for jump motions and
//! extension of an active Visual selection.

use super::EditorContext;
use crate::MotionKind;
use crate::span_resolver;
use core_state::{CursorContext, EngineError, EngineResult};
use tracing::trace;

pub(super) fn handle_motion(
    ctx: &mut EditorContext,
    motion: MotionKind,
    count: Option<usize>,
) -> EngineResult<()> {
    if let MotionKind::Find(spec) = motion {
        ctx.last_find = Some(spec);
    }
    let from = ctx.text.cursor();
    let landing = span_resolver::evaluate(&ctx.text, motion, count, ctx.last_find, false)?;
    if motion.is_jump() && landing.pos != from {
        ctx.text.record_jump(from);
    }
    ctx.text.set_cursor(landing.pos, CursorContext::Normal);
    if landing.sticky_col.is_some() {
        ctx.text.set_sticky_col(landing.sticky_col);
    }
    if let Some(sel) = ctx.selection.as_mut() {
        sel.extend(ctx.text.cursor());
    }
    trace!(target: "actions.dispatch", ?motion, ?count, ?from, to = ?ctx.text.cursor(), "motion");
    Ok(())
}

pub(super) fn set_mark(ctx: &mut EditorContext, name: char) -> EngineResult<()> {
    let at = ctx.text.cursor();
    if !ctx.text.set_mark(name, at) {
        return Err(EngineError::MarkNotFound(name));
    }
    trace!(target: "state.marks", %name, row = at.row, col = at.col, "mark_set");
    Ok(())
}

pub(super) fn jump(ctx: &mut EditorContext, count: usize, forward: bool) -> EngineResult<()> {
    let to = if forward {
        ctx.text.jump_forward(count)?
    } else {
        ctx.text.jump_back(count)?
    };
    trace!(target: "state.marks", forward, row = to.row, col = to.col, "jump");
    Ok(())
}
