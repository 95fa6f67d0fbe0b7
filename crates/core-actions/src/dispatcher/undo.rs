//! Undo / redo over the change-group history.

use super::EditorContext;
use core_state::EngineResult;
use tracing::trace;

pub(super) fn handle_undo(ctx: &mut EditorContext, count: usize) -> EngineResult<()> {
    let done = ctx.text.undo(count)?;
    trace!(target: "actions.dispatch", op = "undo", count, done, "undo");
    Ok(())
}

pub(super) fn handle_redo(ctx: &mut EditorContext, count: usize) -> EngineResult<()> {
    let done = ctx.text.redo(count)?;
    trace!(target: "actions.dispatch", op = "redo", count, done, "redo");
    Ok(())
}
