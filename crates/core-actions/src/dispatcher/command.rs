//! Command-line (`:`) editing.
//!
//! The engine only collects the line. A submitted line is handed back to the
//! host on the dispatch result; `ex::execute` runs the small built-in subset.

use super::EditorContext;
use core_state::{EngineResult, ModeEvent};
use tracing::debug;

/// `:` with an optional count. A count pre-fills a range over that many lines.
pub(super) fn start(ctx: &mut EditorContext, count: Option<usize>) -> EngineResult<()> {
    ctx.modes.apply(ModeEvent::EnterCommandLine)?;
    let prefill = match count {
        None => String::new(),
        Some(1) => ".".to_string(),
        Some(n) => format!(".,.+{}", n - 1),
    };
    ctx.command_line.begin(&prefill);
    Ok(())
}

pub(super) fn push(ctx: &mut EditorContext, ch: char) -> EngineResult<()> {
    ctx.command_line.push_char(ch);
    Ok(())
}

/// Backspace on an empty line leaves command-line mode.
pub(super) fn backspace(ctx: &mut EditorContext) -> EngineResult<()> {
    if !ctx.command_line.backspace() {
        ctx.modes.apply(ModeEvent::Escape)?;
    }
    Ok(())
}

pub(super) fn submit(ctx: &mut EditorContext) -> EngineResult<String> {
    let line = ctx.command_line.content().to_string();
    ctx.modes.apply(ModeEvent::Submit)?;
    ctx.command_line.clear();
    debug!(target: "actions.ex", %line, "submitted");
    Ok(line)
}
