//! Mode entry/exit and insert sessions.
//!
//! An insert session opens a change group when it starts and closes it on
//! `<Esc>`, so everything typed (plus the deletion of a change operator)
//! undoes as one unit. Leaving the session replays the typed keys `count - 1`
//! more times, stores the text in the `.` register and steps the cursor back
//! one grapheme.

use super::{Change, EditorContext, InsertSession, SessionOrigin, edit, repeat};
use crate::EditKind;
use core_state::{CursorContext, EngineResult, InsertVariant, Mode, ModeEvent};
use core_text::{Position, grapheme, motion};
use tracing::trace;

pub(super) fn enter_insert(ctx: &mut EditorContext, variant: InsertVariant, count: usize) -> EngineResult<()> {
    start_insert(ctx, variant, count, SessionOrigin::Insert(variant))
}

pub(super) fn start_insert(
    ctx: &mut EditorContext,
    variant: InsertVariant,
    count: usize,
    origin: SessionOrigin,
) -> EngineResult<()> {
    ctx.modes.apply(ModeEvent::EnterInsert(variant))?;
    let text = &mut ctx.text;
    text.begin_change();
    let cur = text.cursor();
    let line = text.line(cur.row);
    match variant {
        InsertVariant::Insert | InsertVariant::Change => {}
        InsertVariant::Append => {
            let col = grapheme::next_boundary(&line, cur.col);
            text.set_cursor(Position::new(cur.row, col), CursorContext::Insert);
        }
        InsertVariant::InsertAtFirstNonBlank => {
            let mut pos = cur;
            motion::first_non_blank(text.buffer(), &mut pos);
            text.set_cursor(pos, CursorContext::Insert);
        }
        InsertVariant::AppendAtLineEnd => {
            text.set_cursor(Position::new(cur.row, line.len()), CursorContext::Insert);
        }
        InsertVariant::OpenBelow => {
            text.open_line(true);
        }
        InsertVariant::OpenAbove => {
            text.open_line(false);
        }
    }
    trace!(target: "actions.dispatch", ?variant, count, cursor = ?text.cursor(), "insert_session_started");
    ctx.session = Some(InsertSession::new(origin, count));
    Ok(())
}

pub(super) fn enter_replace(ctx: &mut EditorContext, count: usize) -> EngineResult<()> {
    ctx.modes.apply(ModeEvent::EnterReplace)?;
    ctx.text.begin_change();
    ctx.session = Some(InsertSession::new(SessionOrigin::Replace, count));
    Ok(())
}

pub(super) fn enter_replace_single(ctx: &mut EditorContext) -> EngineResult<()> {
    ctx.modes.apply(ModeEvent::EnterReplaceSingle)?;
    Ok(())
}

pub(super) fn escape(ctx: &mut EditorContext) -> EngineResult<()> {
    match ctx.mode() {
        Mode::Insert(_) | Mode::Replace => finish_session(ctx),
        Mode::Visual(_) => {
            ctx.modes.apply(ModeEvent::Escape)?;
            ctx.selection = None;
            ctx.text.clamp_cursor(CursorContext::Normal);
            Ok(())
        }
        Mode::CommandLine => {
            ctx.modes.apply(ModeEvent::Escape)?;
            ctx.command_line.clear();
            Ok(())
        }
        Mode::ReplaceSingle => {
            ctx.modes.apply(ModeEvent::Escape)?;
            Ok(())
        }
        Mode::Normal => Ok(()),
    }
}

/// Text an insert session leaves behind, for the `.` register.
fn inserted_text(keys: &[EditKind]) -> String {
    let mut out = String::new();
    for key in keys {
        match key {
            EditKind::InsertChar(c) => out.push(*c),
            EditKind::Newline => out.push('\n'),
            EditKind::Tab => out.push('\t'),
            EditKind::Backspace => {
                out.pop();
            }
            EditKind::DeleteUnder | EditKind::Move(_) => {}
        }
    }
    out
}

/// Leave Insert or Replace mode.
pub(super) fn finish_session(ctx: &mut EditorContext) -> EngineResult<()> {
    let (count, keys, open_lines) = match &ctx.session {
        Some(s) => (
            s.count,
            s.keys.clone(),
            matches!(
                s.origin,
                SessionOrigin::Insert(InsertVariant::OpenBelow | InsertVariant::OpenAbove)
            ),
        ),
        None => (1, Vec::new(), false),
    };
    for _ in 1..count {
        if open_lines {
            ctx.text.open_line(true);
        }
        for key in &keys {
            edit::apply_edit(ctx, key.clone(), false)?;
        }
    }
    let session = ctx.session.take();
    ctx.registers.set_last_insert(inserted_text(&keys));

    let cur = ctx.text.cursor();
    let line = ctx.text.line(cur.row);
    let col = if cur.col > 0 {
        grapheme::prev_boundary(&line, cur.col)
    } else {
        0
    };
    ctx.modes.apply(ModeEvent::Escape)?;
    ctx.text.set_cursor(Position::new(cur.row, col), CursorContext::Normal);
    let changed = ctx.text.end_change();
    trace!(target: "actions.dispatch", count, keys = keys.len(), changed, "insert_session_finished");

    if let Some(session) = session {
        let change = match session.origin {
            SessionOrigin::Insert(variant) => Change::Insert { variant, count, keys },
            SessionOrigin::Replace => Change::Replace { count, keys },
            SessionOrigin::Change(record) => record.with_inserted(keys),
        };
        repeat::record(ctx, change);
    }
    Ok(())
}
