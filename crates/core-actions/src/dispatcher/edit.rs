//! Text edits: insert/replace-mode keys, put, join and `r`.
//!
//! Insert-mode keys are applied through `apply_edit` so the same code serves
//! typing, counted replays and `.`. Replace mode remembers what each typed key
//! overwrote; `<BS>` restores it.

use super::{Change, EditorContext, InsertSession, SessionOrigin, repeat};
use crate::EditKind;
use core_state::{
    CursorContext, Direction, EngineError, EngineResult, InsertVariant, Mode, ModeEvent, PutPlacement,
};
use core_text::{Position, grapheme};
use tracing::trace;

/// What one Replace-mode key did to the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Overwrite {
    Replaced(String),
    Appended,
    LineBreak,
}

pub(super) fn handle_edit(ctx: &mut EditorContext, kind: EditKind) -> EngineResult<()> {
    if !matches!(ctx.mode(), Mode::Insert(_) | Mode::Replace) {
        return Ok(());
    }
    apply_edit(ctx, kind, true)
}

/// Apply one insert/replace key. `record` appends it to the session keys.
pub(super) fn apply_edit(ctx: &mut EditorContext, kind: EditKind, record: bool) -> EngineResult<()> {
    let replace = ctx.mode() == Mode::Replace;
    trace!(target: "actions.dispatch", ?kind, replace, cursor = ?ctx.text.cursor(), "edit");
    match &kind {
        EditKind::Move(dir) => {
            move_in_session(ctx, *dir);
            return Ok(());
        }
        EditKind::InsertChar(c) => {
            let mut buf = [0u8; 4];
            let s = c.encode_utf8(&mut buf);
            if replace {
                overwrite(ctx, s);
            } else {
                ctx.text.insert_text(s);
            }
        }
        EditKind::Tab => {
            let s = tab_text(ctx);
            if replace {
                overwrite(ctx, &s);
            } else {
                ctx.text.insert_text(&s);
            }
        }
        EditKind::Newline => {
            ctx.text.insert_text("\n");
            if replace {
                push_overwrite(ctx, Overwrite::LineBreak);
            }
        }
        EditKind::Backspace => {
            if replace {
                replace_backspace(ctx);
            } else {
                insert_backspace(ctx);
            }
        }
        EditKind::DeleteUnder => delete_under(ctx),
    }
    if record && let Some(session) = ctx.session.as_mut() {
        session.keys.push(kind);
    }
    Ok(())
}

fn tab_text(ctx: &EditorContext) -> String {
    if !ctx.config.expand_tab {
        return "\t".to_string();
    }
    let cur = ctx.text.cursor();
    let col = grapheme::visual_col(&ctx.text.line(cur.row), cur.col);
    let width = ctx.config.tab_width.max(1);
    " ".repeat(width - col % width)
}

fn push_overwrite(ctx: &mut EditorContext, entry: Overwrite) {
    if let Some(session) = ctx.session.as_mut() {
        session.overwritten.push(entry);
    }
}

fn overwrite(ctx: &mut EditorContext, s: &str) {
    let cur = ctx.text.cursor();
    let line = ctx.text.line(cur.row);
    let entry = match grapheme::at(&line, cur.col) {
        Some(old) => {
            let old = old.to_string();
            let end = Position::new(cur.row, cur.col + old.len());
            let to = ctx.text.replace_range(cur, end, s);
            ctx.text.set_cursor(to, CursorContext::Insert);
            Overwrite::Replaced(old)
        }
        None => {
            ctx.text.insert_text(s);
            Overwrite::Appended
        }
    };
    push_overwrite(ctx, entry);
}

fn insert_backspace(ctx: &mut EditorContext) {
    let cur = ctx.text.cursor();
    if cur.col > 0 {
        let line = ctx.text.line(cur.row);
        let start = Position::new(cur.row, grapheme::prev_boundary(&line, cur.col));
        ctx.text.delete_range(start, cur);
        ctx.text.set_cursor(start, CursorContext::Insert);
    } else if cur.row > 0 {
        join_with_previous(ctx, cur.row);
    }
}

fn join_with_previous(ctx: &mut EditorContext, row: usize) {
    let prev = Position::new(row - 1, ctx.text.line_len(row - 1));
    ctx.text.delete_range(prev, Position::new(row, 0));
    ctx.text.set_cursor(prev, CursorContext::Insert);
}

fn replace_backspace(ctx: &mut EditorContext) {
    let cur = ctx.text.cursor();
    let entry = ctx.session.as_mut().and_then(|s| s.overwritten.pop());
    let line = ctx.text.line(cur.row);
    let start = Position::new(cur.row, grapheme::prev_boundary(&line, cur.col));
    match entry {
        Some(Overwrite::LineBreak) if cur.row > 0 => join_with_previous(ctx, cur.row),
        Some(Overwrite::Replaced(old)) => {
            ctx.text.replace_range(start, cur, &old);
            ctx.text.set_cursor(start, CursorContext::Insert);
        }
        Some(Overwrite::Appended) => {
            ctx.text.delete_range(start, cur);
            ctx.text.set_cursor(start, CursorContext::Insert);
        }
        _ => ctx.text.set_cursor(start, CursorContext::Insert),
    }
}

fn delete_under(ctx: &mut EditorContext) {
    let cur = ctx.text.cursor();
    let line = ctx.text.line(cur.row);
    if cur.col < line.len() {
        let end = Position::new(cur.row, grapheme::next_boundary(&line, cur.col));
        ctx.text.delete_range(cur, end);
    } else if cur.row < ctx.text.last_row() {
        ctx.text.delete_range(cur, Position::new(cur.row + 1, 0));
    }
    ctx.text.set_cursor(cur, CursorContext::Insert);
}

/// Arrow keys end the repeatable part of a session; what follows is a plain insert.
fn move_in_session(ctx: &mut EditorContext, dir: Direction) {
    ctx.text.move_cursor_relative(dir, 1, CursorContext::Insert);
    if let Some(session) = ctx.session.as_mut() {
        let origin = match session.origin {
            SessionOrigin::Replace => SessionOrigin::Replace,
            _ => SessionOrigin::Insert(InsertVariant::Insert),
        };
        *session = InsertSession::new(origin, 1);
        ctx.text.end_change();
        ctx.text.begin_change();
    }
}

pub(super) fn handle_put(
    ctx: &mut EditorContext,
    placement: PutPlacement,
    count: usize,
    register: Option<char>,
) -> EngineResult<()> {
    let content = ctx.registers.get(register)?;
    if content.is_empty() {
        return match register {
            Some(name) if name != '"' => Err(EngineError::RegisterMiss(name)),
            _ => Ok(()),
        };
    }
    ctx.text.put(&content, placement, count);
    trace!(target: "actions.dispatch", ?placement, count, ?register, kind = ?content.kind, "put");
    repeat::record(
        ctx,
        Change::Put {
            placement,
            count,
            register,
        },
    );
    Ok(())
}

pub(super) fn handle_join(ctx: &mut EditorContext, count: usize, spaces: bool) -> EngineResult<()> {
    let row = ctx.text.cursor().row;
    if !ctx.text.join_lines(row, count, spaces) {
        return Err(EngineError::MotionFailed);
    }
    repeat::record(ctx, Change::Join { count, spaces });
    Ok(())
}

/// `r{ch}`: replace `count` graphemes; `r<CR>` swaps them for one line break.
pub(super) fn handle_replace_char(ctx: &mut EditorContext, ch: char, count: usize) -> EngineResult<()> {
    if ctx.mode() == Mode::ReplaceSingle {
        ctx.modes.apply(ModeEvent::ReplaceCommitted)?;
    }
    let cur = ctx.text.cursor();
    let replaced = if ch == '\n' {
        let line = ctx.text.line(cur.row);
        let mut end = cur.col;
        for _ in 0..count.max(1) {
            if end >= line.len() {
                return Err(EngineError::MotionFailed);
            }
            end = grapheme::next_boundary(&line, end);
        }
        ctx.text.replace_range(cur, Position::new(cur.row, end), "\n");
        ctx.text.set_cursor(Position::new(cur.row + 1, 0), CursorContext::Normal);
        true
    } else {
        ctx.text.replace_chars(cur, count, ch)
    };
    if !replaced {
        return Err(EngineError::MotionFailed);
    }
    repeat::record(ctx, Change::ReplaceChar { ch, count });
    Ok(())
}
