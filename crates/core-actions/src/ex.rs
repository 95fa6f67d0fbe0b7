//! Pre-resolved ex operations.
//!
//! The host parses `:` lines; the engine receives the result as an
//! `ExCommand` over 0-based line ranges. Each command is one undo unit and
//! only runs from Normal mode.

use crate::dispatcher::{self, DispatchResult, EditorContext};
use core_state::{
    CursorContext, EngineError, EngineResult, Mode, ModeEvent, SelectionRange, TextBuffer,
};
use core_text::{Position, motion};
use regex::Regex;
use tracing::debug;

/// Inclusive, 0-based line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub first: usize,
    pub last: usize,
}

impl LineRange {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    pub fn single(row: usize) -> Self {
        Self { first: row, last: row }
    }

    fn clamp(self, text: &TextBuffer) -> Self {
        let last_row = text.last_row();
        Self {
            first: self.first.min(last_row),
            last: self.last.min(last_row),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExCommand {
    Delete {
        range: LineRange,
        register: Option<char>,
    },
    Yank {
        range: LineRange,
        register: Option<char>,
    },
    Substitute {
        range: LineRange,
        pattern: Regex,
        replacement: String,
        global: bool,
    },
    Join {
        range: LineRange,
    },
    GotoLine(usize),
    SetMark {
        name: char,
        row: usize,
    },
}

/// Apply an ex command. Failures come back as the result's notice.
pub fn execute(cmd: &ExCommand, ctx: &mut EditorContext) -> DispatchResult {
    dispatcher::observed(ctx, |ctx| {
        let from = ctx.mode();
        if from != Mode::Normal {
            return Err(EngineError::InvalidTransition {
                from,
                event: ModeEvent::EnterCommandLine,
            });
        }
        debug!(target: "actions.ex", ?cmd, "execute");
        ctx.text.begin_change();
        let result = apply(cmd, ctx);
        ctx.text.end_change();
        result.map(|()| None)
    })
}

fn apply(cmd: &ExCommand, ctx: &mut EditorContext) -> EngineResult<()> {
    match cmd {
        ExCommand::Delete { range, register } => {
            let LineRange { first, last } = range.clamp(&ctx.text);
            dispatcher::delete_range(ctx, SelectionRange::Lines { first, last }, *register, false)
        }
        ExCommand::Yank { range, register } => {
            let LineRange { first, last } = range.clamp(&ctx.text);
            let content = dispatcher::capture_range(&ctx.text, SelectionRange::Lines { first, last });
            ctx.registers.yank(*register, content)
        }
        ExCommand::Substitute {
            range,
            pattern,
            replacement,
            global,
        } => substitute(ctx, range.clamp(&ctx.text), pattern, replacement, *global),
        ExCommand::Join { range } => {
            let LineRange { first, last } = range.clamp(&ctx.text);
            let count = (last - first + 1).max(2);
            if ctx.text.join_lines(first, count, true) {
                Ok(())
            } else {
                Err(EngineError::MotionFailed)
            }
        }
        ExCommand::GotoLine(row) => {
            let from = ctx.text.cursor();
            let mut to = Position::new((*row).min(ctx.text.last_row()), 0);
            motion::first_non_blank(ctx.text.buffer(), &mut to);
            if to != from {
                ctx.text.record_jump(from);
            }
            ctx.text.set_cursor(to, CursorContext::Normal);
            Ok(())
        }
        ExCommand::SetMark { name, row } => {
            let row = (*row).min(ctx.text.last_row());
            if ctx.text.set_mark(*name, Position::new(row, 0)) {
                Ok(())
            } else {
                Err(EngineError::MarkNotFound(*name))
            }
        }
    }
}

/// Rewrite every line of `range` through `pattern`. Replacements may add line
/// breaks; later rows are shifted accordingly.
fn substitute(
    ctx: &mut EditorContext,
    range: LineRange,
    pattern: &Regex,
    replacement: &str,
    global: bool,
) -> EngineResult<()> {
    let text = &mut ctx.text;
    let mut shift = 0;
    let mut last_changed = None;
    for row in range.first..=range.last {
        let row = row + shift;
        let line = text.line(row);
        let replaced = if global {
            pattern.replace_all(&line, replacement)
        } else {
            pattern.replace(&line, replacement)
        };
        if replaced == line.as_str() {
            continue;
        }
        let added = replaced.matches('\n').count();
        text.replace_range(Position::new(row, 0), Position::new(row, line.len()), &replaced);
        shift += added;
        last_changed = Some(row + added);
    }
    let row = last_changed.ok_or(EngineError::MotionFailed)?;
    let mut to = Position::new(row, 0);
    motion::first_non_blank(text.buffer(), &mut to);
    text.set_cursor(to, CursorContext::Normal);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::EngineConfig;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn ctx(lines: &[&str]) -> EditorContext {
        EditorContext::new(Buffer::from_lines(lines), EngineConfig::default())
    }

    fn sub(range: LineRange, pat: &str, rep: &str, global: bool) -> ExCommand {
        ExCommand::Substitute {
            range,
            pattern: Regex::new(pat).unwrap(),
            replacement: rep.to_string(),
            global,
        }
    }

    #[test]
    fn substitute_first_or_all_matches() {
        let mut c = ctx(&["a a", "  b a", "c"]);
        let r = execute(&sub(LineRange::new(0, 1), "a", "x", false), &mut c);
        assert!(r.buffer_changed);
        assert_eq!(c.text.lines(), vec!["x a", "  b x", "c"]);
        assert_eq!(c.text.cursor(), Position::new(1, 2));
        execute(&sub(LineRange::single(0), "a|x", "y", true), &mut c);
        assert_eq!(c.text.lines()[0], "y y");
    }

    #[test]
    fn substitute_is_one_undo_unit() {
        let mut c = ctx(&["foo", "foo"]);
        execute(&sub(LineRange::new(0, 9), "(o+)", "[$1]", false), &mut c);
        assert_eq!(c.text.lines(), vec!["f[oo]", "f[oo]"]);
        c.text.undo(1).unwrap();
        assert_eq!(c.text.lines(), vec!["foo", "foo"]);
    }

    #[test]
    fn substitute_with_line_breaks_shifts_rows() {
        let mut c = ctx(&["a,b", "c,d"]);
        execute(&sub(LineRange::new(0, 1), ",", "\n", false), &mut c);
        assert_eq!(c.text.lines(), vec!["a", "b", "c", "d"]);
        assert_eq!(c.text.cursor(), Position::new(3, 0));
    }

    #[test]
    fn substitute_without_match_reports() {
        let mut c = ctx(&["abc"]);
        let r = execute(&sub(LineRange::single(0), "z", "y", false), &mut c);
        assert_eq!(r.notice, Some(EngineError::MotionFailed));
        assert!(!r.buffer_changed);
    }

    #[test]
    fn delete_and_yank_ranges() {
        let mut c = ctx(&["a", "b", "c", "d"]);
        execute(
            &ExCommand::Yank {
                range: LineRange::new(2, 3),
                register: Some('k'),
            },
            &mut c,
        );
        assert_eq!(c.registers.get(Some('k')).unwrap().text, "c\nd\n");
        execute(
            &ExCommand::Delete {
                range: LineRange::new(1, 2),
                register: None,
            },
            &mut c,
        );
        assert_eq!(c.text.lines(), vec!["a", "d"]);
        assert_eq!(c.registers.get(Some('1')).unwrap().text, "b\nc\n");
    }

    #[test]
    fn goto_records_a_jump_and_marks_clamp() {
        let mut c = ctx(&["a", "  b", "c"]);
        execute(&ExCommand::GotoLine(1), &mut c);
        assert_eq!(c.text.cursor(), Position::new(1, 2));
        c.text.jump_back(1).unwrap();
        assert_eq!(c.text.cursor(), Position::origin());
        execute(&ExCommand::SetMark { name: 'q', row: 40 }, &mut c);
        assert_eq!(c.text.mark('q'), Ok(Position::new(2, 0)));
    }

    #[test]
    fn join_range_and_mode_guard() {
        let mut c = ctx(&["a", "b", "c"]);
        execute(&ExCommand::Join { range: LineRange::single(0) }, &mut c);
        assert_eq!(c.text.lines(), vec!["a b", "c"]);
        c.modes.apply(ModeEvent::EnterInsert(core_state::InsertVariant::Insert)).unwrap();
        let r = execute(&ExCommand::GotoLine(1), &mut c);
        assert!(matches!(r.notice, Some(EngineError::InvalidTransition { .. })));
    }
}
