//! The last buffer-changing command and its replay (`.`).
//!
//! Changes are recorded once they complete: operators when they return,
//! insert sessions and `c` when the session ends on `<Esc>`. Replays run
//! with recording suspended and as a single undo unit.

use super::visual::{self, VisualEdit, VisualShape};
use super::{EditorContext, edit, mode, operator};
use crate::{EditKind, OperatorKind, OperatorTarget};
use core_state::{EngineError, EngineResult, InsertVariant, PutPlacement};
use tracing::{debug, trace};

/// A repeatable change, with the keys typed in its insert session if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Change {
    Operator {
        op: OperatorKind,
        target: OperatorTarget,
        count: Option<usize>,
        register: Option<char>,
        inserted: Vec<EditKind>,
    },
    Visual {
        edit: VisualEdit,
        shape: VisualShape,
        register: Option<char>,
        inserted: Vec<EditKind>,
    },
    Insert {
        variant: InsertVariant,
        count: usize,
        keys: Vec<EditKind>,
    },
    Replace {
        count: usize,
        keys: Vec<EditKind>,
    },
    Put {
        placement: PutPlacement,
        count: usize,
        register: Option<char>,
    },
    Join {
        count: usize,
        spaces: bool,
    },
    ReplaceChar {
        ch: char,
        count: usize,
    },
}

impl Change {
    pub(crate) fn with_inserted(self, keys: Vec<EditKind>) -> Self {
        match self {
            Change::Operator {
                op,
                target,
                count,
                register,
                ..
            } => Change::Operator {
                op,
                target,
                count,
                register,
                inserted: keys,
            },
            Change::Visual {
                edit, shape, register, ..
            } => Change::Visual {
                edit,
                shape,
                register,
                inserted: keys,
            },
            Change::Insert { variant, count, .. } => Change::Insert { variant, count, keys },
            Change::Replace { count, .. } => Change::Replace { count, keys },
            other => other,
        }
    }

    /// The same change with its count replaced. Visual changes keep their shape.
    fn with_count(mut self, n: usize) -> Self {
        match &mut self {
            Change::Operator { count, .. } => *count = Some(n),
            Change::Insert { count, .. }
            | Change::Replace { count, .. }
            | Change::Put { count, .. }
            | Change::Join { count, .. }
            | Change::ReplaceChar { count, .. } => *count = n,
            Change::Visual { .. } => {}
        }
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct RepeatState {
    pub(crate) last: Option<Change>,
    pub(crate) replaying: bool,
}

pub(super) fn record(ctx: &mut EditorContext, change: Change) {
    if ctx.repeat.replaying {
        return;
    }
    trace!(target: "actions.repeat", ?change, "recorded");
    ctx.repeat.last = Some(change);
}

pub(super) fn handle_repeat(ctx: &mut EditorContext, count: Option<usize>) -> EngineResult<()> {
    let Some(last) = ctx.repeat.last.clone() else {
        return Err(EngineError::NoPreviousChange);
    };
    let change = match count {
        Some(n) => last.with_count(n),
        None => last,
    };
    debug!(target: "actions.repeat", ?change, ?count, "replay");
    ctx.repeat.replaying = true;
    ctx.text.begin_change();
    let result = replay(ctx, &change);
    ctx.text.end_change();
    ctx.repeat.replaying = false;
    if result.is_ok() && count.is_some() {
        ctx.repeat.last = Some(change);
    }
    result
}

fn replay(ctx: &mut EditorContext, change: &Change) -> EngineResult<()> {
    match change.clone() {
        Change::Operator {
            op,
            target,
            count,
            register,
            inserted,
        } => {
            operator::handle_operator(ctx, op, target, count, register)?;
            if op == OperatorKind::Change {
                finish_with(ctx, &inserted)?;
            }
            Ok(())
        }
        Change::Visual {
            edit,
            shape,
            register,
            inserted,
        } => {
            let range = shape.place(&ctx.text);
            match edit {
                VisualEdit::Delete => operator::delete(ctx, range, register, false),
                VisualEdit::Change => {
                    operator::change(ctx, range, register, change.clone())?;
                    finish_with(ctx, &inserted)
                }
                VisualEdit::Join { spaces } => visual::join_rows(ctx, range, spaces),
                VisualEdit::Replace(ch) => {
                    visual::replace_in(ctx, range, ch);
                    Ok(())
                }
                VisualEdit::Put { count } => visual::put_over(ctx, range, register, count),
            }
        }
        Change::Insert { variant, count, keys } => {
            mode::enter_insert(ctx, variant, count)?;
            finish_with(ctx, &keys)
        }
        Change::Replace { count, keys } => {
            mode::enter_replace(ctx, count)?;
            finish_with(ctx, &keys)
        }
        Change::Put {
            placement,
            count,
            register,
        } => edit::handle_put(ctx, placement, count, register),
        Change::Join { count, spaces } => edit::handle_join(ctx, count, spaces),
        Change::ReplaceChar { ch, count } => edit::handle_replace_char(ctx, ch, count),
    }
}

/// Type `keys` into the open session, then leave it.
fn finish_with(ctx: &mut EditorContext, keys: &[EditKind]) -> EngineResult<()> {
    let typed = keys
        .iter()
        .try_for_each(|key| edit::apply_edit(ctx, key.clone(), true));
    mode::finish_session(ctx)?;
    typed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MotionKind;
    use core_config::EngineConfig;
    use core_state::{CursorContext, Mode};
    use core_text::{Buffer, Position};
    use pretty_assertions::assert_eq;

    fn ctx(lines: &[&str]) -> EditorContext {
        EditorContext::new(Buffer::from_lines(lines), EngineConfig::default())
    }

    fn type_text(c: &mut EditorContext, s: &str) {
        for ch in s.chars() {
            edit::handle_edit(c, EditKind::InsertChar(ch)).unwrap();
        }
    }

    #[test]
    fn nothing_to_repeat() {
        let mut c = ctx(&["abc"]);
        assert_eq!(handle_repeat(&mut c, None), Err(EngineError::NoPreviousChange));
    }

    #[test]
    fn repeat_delete_with_new_count() {
        let mut c = ctx(&["a", "b", "c", "d", "e"]);
        operator::handle_operator(&mut c, OperatorKind::Delete, OperatorTarget::Lines, None, None).unwrap();
        handle_repeat(&mut c, Some(2)).unwrap();
        assert_eq!(c.text.lines(), vec!["d", "e"]);
        handle_repeat(&mut c, None).unwrap();
        assert_eq!(c.text.lines(), vec![""]);
    }

    #[test]
    fn repeat_change_word_replays_typed_text() {
        let mut c = ctx(&["foo bar baz"]);
        operator::handle_operator(
            &mut c,
            OperatorKind::Change,
            OperatorTarget::Motion(MotionKind::WordForward),
            None,
            None,
        )
        .unwrap();
        type_text(&mut c, "X");
        mode::escape(&mut c).unwrap();
        assert_eq!(c.text.lines(), vec!["X bar baz"]);
        c.text.set_cursor(Position::new(0, 2), CursorContext::Normal);
        handle_repeat(&mut c, None).unwrap();
        assert_eq!(c.text.lines(), vec!["X X baz"]);
        assert_eq!(c.mode(), Mode::Normal);
        c.text.undo(1).unwrap();
        assert_eq!(c.text.lines(), vec!["X bar baz"]);
    }

    #[test]
    fn repeat_insert_keeps_count() {
        let mut c = ctx(&["", ""]);
        mode::enter_insert(&mut c, InsertVariant::Insert, 2).unwrap();
        type_text(&mut c, "ab");
        mode::escape(&mut c).unwrap();
        assert_eq!(c.text.lines(), vec!["abab", ""]);
        c.text.set_cursor(Position::new(1, 0), CursorContext::Normal);
        handle_repeat(&mut c, None).unwrap();
        assert_eq!(c.text.lines(), vec!["abab", "abab"]);
    }

    #[test]
    fn yank_is_not_repeatable() {
        let mut c = ctx(&["abc"]);
        operator::handle_operator(&mut c, OperatorKind::Yank, OperatorTarget::Lines, None, None).unwrap();
        assert!(c.repeat.last.is_none());
    }

    #[test]
    fn replay_does_not_rerecord() {
        let mut c = ctx(&["abcdef"]);
        edit::handle_replace_char(&mut c, 'x', 2).unwrap();
        c.text.set_cursor(Position::new(0, 3), CursorContext::Normal);
        handle_repeat(&mut c, None).unwrap();
        assert_eq!(c.text.lines(), vec!["xxcxxf"]);
        assert_eq!(c.repeat.last, Some(Change::ReplaceChar { ch: 'x', count: 2 }));
    }
}
