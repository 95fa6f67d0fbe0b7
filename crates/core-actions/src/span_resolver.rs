//! Motion evaluation and operator span resolution.
//!
//! `evaluate` computes where a motion lands without touching editor state; the
//! motion dispatcher applies the landing, the operator path turns it into a
//! range. Every motion has a class:
//! * Exclusive: the range stops before the landing position.
//! * Inclusive: the grapheme under the landing position is part of the range.
//! * Linewise: whole rows between start and landing.
//!
//! Under an operator the usual vi adjustments apply. `dw` never runs past the
//! end of the line holding the last word it crossed. An exclusive range that
//! ends in column 0 of a later row ends at the end of the previous row instead,
//! and becomes linewise when it started at or before the first non-blank.
//! `cw` on a non-blank changes to the end of the word.

use crate::{MotionKind, OperatorKind};
use core_state::{EngineError, EngineResult, STICKY_EOL, SelectionRange, TextBuffer};
use core_text::grapheme::{self, CharClass};
use core_text::motion::{self, FindSpec};
use core_text::{Buffer, Position};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionClass {
    Exclusive,
    Inclusive,
    Linewise,
}

impl MotionKind {
    /// Range class of this motion. Repeated finds inherit it from the last find.
    pub fn class(self, last_find: Option<FindSpec>) -> MotionClass {
        use MotionKind::*;
        let find_class = |spec: FindSpec| {
            if spec.forward {
                MotionClass::Inclusive
            } else {
                MotionClass::Exclusive
            }
        };
        match self {
            Up | Down | FileStart | FileEnd | MarkLine(_) => MotionClass::Linewise,
            WordEnd | BigWordEnd | LineEnd => MotionClass::Inclusive,
            Find(spec) => find_class(spec),
            RepeatFind => last_find.map_or(MotionClass::Exclusive, find_class),
            RepeatFindReverse => last_find.map_or(MotionClass::Exclusive, |s| find_class(s.reversed())),
            _ => MotionClass::Exclusive,
        }
    }

    /// Jump motions record the position they leave in the jump list.
    pub fn is_jump(self) -> bool {
        matches!(
            self,
            MotionKind::FileStart
                | MotionKind::FileEnd
                | MotionKind::ParagraphForward
                | MotionKind::ParagraphBackward
                | MotionKind::MarkExact(_)
                | MotionKind::MarkLine(_)
        )
    }

    fn is_word_forward(self) -> bool {
        matches!(self, MotionKind::WordForward | MotionKind::BigWordForward)
    }
}

/// Where a motion lands and the sticky column the cursor should keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub pos: Position,
    pub sticky_col: Option<usize>,
}

/// Evaluate `motion` from the cursor. `operator` lets `l` reach one past the
/// last grapheme so `x` and `dl` can take it.
pub fn evaluate(
    text: &TextBuffer,
    motion: MotionKind,
    count: Option<usize>,
    last_find: Option<FindSpec>,
    operator: bool,
) -> EngineResult<Landing> {
    evaluate_from(text, text.cursor(), motion, count, last_find, operator)
}

fn evaluate_from(
    text: &TextBuffer,
    start: Position,
    motion: MotionKind,
    count: Option<usize>,
    last_find: Option<FindSpec>,
    operator: bool,
) -> EngineResult<Landing> {
    use MotionKind::*;
    let buf = text.buffer();
    let n = count.unwrap_or(1).max(1);
    let mut pos = start;
    let mut sticky_col = None;
    let moved = match motion {
        Left => motion::left(buf, &mut pos, n),
        Right => motion::right(buf, &mut pos, n, operator),
        Up | Down => {
            let want = text.wanted_col();
            sticky_col = Some(want);
            if motion == Up {
                motion::up(buf, &mut pos, n, want, false)
            } else {
                motion::down(buf, &mut pos, n, want, false)
            }
        }
        LineStart => {
            motion::line_start(&mut pos);
            true
        }
        FirstNonBlank => {
            motion::first_non_blank(buf, &mut pos);
            true
        }
        LineEnd => {
            pos.row = (pos.row + n - 1).min(buf.last_row());
            motion::line_end(buf, &mut pos, false);
            sticky_col = Some(STICKY_EOL);
            true
        }
        WordForward | BigWordForward => {
            motion::word_forward(buf, &mut pos, n, motion == BigWordForward)
        }
        WordBackward | BigWordBackward => {
            motion::word_backward(buf, &mut pos, n, motion == BigWordBackward)
        }
        WordEnd | BigWordEnd => motion::word_end_forward(buf, &mut pos, n, motion == BigWordEnd),
        FileStart | FileEnd => {
            let row = match (count, motion) {
                (Some(c), _) => c.saturating_sub(1),
                (None, FileStart) => 0,
                (None, _) => buf.last_row(),
            };
            motion::goto_row(buf, &mut pos, row);
            true
        }
        ParagraphForward => motion::paragraph_forward(buf, &mut pos, n),
        ParagraphBackward => motion::paragraph_backward(buf, &mut pos, n),
        Find(spec) => motion::find_char(buf, &mut pos, spec, n, false),
        RepeatFind | RepeatFindReverse => {
            let spec = last_find.ok_or(EngineError::MotionFailed)?;
            let spec = if motion == RepeatFind { spec } else { spec.reversed() };
            motion::find_char(buf, &mut pos, spec, n, true)
        }
        MarkExact(name) => {
            pos = text.mark(name)?;
            true
        }
        MarkLine(name) => {
            pos = text.mark(name)?;
            motion::first_non_blank(buf, &mut pos);
            true
        }
    };
    if !moved {
        trace!(target: "actions.dispatch", ?motion, ?start, "motion_failed");
        return Err(EngineError::MotionFailed);
    }
    Ok(Landing { pos, sticky_col })
}

/// Range an operator acts on when driven by `motion`.
pub fn resolve_operator_span(
    text: &TextBuffer,
    op: OperatorKind,
    motion: MotionKind,
    count: Option<usize>,
    last_find: Option<FindSpec>,
) -> EngineResult<SelectionRange> {
    let buf = text.buffer();
    let start = text.cursor();
    if op == OperatorKind::Change
        && motion.is_word_forward()
        && let Some(range) = change_word_span(buf, start, count, motion == MotionKind::BigWordForward)
    {
        return Ok(range);
    }

    let landing = evaluate(text, motion, count, last_find, true)?;
    let (a, b) = if landing.pos < start {
        (landing.pos, start)
    } else {
        (start, landing.pos)
    };
    let range = match motion.class(last_find) {
        MotionClass::Linewise => SelectionRange::Lines {
            first: a.row,
            last: b.row,
        },
        MotionClass::Inclusive => {
            let line = text.line(b.row);
            SelectionRange::Chars {
                start: a,
                end: Position::new(b.row, grapheme::next_boundary(&line, b.col)),
            }
        }
        MotionClass::Exclusive => {
            let mut end = b;
            if motion.is_word_forward() && end.row > start.row {
                end = word_forward_stop(text, motion, count, last_find)?;
            }
            exclusive_range(buf, a, end)
        }
    };
    trace!(target: "actions.dispatch", ?op, ?motion, ?range, "operator_span");
    Ok(range)
}

/// `dw` rule: when the last word step crosses into a later row, the range
/// stops at the end of the row that step started on. An empty row keeps its
/// line break.
fn word_forward_stop(
    text: &TextBuffer,
    motion: MotionKind,
    count: Option<usize>,
    last_find: Option<FindSpec>,
) -> EngineResult<Position> {
    let n = count.unwrap_or(1).max(1);
    let before_last = if n > 1 {
        evaluate(text, motion, Some(n - 1), last_find, true)?.pos
    } else {
        text.cursor()
    };
    let row = before_last.row;
    let len = text.line_len(row);
    if len == 0 {
        Ok(Position::new(row + 1, 0))
    } else {
        Ok(Position::new(row, len))
    }
}

fn exclusive_range(buf: &Buffer, start: Position, end: Position) -> SelectionRange {
    if end.row > start.row && end.col == 0 {
        let prev = end.row - 1;
        let line = buf.line(start.row).unwrap_or_default();
        if start.col <= grapheme::first_non_blank(&line) {
            return SelectionRange::Lines {
                first: start.row,
                last: prev,
            };
        }
        return SelectionRange::Chars {
            start,
            end: Position::new(prev, buf.line_len(prev)),
        };
    }
    SelectionRange::Chars { start, end }
}

/// `cw` on a non-blank: change through the end of the word. A cursor already on
/// the last grapheme of a word counts that word as the first step.
fn change_word_span(buf: &Buffer, start: Position, count: Option<usize>, big: bool) -> Option<SelectionRange> {
    let line = buf.line(start.row).unwrap_or_default();
    let here = grapheme::at(&line, start.col)?;
    let class = grapheme::classify(here, big);
    if class == CharClass::Blank {
        return None;
    }
    let next = grapheme::next_boundary(&line, start.col);
    let at_word_end = grapheme::at(&line, next).is_none_or(|g| grapheme::classify(g, big) != class);
    let mut steps = count.unwrap_or(1).max(1);
    if at_word_end {
        steps -= 1;
    }
    let mut pos = start;
    if steps > 0 {
        motion::word_end_forward(buf, &mut pos, steps, big);
    }
    let end_line = buf.line(pos.row).unwrap_or_default();
    Some(SelectionRange::Chars {
        start,
        end: Position::new(pos.row, grapheme::next_boundary(&end_line, pos.col)),
    })
}
