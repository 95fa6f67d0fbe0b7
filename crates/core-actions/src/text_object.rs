//! Text objects (`iw`, `a"`, `i{`, `ap`, ...).
//!
//! Objects are resolved around the cursor, independent of any motion, into the
//! same `SelectionRange` an operator or Visual selection consumes.
//!
//! Words, sentences and paragraphs share one model: the cursor's line (or the
//! whole buffer for paragraphs) is cut into alternating blank and non-blank
//! units. `i` takes `count` units starting at the cursor's unit; `a` pairs each
//! non-blank unit with the blank run after it, falling back to the blank run
//! before it when nothing trails. Starting on a blank unit pairs it with the
//! following non-blank unit instead.
//!
//! Word and sentence objects stay on the cursor line. Quote objects search the
//! cursor line; bracket objects search outward across lines.

use core_state::{EngineError, EngineResult, SelectionRange};
use core_text::grapheme::{self, CharClass};
use core_text::{Buffer, Position};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObjectKind {
    Word,
    BigWord,
    Sentence,
    Paragraph,
    /// `"`, `'` or `` ` ``
    Quote(char),
    Bracket { open: char, close: char },
}

impl TextObjectKind {
    /// Object named by the key typed after `i` / `a`.
    pub fn from_key(c: char) -> Option<Self> {
        Some(match c {
            'w' => TextObjectKind::Word,
            'W' => TextObjectKind::BigWord,
            's' => TextObjectKind::Sentence,
            'p' => TextObjectKind::Paragraph,
            '"' | '\'' | '`' => TextObjectKind::Quote(c),
            '(' | ')' | 'b' => TextObjectKind::Bracket {
                open: '(',
                close: ')',
            },
            '[' | ']' => TextObjectKind::Bracket {
                open: '[',
                close: ']',
            },
            '{' | '}' | 'B' => TextObjectKind::Bracket {
                open: '{',
                close: '}',
            },
            '<' | '>' => TextObjectKind::Bracket {
                open: '<',
                close: '>',
            },
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            TextObjectKind::Word => "word",
            TextObjectKind::BigWord => "WORD",
            TextObjectKind::Sentence => "sentence",
            TextObjectKind::Paragraph => "paragraph",
            TextObjectKind::Quote(_) => "quote",
            TextObjectKind::Bracket { .. } => "block",
        }
    }
}

/// An object kind plus inner (`i`) or around (`a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextObject {
    pub kind: TextObjectKind,
    pub inner: bool,
}

impl TextObject {
    pub fn inner(kind: TextObjectKind) -> Self {
        Self { kind, inner: true }
    }

    pub fn around(kind: TextObjectKind) -> Self {
        Self { kind, inner: false }
    }
}

/// Resolve `object` around `cursor`. Fails with `MotionFailed` when no such
/// object exists there.
pub fn resolve(buf: &Buffer, cursor: Position, object: TextObject, count: usize) -> EngineResult<SelectionRange> {
    let count = count.max(1);
    let range = match object.kind {
        TextObjectKind::Word => word(buf, cursor, count, false, object.inner),
        TextObjectKind::BigWord => word(buf, cursor, count, true, object.inner),
        TextObjectKind::Sentence => sentence(buf, cursor, count, object.inner),
        TextObjectKind::Paragraph => paragraph(buf, cursor, count, object.inner),
        TextObjectKind::Quote(q) => quote(buf, cursor, q, object.inner),
        TextObjectKind::Bracket { open, close } => bracket(buf, cursor, open, close, count, object.inner),
    };
    trace!(target: "actions.dispatch", object = object.kind.name(), inner = object.inner, ?range, "text_object");
    range.ok_or(EngineError::MotionFailed)
}

#[derive(Debug, Clone, Copy)]
struct Unit {
    start: usize,
    end: usize,
    blank: bool,
}

fn unit_at(units: &[Unit], at: usize) -> usize {
    units
        .iter()
        .position(|u| at >= u.start && at < u.end)
        .unwrap_or(units.len().saturating_sub(1))
}

fn inner_span(units: &[Unit], idx: usize, count: usize) -> (usize, usize) {
    let last = (idx + count - 1).min(units.len() - 1);
    (units[idx].start, units[last].end)
}

fn around_span(units: &[Unit], idx: usize, count: usize) -> (usize, usize) {
    let on_blank = units[idx].blank;
    let mut k = idx;
    let mut end = units[idx].end;
    for _ in 0..count {
        if k >= units.len() {
            break;
        }
        if on_blank {
            if units[k].blank {
                end = units[k].end;
                k += 1;
            }
            if k < units.len() {
                end = units[k].end;
                k += 1;
            }
        } else {
            end = units[k].end;
            k += 1;
            if k < units.len() && units[k].blank {
                end = units[k].end;
                k += 1;
            }
        }
    }
    let mut start = units[idx].start;
    let took_trailing = k > 0 && units[k - 1].blank;
    if !on_blank && !took_trailing && idx > 0 && units[idx - 1].blank {
        start = units[idx - 1].start;
    }
    (start, end)
}

fn span(units: &[Unit], at: usize, count: usize, inner: bool) -> Option<(usize, usize)> {
    if units.is_empty() {
        return None;
    }
    let idx = unit_at(units, at);
    Some(if inner {
        inner_span(units, idx, count)
    } else {
        around_span(units, idx, count)
    })
}

fn chars(row: usize, start: usize, end: usize) -> SelectionRange {
    SelectionRange::Chars {
        start: Position::new(row, start),
        end: Position::new(row, end),
    }
}

fn word(buf: &Buffer, cursor: Position, count: usize, big: bool, inner: bool) -> Option<SelectionRange> {
    let line = buf.line(cursor.row)?;
    let mut units: Vec<Unit> = Vec::new();
    let mut current: Option<(CharClass, Unit)> = None;
    for (b, g) in grapheme::iter_indices(&line) {
        let class = grapheme::classify(g, big);
        match &mut current {
            Some((c, unit)) if *c == class => unit.end = b + g.len(),
            _ => {
                if let Some((_, unit)) = current.take() {
                    units.push(unit);
                }
                current = Some((
                    class,
                    Unit {
                        start: b,
                        end: b + g.len(),
                        blank: class == CharClass::Blank,
                    },
                ));
            }
        }
    }
    if let Some((_, unit)) = current {
        units.push(unit);
    }
    let (start, end) = span(&units, cursor.col, count, inner)?;
    Some(chars(cursor.row, start, end))
}

/// Sentences of one line: `.`, `!` or `?` (plus closing brackets and quotes)
/// followed by whitespace or the end of the line ends a sentence.
fn sentence_units(line: &str) -> Vec<Unit> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut units = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let gap_start = chars[i].0;
        while i < chars.len() && chars[i].1.is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            units.push(Unit {
                start: gap_start,
                end: line.len(),
                blank: true,
            });
            break;
        }
        if chars[i].0 > gap_start {
            units.push(Unit {
                start: gap_start,
                end: chars[i].0,
                blank: true,
            });
        }
        let start = chars[i].0;
        let mut end = line.trim_end().len();
        let mut j = i;
        while j < chars.len() {
            let c = chars[j].1;
            j += 1;
            if matches!(c, '.' | '!' | '?') {
                while j < chars.len() && matches!(chars[j].1, ')' | ']' | '"' | '\'') {
                    j += 1;
                }
                if j >= chars.len() || chars[j].1.is_whitespace() {
                    end = chars.get(j).map_or(line.len(), |&(b, _)| b);
                    break;
                }
            }
        }
        if j >= chars.len() {
            end = end.max(start);
            units.push(Unit {
                start,
                end,
                blank: false,
            });
            if end < line.len() {
                units.push(Unit {
                    start: end,
                    end: line.len(),
                    blank: true,
                });
            }
            break;
        }
        units.push(Unit {
            start,
            end,
            blank: false,
        });
        i = j;
    }
    units
}

fn sentence(buf: &Buffer, cursor: Position, count: usize, inner: bool) -> Option<SelectionRange> {
    let line = buf.line(cursor.row)?;
    let units = sentence_units(&line);
    let (start, end) = span(&units, cursor.col, count, inner)?;
    Some(chars(cursor.row, start, end))
}

fn paragraph(buf: &Buffer, cursor: Position, count: usize, inner: bool) -> Option<SelectionRange> {
    let mut units: Vec<Unit> = Vec::new();
    for row in 0..buf.line_count() {
        let blank = buf.is_blank_line(row);
        match units.last_mut() {
            Some(u) if u.blank == blank => u.end = row + 1,
            _ => units.push(Unit {
                start: row,
                end: row + 1,
                blank,
            }),
        }
    }
    let (first, end) = span(&units, cursor.row, count, inner)?;
    Some(SelectionRange::Lines {
        first,
        last: end - 1,
    })
}

fn quote(buf: &Buffer, cursor: Position, q: char, inner: bool) -> Option<SelectionRange> {
    let line = buf.line(cursor.row)?;
    let mut quotes = Vec::new();
    let mut escaped = false;
    for (b, c) in line.char_indices() {
        if c == q && !escaped {
            quotes.push(b);
        }
        escaped = c == '\\' && !escaped;
    }
    let col = cursor.col;
    let (open, close) = match quotes.iter().position(|&p| p == col) {
        Some(k) if k % 2 == 0 => (quotes[k], *quotes.get(k + 1)?),
        Some(k) => (quotes[k - 1], quotes[k]),
        None => {
            let before = quotes.iter().filter(|&&p| p < col).count();
            if before % 2 == 1 {
                (quotes[before - 1], *quotes.get(before)?)
            } else {
                (*quotes.get(before)?, *quotes.get(before + 1)?)
            }
        }
    };
    if inner {
        return Some(chars(cursor.row, open + 1, close));
    }
    let mut start = open;
    let mut end = close + 1;
    let rest = &line[end..];
    let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    if trailing > 0 {
        end += trailing;
    } else {
        let head = &line[..start];
        start -= head.len() - head.trim_end_matches([' ', '\t']).len();
    }
    Some(chars(cursor.row, start, end))
}

fn byte_at(lines: &[String], p: Position) -> Option<u8> {
    lines.get(p.row)?.as_bytes().get(p.col).copied()
}

/// One byte back, through the line-break slot at the end of the previous line.
fn step_back(lines: &[String], p: Position) -> Option<Position> {
    if p.col > 0 {
        Some(Position::new(p.row, p.col - 1))
    } else if p.row > 0 {
        Some(Position::new(p.row - 1, lines[p.row - 1].len()))
    } else {
        None
    }
}

fn step_forward(lines: &[String], p: Position) -> Option<Position> {
    if p.col < lines[p.row].len() {
        Some(Position::new(p.row, p.col + 1))
    } else if p.row + 1 < lines.len() {
        Some(Position::new(p.row + 1, 0))
    } else {
        None
    }
}

fn bracket(
    buf: &Buffer,
    cursor: Position,
    open: char,
    close: char,
    count: usize,
    inner: bool,
) -> Option<SelectionRange> {
    let lines = buf.lines();
    let (open_b, close_b) = (open as u8, close as u8);
    let mut level = count;
    let mut depth = 0usize;
    let mut at = Some(cursor);
    let mut open_pos = None;
    while let Some(p) = at {
        let b = byte_at(&lines, p);
        if b == Some(close_b) && p != cursor {
            depth += 1;
        } else if b == Some(open_b) {
            if depth == 0 {
                level -= 1;
                if level == 0 {
                    open_pos = Some(p);
                    break;
                }
            } else {
                depth -= 1;
            }
        }
        at = step_back(&lines, p);
    }
    let open_pos = open_pos?;
    let mut depth = 0usize;
    let mut at = step_forward(&lines, open_pos);
    let mut close_pos = None;
    while let Some(p) = at {
        let b = byte_at(&lines, p);
        if b == Some(open_b) {
            depth += 1;
        } else if b == Some(close_b) {
            if depth == 0 {
                close_pos = Some(p);
                break;
            }
            depth -= 1;
        }
        at = step_forward(&lines, p);
    }
    let close_pos = close_pos?;
    if !inner {
        return Some(SelectionRange::Chars {
            start: open_pos,
            end: Position::new(close_pos.row, close_pos.col + 1),
        });
    }
    let open_at_eol = open_pos.col + 1 == lines[open_pos.row].len();
    let close_after_indent = lines[close_pos.row][..close_pos.col].trim().is_empty();
    if open_at_eol && close_after_indent && close_pos.row > open_pos.row + 1 {
        return Some(SelectionRange::Lines {
            first: open_pos.row + 1,
            last: close_pos.row - 1,
        });
    }
    Some(SelectionRange::Chars {
        start: Position::new(open_pos.row, open_pos.col + 1),
        end: close_pos,
    })
}
