//! Cursor motion primitives.
//!
//! These operate purely on a `Buffer` + `Position` pair and are free of editor state
//! (mode, sticky column, operator context). Every function returns `true` when the
//! position changed; callers treat `false` as a failed motion. `past_end` selects the
//! insert-adjacent rule where the cursor may rest at `line_len`.

use crate::{Buffer, Position, grapheme};
use grapheme::CharClass;

/// Normalize a position for Normal-mode semantics: a cursor at or past the end of a
/// non-empty line is pulled back onto the start of the last grapheme.
pub fn normalize_normal_mode_position(buf: &Buffer, pos: &mut Position) {
    *pos = buf.clamp(*pos);
    let line = buf.line(pos.row).unwrap_or_default();
    let last = grapheme::last_boundary(&line);
    if pos.col > last {
        pos.col = last;
    }
}

/// Move left `count` graphemes without leaving the line.
pub fn left(buf: &Buffer, pos: &mut Position, count: usize) -> bool {
    let Some(line) = buf.line(pos.row) else {
        return false;
    };
    let start = pos.col;
    for _ in 0..count {
        if pos.col == 0 {
            break;
        }
        pos.col = grapheme::prev_boundary(&line, pos.col);
    }
    pos.col != start
}

/// Move right `count` graphemes without leaving the line.
pub fn right(buf: &Buffer, pos: &mut Position, count: usize, past_end: bool) -> bool {
    let Some(line) = buf.line(pos.row) else {
        return false;
    };
    let limit = if past_end {
        line.len()
    } else {
        grapheme::last_boundary(&line)
    };
    let start = pos.col;
    for _ in 0..count {
        if pos.col >= limit {
            break;
        }
        pos.col = grapheme::next_boundary(&line, pos.col).min(limit);
    }
    pos.col != start
}

/// Move to column 0.
pub fn line_start(pos: &mut Position) -> bool {
    let moved = pos.col != 0;
    pos.col = 0;
    moved
}

/// Move to the first non-blank grapheme of the line (`^`).
pub fn first_non_blank(buf: &Buffer, pos: &mut Position) -> bool {
    let line = buf.line(pos.row).unwrap_or_default();
    let target = grapheme::first_non_blank(&line).min(grapheme::last_boundary(&line));
    let moved = pos.col != target;
    pos.col = target;
    moved
}

/// Move to the end of the line (`$`).
pub fn line_end(buf: &Buffer, pos: &mut Position, past_end: bool) -> bool {
    let line = buf.line(pos.row).unwrap_or_default();
    let target = if past_end {
        line.len()
    } else {
        grapheme::last_boundary(&line)
    };
    let moved = pos.col != target;
    pos.col = target;
    moved
}

/// Column for a wanted display column on `row`. `usize::MAX` means end of line.
pub fn col_for_display(buf: &Buffer, row: usize, want: usize, past_end: bool) -> usize {
    let line = buf.line(row).unwrap_or_default();
    let limit = if past_end {
        line.len()
    } else {
        grapheme::last_boundary(&line)
    };
    if want == usize::MAX {
        return limit;
    }
    grapheme::byte_for_visual_col(&line, want).min(limit)
}

/// Move up `count` lines aiming for display column `want`. Fails only on the first line.
pub fn up(buf: &Buffer, pos: &mut Position, count: usize, want: usize, past_end: bool) -> bool {
    if pos.row == 0 {
        return false;
    }
    pos.row = pos.row.saturating_sub(count);
    pos.col = col_for_display(buf, pos.row, want, past_end);
    true
}

/// Move down `count` lines aiming for display column `want`. Fails only on the last line.
pub fn down(buf: &Buffer, pos: &mut Position, count: usize, want: usize, past_end: bool) -> bool {
    if pos.row >= buf.last_row() {
        return false;
    }
    pos.row = pos.row.saturating_add(count).min(buf.last_row());
    pos.col = col_for_display(buf, pos.row, want, past_end);
    true
}

/// Jump to a row (clamped) and its first non-blank (`gg`, `G`, `:N`).
pub fn goto_row(buf: &Buffer, pos: &mut Position, row: usize) -> bool {
    let start = *pos;
    pos.row = row.min(buf.last_row());
    pos.col = 0;
    first_non_blank(buf, pos);
    *pos != start
}

/// Stream over every grapheme start plus the end-of-line slot of each line, crossing
/// line breaks. End-of-line slots classify as blank, which is how word motions see
/// the line break.
#[derive(Clone)]
struct Scan<'a> {
    buf: &'a Buffer,
    row: usize,
    col: usize,
    line: String,
}

impl<'a> Scan<'a> {
    fn new(buf: &'a Buffer, pos: Position) -> Self {
        let pos = buf.clamp(pos);
        Self {
            buf,
            row: pos.row,
            col: pos.col,
            line: buf.line(pos.row).unwrap_or_default(),
        }
    }

    fn pos(&self) -> Position {
        Position::new(self.row, self.col)
    }

    fn class(&self, big: bool) -> CharClass {
        grapheme::at(&self.line, self.col)
            .map(|g| grapheme::classify(g, big))
            .unwrap_or(CharClass::Blank)
    }

    fn on_empty_line(&self) -> bool {
        self.line.is_empty()
    }

    fn next(&mut self) -> bool {
        if self.col < self.line.len() {
            self.col = grapheme::next_boundary(&self.line, self.col);
            return true;
        }
        if self.row >= self.buf.last_row() {
            return false;
        }
        self.row += 1;
        self.col = 0;
        self.line = self.buf.line(self.row).unwrap_or_default();
        true
    }

    fn prev(&mut self) -> bool {
        if self.col > 0 {
            self.col = grapheme::prev_boundary(&self.line, self.col);
            return true;
        }
        if self.row == 0 {
            return false;
        }
        self.row -= 1;
        self.line = self.buf.line(self.row).unwrap_or_default();
        self.col = self.line.len();
        true
    }
}

/// Forward to the start of the next word (`w` / `W`). Empty lines count as words.
/// Running off the end of the buffer lands on the end of the last line.
pub fn word_forward(buf: &Buffer, pos: &mut Position, count: usize, big: bool) -> bool {
    let mut scan = Scan::new(buf, *pos);
    let start = scan.pos();
    'outer: for _ in 0..count {
        let class = scan.class(big);
        if !scan.next() {
            break;
        }
        if class != CharClass::Blank {
            while scan.class(big) == class {
                if !scan.next() {
                    break 'outer;
                }
            }
        }
        while scan.class(big) == CharClass::Blank {
            if scan.col == 0 && scan.on_empty_line() {
                break;
            }
            if !scan.next() {
                break 'outer;
            }
        }
    }
    *pos = scan.pos();
    *pos != start
}

/// Forward to the end of the current or next word (`e` / `E`). Empty lines are skipped.
pub fn word_end_forward(buf: &Buffer, pos: &mut Position, count: usize, big: bool) -> bool {
    let mut scan = Scan::new(buf, *pos);
    let start = scan.pos();
    for _ in 0..count {
        let before = scan.clone();
        if !scan.next() {
            break;
        }
        let mut ok = true;
        while scan.class(big) == CharClass::Blank {
            if !scan.next() {
                ok = false;
                break;
            }
        }
        if !ok {
            scan = before;
            break;
        }
        let class = scan.class(big);
        loop {
            let mut probe = scan.clone();
            if probe.next() && probe.class(big) == class {
                scan = probe;
            } else {
                break;
            }
        }
    }
    *pos = scan.pos();
    *pos != start
}

/// Backward to the start of the current or previous word (`b` / `B`). Empty lines stop.
pub fn word_backward(buf: &Buffer, pos: &mut Position, count: usize, big: bool) -> bool {
    let mut scan = Scan::new(buf, *pos);
    let start = scan.pos();
    'outer: for _ in 0..count {
        if !scan.prev() {
            break;
        }
        while scan.class(big) == CharClass::Blank {
            if scan.col == 0 && scan.on_empty_line() {
                continue 'outer;
            }
            if !scan.prev() {
                break 'outer;
            }
        }
        let class = scan.class(big);
        loop {
            let mut probe = scan.clone();
            if probe.prev() && probe.class(big) == class {
                scan = probe;
            } else {
                break;
            }
        }
    }
    *pos = scan.pos();
    *pos != start
}

/// Forward to the next blank line after a run of text (`}`). With no further
/// paragraph the cursor goes to the end of the last line.
pub fn paragraph_forward(buf: &Buffer, pos: &mut Position, count: usize) -> bool {
    let last = buf.last_row();
    let mut row = pos.row;
    for n in 0..count {
        let mut seen_text = false;
        let mut first = true;
        loop {
            let blank = buf.is_blank_line(row);
            if !blank {
                seen_text = true;
            }
            if !first && seen_text && blank {
                break;
            }
            if row >= last {
                if n + 1 < count && seen_text {
                    return false;
                }
                break;
            }
            row += 1;
            first = false;
        }
    }
    let target = if row == last && !buf.is_blank_line(row) {
        Position::new(row, buf.line_len(row))
    } else {
        Position::new(row, 0)
    };
    let moved = target != *pos;
    *pos = target;
    moved
}

/// Backward to the previous blank line before a run of text (`{`), else to (0, 0).
pub fn paragraph_backward(buf: &Buffer, pos: &mut Position, count: usize) -> bool {
    let mut row = pos.row;
    for n in 0..count {
        let mut seen_text = false;
        let mut first = true;
        loop {
            let blank = buf.is_blank_line(row);
            if !blank {
                seen_text = true;
            }
            if !first && seen_text && blank {
                break;
            }
            if row == 0 {
                if n + 1 < count && seen_text {
                    return false;
                }
                break;
            }
            row -= 1;
            first = false;
        }
    }
    let target = Position::new(row, 0);
    let moved = target != *pos;
    *pos = target;
    moved
}

/// In-line character search parameters (`f`, `F`, `t`, `T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindSpec {
    pub ch: char,
    pub forward: bool,
    pub till: bool,
}

impl FindSpec {
    /// The same search in the opposite direction (`,`).
    pub fn reversed(self) -> Self {
        Self {
            forward: !self.forward,
            ..self
        }
    }
}

/// Search the current line for the `count`-th occurrence. Returns whether the target
/// was found, which for a till search next to the cursor means success without
/// movement. `repeat` marks a `;`/`,` replay: a till search then skips a match
/// directly next to the cursor.
pub fn find_char(
    buf: &Buffer,
    pos: &mut Position,
    spec: FindSpec,
    count: usize,
    repeat: bool,
) -> bool {
    let line = buf.line(pos.row).unwrap_or_default();
    let mut col = pos.col;
    let mut skip_adjacent = repeat && spec.till && count == 1;
    for _ in 0..count {
        loop {
            if spec.forward {
                let next = grapheme::next_boundary(&line, col);
                if next >= line.len() {
                    return false;
                }
                col = next;
            } else {
                if col == 0 {
                    return false;
                }
                col = grapheme::prev_boundary(&line, col);
            }
            let hit = grapheme::at(&line, col).is_some_and(|g| g.starts_with(spec.ch));
            if hit && !skip_adjacent {
                break;
            }
            skip_adjacent = false;
        }
    }
    if spec.till {
        col = if spec.forward {
            grapheme::prev_boundary(&line, col)
        } else {
            grapheme::next_boundary(&line, col)
        };
    }
    pos.col = col;
    true
}
