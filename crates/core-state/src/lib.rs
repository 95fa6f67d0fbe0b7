//! Engine state: the edited buffer with its cursor, marks, jump list and undo
//! history, plus registers, the mode machine and the visual selection.
//!
//! Undo grouping:
//! - Every mutation records the state it is about to change. Outside a change
//!   group each mutation is its own undo unit.
//! - `begin_change`/`end_change` bracket one user command (an operator, a whole
//!   insert session, a counted put, a repeat, an ex command). The first mutation
//!   inside the group captures a single snapshot together with the cursor that
//!   was current when the group opened, so one `undo()` reverses the command and
//!   lands the cursor where the command started.
//! - Mutations that would not change anything record nothing.
//!
//! Marks are static (see `marks`); nothing in this crate shifts them on edit.

use core_text::{Buffer, Position, grapheme, motion};
use tracing::{debug, trace};

mod edit;
pub mod error;
pub mod marks;
pub mod mode;
pub mod registers;
pub mod selection;
pub mod undo;

pub use error::{EngineError, EngineResult};
pub use marks::{JumpList, Marks, PREVIOUS_CONTEXT};
pub use mode::{InsertVariant, Mode, ModeEvent, ModeManager, VisualKind, transition};
pub use registers::{RegisterContent, RegisterKind, Registers};
pub use selection::{Selection, SelectionRange, block_byte_range};
pub use undo::{SnapshotId, UNDO_HISTORY_MAX, UndoEngine};

/// Which cursor invariant applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorContext {
    /// Cursor rests on a grapheme (column 0 on an empty line).
    Normal,
    /// Cursor may sit one past the last grapheme.
    Insert,
}

impl CursorContext {
    pub fn past_end(self) -> bool {
        matches!(self, CursorContext::Insert)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutPlacement {
    Before,
    After,
}

#[derive(Debug, Clone, Copy)]
struct ChangeGroup {
    cursor: Position,
    captured: bool,
    depth: usize,
}

/// Sticky column value meaning "end of line" (set by `$`).
pub const STICKY_EOL: usize = usize::MAX;

/// One edited document and everything attached to it.
pub struct TextBuffer {
    buffer: Buffer,
    cursor: Position,
    sticky_col: Option<usize>,
    marks: Marks,
    jumps: JumpList,
    undo: UndoEngine,
    group: Option<ChangeGroup>,
    revision: u64,
}

impl TextBuffer {
    pub fn new(buffer: Buffer) -> Self {
        Self::with_limits(buffer, UNDO_HISTORY_MAX, 100)
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Buffer::from_lines(lines))
    }

    pub fn with_limits(buffer: Buffer, undo_max: usize, jump_max: usize) -> Self {
        Self {
            buffer,
            cursor: Position::origin(),
            sticky_col: None,
            marks: Marks::default(),
            jumps: JumpList::new(jump_max),
            undo: UndoEngine::new(undo_max),
            group: None,
            revision: 0,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn lines(&self) -> Vec<String> {
        self.buffer.lines()
    }

    pub fn line(&self, row: usize) -> String {
        self.buffer.line(row).unwrap_or_default()
    }

    pub fn line_len(&self, row: usize) -> usize {
        self.buffer.line_len(row)
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    pub fn last_row(&self) -> usize {
        self.buffer.last_row()
    }

    /// Bumped on every content change, including undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn undo_engine(&self) -> &UndoEngine {
        &self.undo
    }

    // ---------------------------------------------------------------- cursor

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn sticky_col(&self) -> Option<usize> {
        self.sticky_col
    }

    pub fn set_sticky_col(&mut self, col: Option<usize>) {
        self.sticky_col = col;
    }

    /// Clamp a position under the given cursor invariant.
    pub fn clamp(&self, pos: Position, ctx: CursorContext) -> Position {
        let mut pos = self.buffer.clamp(pos);
        if ctx == CursorContext::Normal {
            motion::normalize_normal_mode_position(&self.buffer, &mut pos);
        }
        pos
    }

    /// Place the cursor (clamped) and forget the sticky column.
    pub fn set_cursor(&mut self, pos: Position, ctx: CursorContext) {
        self.cursor = self.clamp(pos, ctx);
        self.sticky_col = None;
    }

    /// Place the cursor (clamped) keeping the sticky column.
    pub fn set_cursor_keep_sticky(&mut self, pos: Position, ctx: CursorContext) {
        self.cursor = self.clamp(pos, ctx);
    }

    pub fn clamp_cursor(&mut self, ctx: CursorContext) {
        self.cursor = self.clamp(self.cursor, ctx);
    }

    /// Display column the cursor aims for on vertical moves.
    pub fn wanted_col(&self) -> usize {
        self.sticky_col.unwrap_or_else(|| {
            grapheme::visual_col(&self.line(self.cursor.row), self.cursor.col)
        })
    }

    /// Move by `count` cells/lines. Horizontal moves never wrap between lines.
    pub fn move_cursor_relative(&mut self, dir: Direction, count: usize, ctx: CursorContext) -> bool {
        let mut pos = self.cursor;
        let past_end = ctx.past_end();
        let moved = match dir {
            Direction::Left => motion::left(&self.buffer, &mut pos, count),
            Direction::Right => motion::right(&self.buffer, &mut pos, count, past_end),
            Direction::Up | Direction::Down => {
                let want = self.wanted_col();
                let moved = if dir == Direction::Up {
                    motion::up(&self.buffer, &mut pos, count, want, past_end)
                } else {
                    motion::down(&self.buffer, &mut pos, count, want, past_end)
                };
                self.sticky_col = Some(want);
                self.cursor = self.clamp(pos, ctx);
                return moved;
            }
        };
        self.set_cursor(pos, ctx);
        moved
    }

    // ---------------------------------------------------------------- undo

    /// Open a change group. Groups nest; only the outermost one counts.
    pub fn begin_change(&mut self) {
        match &mut self.group {
            Some(g) => g.depth += 1,
            None => {
                self.group = Some(ChangeGroup {
                    cursor: self.cursor,
                    captured: false,
                    depth: 1,
                })
            }
        }
    }

    /// Close a change group. Returns true when the outermost group recorded a change.
    pub fn end_change(&mut self) -> bool {
        let Some(g) = &mut self.group else {
            return false;
        };
        g.depth -= 1;
        if g.depth > 0 {
            return false;
        }
        let captured = g.captured;
        self.group = None;
        trace!(target: "state.undo", captured, "change_group_closed");
        captured
    }

    pub fn in_change(&self) -> bool {
        self.group.is_some()
    }

    /// Snapshot the pre-change state unless the open group already did.
    fn record_change(&mut self) {
        match &mut self.group {
            Some(g) if g.captured => {}
            Some(g) => {
                g.captured = true;
                let cursor = g.cursor;
                self.undo.push(&self.buffer, cursor);
            }
            None => self.undo.push(&self.buffer, self.cursor),
        }
        self.revision += 1;
    }

    /// Undo up to `count` changes. Fails only when nothing could be undone.
    pub fn undo(&mut self, count: usize) -> EngineResult<usize> {
        self.group = None;
        let mut done = 0;
        for _ in 0..count.max(1) {
            match self.undo.undo(&mut self.buffer, &mut self.cursor) {
                Ok(()) => done += 1,
                Err(err) if done == 0 => {
                    debug!(target: "state.undo", "nothing_to_undo");
                    return Err(err);
                }
                Err(_) => break,
            }
        }
        self.revision += 1;
        self.set_cursor(self.cursor, CursorContext::Normal);
        Ok(done)
    }

    /// Redo up to `count` changes. Fails only when nothing could be redone.
    pub fn redo(&mut self, count: usize) -> EngineResult<usize> {
        self.group = None;
        let mut done = 0;
        for _ in 0..count.max(1) {
            match self.undo.redo(&mut self.buffer, &mut self.cursor) {
                Ok(()) => done += 1,
                Err(err) if done == 0 => {
                    debug!(target: "state.undo", "nothing_to_redo");
                    return Err(err);
                }
                Err(_) => break,
            }
        }
        self.revision += 1;
        self.set_cursor(self.cursor, CursorContext::Normal);
        Ok(done)
    }

    // ---------------------------------------------------------------- marks & jumps

    pub fn set_mark(&mut self, name: char, pos: Position) -> bool {
        self.marks.set(name, pos)
    }

    /// Clamped position of a mark.
    pub fn mark(&self, name: char) -> EngineResult<Position> {
        self.marks
            .get(name)
            .map(|p| self.clamp(p, CursorContext::Normal))
            .ok_or(EngineError::MarkNotFound(name))
    }

    /// Jump to a mark; `linewise` lands on the first non-blank of its row.
    pub fn jump_to_mark(&mut self, name: char, linewise: bool) -> EngineResult<Position> {
        let mut target = self.mark(name)?;
        if linewise {
            motion::first_non_blank(&self.buffer, &mut target);
        }
        self.record_jump(self.cursor);
        self.set_cursor(target, CursorContext::Normal);
        Ok(self.cursor)
    }

    /// Remember a jump origin in the jump list and the `'` mark.
    pub fn record_jump(&mut self, from: Position) {
        self.marks.set(PREVIOUS_CONTEXT, from);
        self.jumps.push(from);
    }

    pub fn jump_back(&mut self, count: usize) -> EngineResult<Position> {
        let target = self
            .jumps
            .back(self.cursor, count.max(1))
            .ok_or(EngineError::JumpListExhausted)?;
        self.set_cursor(target, CursorContext::Normal);
        Ok(self.cursor)
    }

    pub fn jump_forward(&mut self, count: usize) -> EngineResult<Position> {
        let target = self
            .jumps
            .forward(count.max(1))
            .ok_or(EngineError::JumpListExhausted)?;
        self.set_cursor(target, CursorContext::Normal);
        Ok(self.cursor)
    }

    pub fn jump_list(&self) -> &JumpList {
        &self.jumps
    }

    // ---------------------------------------------------------------- basic mutations

    /// Insert text at the cursor; the cursor ends just after it.
    pub fn insert_text(&mut self, text: &str) -> Position {
        let end = self.insert_at(self.cursor, text);
        self.cursor = end;
        end
    }

    /// Insert text at a position without touching the cursor. Returns the end position.
    pub fn insert_at(&mut self, pos: Position, text: &str) -> Position {
        let pos = self.buffer.clamp(pos);
        if text.is_empty() {
            return pos;
        }
        self.record_change();
        let end = self.buffer.insert(pos, text);
        self.after_mutation();
        end
    }

    /// Delete the half-open range `[start, end)` and return the removed text.
    pub fn delete_range(&mut self, start: Position, end: Position) -> String {
        let (start, end) = (self.buffer.clamp(start), self.buffer.clamp(end));
        if start >= end {
            return String::new();
        }
        self.record_change();
        let removed = self.buffer.remove(start, end);
        self.after_mutation();
        removed
    }

    /// Replace `[start, end)` with `text`; returns the end of the new text.
    pub fn replace_range(&mut self, start: Position, end: Position, text: &str) -> Position {
        let (start, end) = (self.buffer.clamp(start), self.buffer.clamp(end));
        if self.buffer.slice(start, end) == text {
            return self.buffer.position_of(self.buffer.char_index(start) + text.chars().count());
        }
        self.record_change();
        self.buffer.remove(start, end);
        let new_end = self.buffer.insert(start, text);
        self.after_mutation();
        new_end
    }

    /// Remove whole lines `first..=last`.
    pub fn delete_lines(&mut self, first: usize, last: usize) -> Vec<String> {
        if first > self.last_row() || first > last {
            return Vec::new();
        }
        self.record_change();
        let removed = self.buffer.remove_lines(first, last);
        self.after_mutation();
        removed
    }

    /// Insert whole lines so the first one lands on `row`.
    pub fn insert_lines(&mut self, row: usize, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.record_change();
        self.buffer.insert_lines(row.min(self.line_count()), lines);
        self.after_mutation();
    }

    /// Replace the text of one line.
    pub fn set_line(&mut self, row: usize, text: &str) {
        if row > self.last_row() || self.line(row) == text {
            return;
        }
        self.record_change();
        self.buffer.set_line(row, text);
        self.after_mutation();
    }

    /// Open an empty line below or above the cursor line and move onto it.
    pub fn open_line(&mut self, below: bool) -> usize {
        let row = if below { self.cursor.row + 1 } else { self.cursor.row };
        self.insert_lines(row, &[String::new()]);
        self.cursor = Position::new(row, 0);
        self.sticky_col = None;
        row
    }

    /// Keep the cursor inside the buffer after content changed under it.
    fn after_mutation(&mut self) {
        self.cursor = self.buffer.clamp(self.cursor);
    }
}

/// Command-line text being typed after `:`. The leading `:` is kept as an
/// activity sentinel; `content` returns the text without it.
#[derive(Debug, Default, Clone)]
pub struct CommandLineState {
    buf: String,
}

impl CommandLineState {
    pub fn is_active(&self) -> bool {
        self.buf.starts_with(':')
    }
    /// Raw text including the leading `:`.
    pub fn buffer(&self) -> &str {
        &self.buf
    }
    /// Typed text without the leading `:`.
    pub fn content(&self) -> &str {
        self.buf.strip_prefix(':').unwrap_or(&self.buf)
    }
    pub fn clear(&mut self) {
        self.buf.clear();
    }
    /// Begin a new command, optionally pre-filled (a count before `:` yields a range).
    pub fn begin(&mut self, prefill: &str) {
        self.buf.clear();
        self.buf.push(':');
        self.buf.push_str(prefill);
    }
    pub fn push_char(&mut self, ch: char) {
        if self.buf.is_empty() {
            self.buf.push(':');
        }
        self.buf.push(ch);
    }
    /// Delete the last character. Returns false once nothing but the sentinel was left,
    /// which leaves the command line inactive.
    pub fn backspace(&mut self) -> bool {
        if self.buf.len() > 1 {
            self.buf.pop();
            true
        } else {
            self.buf.clear();
            false
        }
    }
}
