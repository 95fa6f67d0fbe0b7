//! Compound mutations: join, character replace, put and rectangular blocks.

use crate::registers::{RegisterContent, RegisterKind};
use crate::selection::block_byte_range;
use crate::{CursorContext, PutPlacement, TextBuffer};
use core_text::{Position, grapheme, motion};
use tracing::trace;

impl TextBuffer {
    /// Join `count` lines (at least two) starting at `row`. With `insert_space`
    /// leading whitespace of each joined line is dropped and a single space
    /// separates the parts (`J`); without it the lines are concatenated (`gJ`).
    /// The cursor lands on the last join point.
    pub fn join_lines(&mut self, row: usize, count: usize, insert_space: bool) -> bool {
        let last = self.last_row();
        if row >= last {
            return false;
        }
        let end_row = (row + count.max(2) - 1).min(last);
        let mut joined = self.line(row);
        let mut join_col = 0;
        for r in row + 1..=end_row {
            let next = self.line(r);
            join_col = joined.len();
            if insert_space {
                let trimmed = next.trim_start();
                let space = !joined.is_empty()
                    && !trimmed.is_empty()
                    && !joined.ends_with([' ', '\t'])
                    && !trimmed.starts_with(')');
                if space {
                    joined.push(' ');
                }
                joined.push_str(trimmed);
            } else {
                joined.push_str(&next);
            }
        }
        self.record_change();
        self.buffer.remove_lines(row + 1, end_row);
        self.buffer.set_line(row, &joined);
        self.set_cursor(Position::new(row, join_col), CursorContext::Normal);
        trace!(target: "state.edit", row, end_row, "join_lines");
        true
    }

    /// Replace `count` graphemes starting at `pos` with `ch`. Fails without change
    /// when the line holds fewer graphemes. The cursor rests on the last replacement.
    pub fn replace_chars(&mut self, pos: Position, count: usize, ch: char) -> bool {
        let line = self.line(pos.row);
        let mut end = pos.col;
        for _ in 0..count.max(1) {
            if end >= line.len() {
                return false;
            }
            end = grapheme::next_boundary(&line, end);
        }
        let replacement: String = std::iter::repeat_n(ch, count.max(1)).collect();
        self.replace_range(pos, Position::new(pos.row, end), &replacement);
        let last = pos.col + replacement.len() - ch.len_utf8();
        self.set_cursor(Position::new(pos.row, last), CursorContext::Normal);
        true
    }

    /// Put register content relative to the cursor, `count` times.
    pub fn put(&mut self, content: &RegisterContent, placement: PutPlacement, count: usize) -> bool {
        if content.is_empty() {
            return false;
        }
        let count = count.max(1);
        self.begin_change();
        match content.kind {
            RegisterKind::CharWise => self.put_chars(&content.text, placement, count),
            RegisterKind::LineWise => self.put_lines(&content.lines(), placement, count),
            RegisterKind::BlockWise { width } => {
                self.put_block(&content.lines(), width, placement, count)
            }
        }
        self.end_change();
        true
    }

    fn put_chars(&mut self, text: &str, placement: PutPlacement, count: usize) {
        let cur = self.cursor;
        let line = self.line(cur.row);
        let at = match placement {
            PutPlacement::After if !line.is_empty() => grapheme::next_boundary(&line, cur.col),
            _ => cur.col.min(line.len()),
        };
        let payload = text.repeat(count);
        let start = Position::new(cur.row, at);
        let end = self.insert_at(start, &payload);
        let cursor = if payload.contains('\n') {
            start
        } else {
            let line = self.line(end.row);
            Position::new(end.row, grapheme::prev_boundary(&line, end.col))
        };
        self.set_cursor(cursor, CursorContext::Normal);
    }

    fn put_lines(&mut self, lines: &[String], placement: PutPlacement, count: usize) {
        let row = match placement {
            PutPlacement::After => self.cursor.row + 1,
            PutPlacement::Before => self.cursor.row,
        };
        let mut payload = Vec::with_capacity(lines.len() * count);
        for _ in 0..count {
            payload.extend_from_slice(lines);
        }
        self.insert_lines(row, &payload);
        let mut pos = Position::new(row, 0);
        motion::first_non_blank(&self.buffer, &mut pos);
        self.set_cursor(pos, CursorContext::Normal);
    }

    fn put_block(&mut self, rows: &[String], width: usize, placement: PutPlacement, count: usize) {
        let cur = self.cursor;
        let first_line = self.line(cur.row);
        let mut col = grapheme::visual_col(&first_line, cur.col);
        if placement == PutPlacement::After && !first_line.is_empty() {
            col += grapheme::at(&first_line, cur.col)
                .map(grapheme::cluster_width)
                .unwrap_or(0);
        }
        let mut first_byte = 0;
        for (i, piece) in rows.iter().enumerate() {
            let row = cur.row + i;
            if row > self.last_row() {
                self.insert_lines(self.line_count(), &[String::new()]);
            }
            let mut text = self.line(row);
            let text_width = grapheme::display_width(&text);
            if text_width < col {
                text.push_str(&" ".repeat(col - text_width));
            }
            let at = grapheme::byte_for_visual_col(&text, col);
            let at_end = at >= text.len();
            let pad = width.saturating_sub(grapheme::display_width(piece));
            let mut insert = String::new();
            for k in 0..count {
                insert.push_str(piece);
                if !(at_end && k + 1 == count) {
                    insert.push_str(&" ".repeat(pad));
                }
            }
            text.insert_str(at, &insert);
            self.set_line(row, &text);
            if i == 0 {
                first_byte = at;
            }
        }
        self.set_cursor(Position::new(cur.row, first_byte), CursorContext::Normal);
    }

    /// Text of a rectangle: rows `top..=bottom`, display columns `[left, right)`.
    pub fn block_text(&self, top: usize, bottom: usize, left: usize, right: usize) -> Vec<String> {
        (top..=bottom.min(self.last_row()))
            .map(|row| {
                let line = self.line(row);
                let (a, b) = block_byte_range(&line, left, right);
                line[a..b].to_string()
            })
            .collect()
    }

    /// Remove a rectangle and return its rows.
    pub fn delete_block(&mut self, top: usize, bottom: usize, left: usize, right: usize) -> Vec<String> {
        let mut removed = Vec::new();
        self.begin_change();
        for row in top..=bottom.min(self.last_row()) {
            let line = self.line(row);
            let (a, b) = block_byte_range(&line, left, right);
            removed.push(line[a..b].to_string());
            if a < b {
                self.delete_range(Position::new(row, a), Position::new(row, b));
            }
        }
        self.end_change();
        removed
    }

    /// Overwrite every grapheme inside a rectangle with `ch`.
    pub fn replace_block(&mut self, top: usize, bottom: usize, left: usize, right: usize, ch: char) {
        self.begin_change();
        for row in top..=bottom.min(self.last_row()) {
            let line = self.line(row);
            let (a, b) = block_byte_range(&line, left, right);
            let n = grapheme::count(&line[a..b]);
            if n > 0 {
                let text: String = std::iter::repeat_n(ch, n).collect();
                self.replace_range(Position::new(row, a), Position::new(row, b), &text);
            }
        }
        self.end_change();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tb(lines: &[&str]) -> TextBuffer {
        TextBuffer::from_lines(lines)
    }

    #[test]
    fn join_with_spaces() {
        let mut t = tb(&["foo", "   bar", "", "baz)"]);
        assert!(t.join_lines(0, 2, true));
        assert_eq!(t.lines(), vec!["foo bar", "", "baz)"]);
        assert_eq!(t.cursor(), Position::new(0, 3));
        assert!(t.join_lines(0, 3, true));
        assert_eq!(t.lines(), vec!["foo bar baz)"]);
        assert!(!t.join_lines(0, 2, true));
    }

    #[test]
    fn join_without_spaces_and_single_undo() {
        let mut t = tb(&["a", " b", "c"]);
        assert!(t.join_lines(0, 3, false));
        assert_eq!(t.lines(), vec!["a bc"]);
        t.undo(1).unwrap();
        assert_eq!(t.lines(), vec!["a", " b", "c"]);
    }

    #[test]
    fn replace_chars_needs_enough_graphemes() {
        let mut t = tb(&["abcd"]);
        assert!(t.replace_chars(Position::new(0, 1), 2, 'x'));
        assert_eq!(t.lines(), vec!["axxd"]);
        assert_eq!(t.cursor(), Position::new(0, 2));
        assert!(!t.replace_chars(Position::new(0, 2), 5, 'y'));
        assert_eq!(t.lines(), vec!["axxd"]);
    }

    #[test]
    fn put_charwise_after_and_before() {
        let mut t = tb(&["abc"]);
        t.set_cursor(Position::new(0, 1), CursorContext::Normal);
        t.put(&RegisterContent::charwise("X"), PutPlacement::After, 2);
        assert_eq!(t.lines(), vec!["abXXc"]);
        assert_eq!(t.cursor(), Position::new(0, 3));
        t.put(&RegisterContent::charwise("Z"), PutPlacement::Before, 1);
        assert_eq!(t.lines(), vec!["abXZXc"]);
        assert_eq!(t.cursor(), Position::new(0, 3));
    }

    #[test]
    fn put_linewise_below_and_above() {
        let mut t = tb(&["a", "b", "c"]);
        t.put(&RegisterContent::linewise(&["a"]), PutPlacement::After, 1);
        assert_eq!(t.lines(), vec!["a", "a", "b", "c"]);
        assert_eq!(t.cursor(), Position::new(1, 0));
        t.put(&RegisterContent::linewise(&["  x"]), PutPlacement::Before, 2);
        assert_eq!(t.lines(), vec!["a", "  x", "  x", "a", "b", "c"]);
        assert_eq!(t.cursor(), Position::new(1, 2));
    }

    #[test]
    fn put_block_pads_and_extends() {
        let mut t = tb(&["abcd", "a"]);
        t.set_cursor(Position::new(0, 1), CursorContext::Normal);
        let block = RegisterContent::blockwise(&["12", "3", "45"], 2);
        t.put(&block, PutPlacement::After, 1);
        assert_eq!(t.lines(), vec!["ab12cd", "a 3", "  45"]);
        assert_eq!(t.cursor(), Position::new(0, 2));
        t.undo(1).unwrap();
        assert_eq!(t.lines(), vec!["abcd", "a"]);
    }

    #[test]
    fn block_delete_and_text() {
        let mut t = tb(&["abcd", "ef", "ghij"]);
        assert_eq!(t.block_text(0, 2, 1, 3), vec!["bc", "f", "hi"]);
        let removed = t.delete_block(0, 2, 1, 3);
        assert_eq!(removed, vec!["bc", "f", "hi"]);
        assert_eq!(t.lines(), vec!["ad", "e", "gj"]);
        t.replace_block(0, 2, 0, 1, '*');
        assert_eq!(t.lines(), vec!["*d", "*", "*j"]);
    }
}
