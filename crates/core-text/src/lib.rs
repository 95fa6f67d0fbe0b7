//! Rope-backed line storage for the modal engine.
//!
//! The rope always holds `lines.join("\n")`, so the number of rope lines is
//! exactly the number of seeded lines and an empty document is a single empty
//! line. Positions address a line by index and a byte offset within that line;
//! callers keep offsets on grapheme-cluster boundaries via [`grapheme`].

use ropey::{Rope, RopeSlice};
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

pub mod motion;

/// A position inside a buffer expressed as (line index, byte offset within that line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
    pub const fn origin() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// Line-oriented text buffer backed by a `ropey::Rope`.
#[derive(Clone, Default)]
pub struct Buffer {
    rope: Rope,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("bytes", &self.rope.len_bytes())
            .finish()
    }
}

impl Buffer {
    /// Seed a buffer from an ordered sequence of lines. An empty sequence yields one empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line.as_ref());
        }
        Self {
            rope: Rope::from_str(&text),
        }
    }

    /// Seed a buffer from raw text; every `\n` separates two lines.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total number of lines in the buffer (always at least one).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn last_row(&self) -> usize {
        self.line_count() - 1
    }

    fn content(&self, row: usize) -> RopeSlice<'_> {
        let line = self.rope.line(row);
        let chars = line.len_chars();
        if chars > 0 && line.char(chars - 1) == '\n' {
            line.slice(..chars - 1)
        } else {
            line
        }
    }

    /// The requested line without its line break.
    pub fn line(&self, row: usize) -> Option<String> {
        if row < self.line_count() {
            Some(self.content(row).to_string())
        } else {
            None
        }
    }

    /// Byte length of a line excluding the line break; zero for rows past the end.
    pub fn line_len(&self, row: usize) -> usize {
        if row >= self.line_count() {
            return 0;
        }
        self.content(row).len_bytes()
    }

    /// True when the line is empty or only whitespace (paragraph boundary).
    pub fn is_blank_line(&self, row: usize) -> bool {
        row < self.line_count() && self.content(row).chars().all(char::is_whitespace)
    }

    /// Owned copy of every line, in document order.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .map(|row| self.content(row).to_string())
            .collect()
    }

    /// The whole document joined with `\n`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Clamp a position into the buffer: row to the last line, column to the
    /// line length and back onto a grapheme boundary.
    pub fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.last_row());
        let line = self.line(row).unwrap_or_default();
        let col = grapheme::floor_boundary(&line, pos.col.min(line.len()));
        Position { row, col }
    }

    /// Position just past the final character of the document.
    pub fn end_position(&self) -> Position {
        let row = self.last_row();
        Position::new(row, self.line_len(row))
    }

    /// Char index of a (clamped) position.
    pub fn char_index(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        self.rope.line_to_char(pos.row) + self.rope.line(pos.row).byte_to_char(pos.col)
    }

    /// Position of a char index (clamped to the end of the document).
    pub fn position_of(&self, char_idx: usize) -> Position {
        let idx = char_idx.min(self.rope.len_chars());
        let row = self.rope.char_to_line(idx);
        let within = idx - self.rope.line_to_char(row);
        Position::new(row, self.rope.line(row).char_to_byte(within))
    }

    /// Text between two positions (`start` inclusive, `end` exclusive).
    pub fn slice(&self, start: Position, end: Position) -> String {
        let a = self.char_index(start);
        let b = self.char_index(end);
        if a >= b {
            return String::new();
        }
        self.rope.slice(a..b).to_string()
    }

    /// Insert text at a position. Returns the position just after the inserted text.
    pub fn insert(&mut self, pos: Position, text: &str) -> Position {
        let idx = self.char_index(pos);
        self.rope.insert(idx, text);
        self.position_of(idx + text.chars().count())
    }

    /// Remove the text between two positions and return it.
    pub fn remove(&mut self, start: Position, end: Position) -> String {
        let a = self.char_index(start);
        let b = self.char_index(end);
        if a >= b {
            return String::new();
        }
        let removed = self.rope.slice(a..b).to_string();
        self.rope.remove(a..b);
        removed
    }

    /// Insert whole lines so that the first new line lands at `row`
    /// (`row == line_count()` appends after the last line).
    pub fn insert_lines(&mut self, row: usize, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let joined = lines.join("\n");
        if row < self.line_count() {
            let idx = self.rope.line_to_char(row);
            self.rope.insert(idx, &format!("{joined}\n"));
        } else {
            let idx = self.rope.len_chars();
            self.rope.insert(idx, &format!("\n{joined}"));
        }
    }

    /// Remove the inclusive row range `first..=last` and return the removed lines.
    /// Removing every line leaves a single empty line.
    pub fn remove_lines(&mut self, first: usize, last: usize) -> Vec<String> {
        let last = last.min(self.last_row());
        if first > last {
            return Vec::new();
        }
        let removed: Vec<String> = (first..=last)
            .map(|row| self.content(row).to_string())
            .collect();
        let total = self.rope.len_chars();
        let (a, b) = if last < self.last_row() {
            (
                self.rope.line_to_char(first),
                self.rope.line_to_char(last + 1),
            )
        } else if first > 0 {
            // Trailing block: take the line break that precedes it instead.
            (self.rope.line_to_char(first) - 1, total)
        } else {
            (0, total)
        };
        self.rope.remove(a..b);
        tracing::trace!(target: "text.buffer", first, last, remaining = self.line_count(), "remove_lines");
        removed
    }

    /// Replace the content of one line (line break untouched).
    pub fn set_line(&mut self, row: usize, text: &str) {
        if row >= self.line_count() {
            return;
        }
        let start = self.rope.line_to_char(row);
        let end = start + self.content(row).len_chars();
        self.rope.remove(start..end);
        self.rope.insert(start, text);
    }

    /// Stable hash of the whole document, used to skip redundant undo snapshots.
    pub fn content_hash(&self) -> u64 {
        let mut h = DefaultHasher::new();
        for chunk in self.rope.chunks() {
            h.write(chunk.as_bytes());
        }
        h.write_usize(self.rope.len_bytes());
        h.finish()
    }
}

/// Grapheme and width utilities. These are pure helpers operating on a single line.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    /// Character class used by word motions and word text objects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CharClass {
        Blank,
        Punctuation,
        Word,
    }

    /// Classify a grapheme. `big` selects WORD semantics where every non-blank is one class.
    pub fn classify(g: &str, big: bool) -> CharClass {
        match g.chars().next() {
            None => CharClass::Blank,
            Some(c) if c.is_whitespace() => CharClass::Blank,
            Some(_) if big => CharClass::Word,
            Some(c) if c == '_' || c.is_alphanumeric() => CharClass::Word,
            Some(_) => CharClass::Punctuation,
        }
    }

    /// Iterate grapheme clusters in a line.
    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    /// Iterate grapheme clusters with their byte offsets.
    pub fn iter_indices(line: &str) -> impl Iterator<Item = (usize, &str)> {
        line.grapheme_indices(true)
    }

    /// Grapheme starting at `byte`, if any.
    pub fn at(line: &str, byte: usize) -> Option<&str> {
        if byte >= line.len() {
            return None;
        }
        line[byte..].graphemes(true).next()
    }

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Largest grapheme boundary that is `<= byte`.
    pub fn floor_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Start of the final grapheme (0 for an empty line). Normal-mode cursors rest here at most.
    pub fn last_boundary(line: &str) -> usize {
        prev_boundary(line, line.len())
    }

    /// Byte offset of the first non-blank grapheme (line length when all blank).
    pub fn first_non_blank(line: &str) -> usize {
        line.grapheme_indices(true)
            .find(|(_, g)| !g.chars().all(char::is_whitespace))
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    /// Number of grapheme clusters in a line.
    pub fn count(line: &str) -> usize {
        line.graphemes(true).count()
    }

    /// Width in terminal cells of this grapheme cluster (never zero for a non-empty cluster).
    pub fn cluster_width(g: &str) -> usize {
        if g.is_empty() {
            return 0;
        }
        UnicodeWidthStr::width(g).max(1)
    }

    /// Compute visual column (terminal cells) up to (but not including) byte offset.
    pub fn visual_col(line: &str, byte: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += cluster_width(g);
        }
        col
    }

    /// Total display width of a line.
    pub fn display_width(line: &str) -> usize {
        visual_col(line, line.len())
    }

    /// Byte offset of the grapheme covering display column `target`, or the
    /// line length when the line is shorter.
    pub fn byte_for_visual_col(line: &str, target: usize) -> usize {
        let mut col = 0;
        for (b, g) in line.grapheme_indices(true) {
            let w = cluster_width(g);
            if col + w > target {
                return b;
            }
            col += w;
        }
        line.len()
    }
}

#[cfg(test)]
mod tests {
    use super::grapheme;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_round_trip_verbatim() {
        let b = Buffer::from_lines(["hello", "", "world "]);
        assert_eq!(b.line_count(), 3);
        assert_eq!(b.lines(), vec!["hello", "", "world "]);
        assert_eq!(b.line(1).unwrap(), "");
        assert_eq!(b.line_len(2), 6);
    }

    #[test]
    fn empty_document_is_one_empty_line() {
        let b = Buffer::from_lines(Vec::<String>::new());
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.lines(), vec![""]);
    }

    #[test]
    fn carriage_return_is_not_a_line_break() {
        let b = Buffer::from_lines(["a\rb", "c"]);
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0).unwrap(), "a\rb");
    }

    #[test]
    fn insert_and_remove_across_lines() {
        let mut b = Buffer::from_lines(["abcd", "efgh"]);
        let end = b.insert(Position::new(0, 2), "X\nY");
        assert_eq!(b.lines(), vec!["abX", "Ycd", "efgh"]);
        assert_eq!(end, Position::new(1, 1));
        let removed = b.remove(Position::new(0, 2), Position::new(1, 1));
        assert_eq!(removed, "X\nY");
        assert_eq!(b.lines(), vec!["abcd", "efgh"]);
    }

    #[test]
    fn remove_lines_middle_and_tail() {
        let mut b = Buffer::from_lines(["a", "b", "c", "d"]);
        assert_eq!(b.remove_lines(1, 2), vec!["b", "c"]);
        assert_eq!(b.lines(), vec!["a", "d"]);
        assert_eq!(b.remove_lines(1, 1), vec!["d"]);
        assert_eq!(b.lines(), vec!["a"]);
        assert_eq!(b.remove_lines(0, 0), vec!["a"]);
        assert_eq!(b.lines(), vec![""]);
    }

    #[test]
    fn insert_lines_before_and_append() {
        let mut b = Buffer::from_lines(["a", "c"]);
        b.insert_lines(1, &["b".to_string()]);
        b.insert_lines(3, &["d".to_string(), "e".to_string()]);
        assert_eq!(b.lines(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn set_line_keeps_neighbours() {
        let mut b = Buffer::from_lines(["one", "two", "three"]);
        b.set_line(1, "2");
        b.set_line(2, "");
        assert_eq!(b.lines(), vec!["one", "2", ""]);
    }

    #[test]
    fn char_index_and_position_agree_on_multibyte() {
        let b = Buffer::from_lines(["aλb", "ü"]);
        let pos = Position::new(0, 3); // after 'λ'
        let idx = b.char_index(pos);
        assert_eq!(idx, 2);
        assert_eq!(b.position_of(idx), pos);
        assert_eq!(b.position_of(4), Position::new(1, 0));
    }

    #[test]
    fn clamp_snaps_to_boundaries() {
        let b = Buffer::from_lines(["aλb"]);
        assert_eq!(b.clamp(Position::new(5, 2)), Position::new(0, 1));
        assert_eq!(b.clamp(Position::new(0, 99)), Position::new(0, 4));
    }

    #[test]
    fn hash_tracks_content() {
        let a = Buffer::from_lines(["x", "y"]);
        let b = Buffer::from_lines(["x", "y"]);
        let c = Buffer::from_lines(["xy"]);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn grapheme_combining_mark() {
        let s = "e\u{301}x";
        let nb = grapheme::next_boundary(s, 0);
        assert_eq!(nb, 3);
        assert_eq!(grapheme::prev_boundary(s, nb), 0);
        assert_eq!(grapheme::count(s), 2);
    }

    #[test]
    fn visual_columns_with_wide_chars() {
        let s = "a漢b";
        assert_eq!(grapheme::visual_col(s, s.len()), 4);
        assert_eq!(grapheme::byte_for_visual_col(s, 2), 1);
        assert_eq!(grapheme::byte_for_visual_col(s, 3), 4);
        assert_eq!(grapheme::byte_for_visual_col(s, 10), s.len());
    }

    #[test]
    fn classify_word_punct_blank() {
        use grapheme::CharClass::*;
        assert_eq!(grapheme::classify("a", false), Word);
        assert_eq!(grapheme::classify("_", false), Word);
        assert_eq!(grapheme::classify(".", false), Punctuation);
        assert_eq!(grapheme::classify(".", true), Word);
        assert_eq!(grapheme::classify(" ", true), Blank);
        assert_eq!(grapheme::first_non_blank("  x"), 2);
        assert_eq!(grapheme::last_boundary("abc"), 2);
        assert_eq!(grapheme::last_boundary(""), 0);
    }
}
