//! Marks and the jump list.
//!
//! Marks are static: edits never shift them, and a stale mark is clamped into
//! the buffer when it is used. The `'` mark always holds the position before
//! the latest jump.

use core_text::Position;
use std::collections::VecDeque;
use tracing::trace;

/// Name of the "previous context" mark.
pub const PREVIOUS_CONTEXT: char = '\'';

#[derive(Debug, Clone, Default)]
pub struct Marks {
    user: [Option<Position>; 26],
    previous_context: Option<Position>,
}

impl Marks {
    pub fn is_valid_name(name: char) -> bool {
        name.is_ascii_lowercase() || name == PREVIOUS_CONTEXT || name == '`'
    }

    /// Store a mark. Returns false for names that cannot be set.
    pub fn set(&mut self, name: char, pos: Position) -> bool {
        match name {
            'a'..='z' => self.user[name as usize - 'a' as usize] = Some(pos),
            '\'' | '`' => self.previous_context = Some(pos),
            _ => return false,
        }
        trace!(target: "state.marks", %name, row = pos.row, col = pos.col, "mark_set");
        true
    }

    pub fn get(&self, name: char) -> Option<Position> {
        match name {
            'a'..='z' => self.user[name as usize - 'a' as usize],
            '\'' | '`' => self.previous_context,
            _ => None,
        }
    }
}

/// Bounded back/forward history of jump origins (`<C-o>` / `<C-i>`).
///
/// `current == entries.len()` means the cursor is live rather than walking the
/// history. The first step back saves the live position so walking forward can
/// return to it.
#[derive(Debug, Clone)]
pub struct JumpList {
    entries: VecDeque<Position>,
    current: usize,
    max: usize,
}

impl Default for JumpList {
    fn default() -> Self {
        Self::new(100)
    }
}

impl JumpList {
    pub fn new(max: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            current: 0,
            max: max.max(1),
        }
    }

    /// Record the origin of a jump. Walking mid-list and pushing drops the forward
    /// history; an entry on the same row as the newest one replaces it.
    pub fn push(&mut self, pos: Position) {
        self.entries.truncate(self.current);
        match self.entries.back_mut() {
            Some(last) if last.row == pos.row => *last = pos,
            _ => {
                self.entries.push_back(pos);
                if self.entries.len() > self.max {
                    self.entries.pop_front();
                }
            }
        }
        self.current = self.entries.len();
        trace!(target: "state.marks", row = pos.row, col = pos.col, len = self.entries.len(), "jump_push");
    }

    /// Step back `count` entries from `live`.
    pub fn back(&mut self, live: Position, count: usize) -> Option<Position> {
        if self.entries.is_empty() {
            return None;
        }
        if self.current >= self.entries.len() {
            if self.entries.back().is_none_or(|e| e.row != live.row) {
                self.entries.push_back(live);
                if self.entries.len() > self.max + 1 {
                    self.entries.pop_front();
                }
            }
            self.current = self.entries.len() - 1;
        }
        if self.current < count {
            return None;
        }
        self.current -= count;
        self.entries.get(self.current).copied()
    }

    /// Step forward `count` entries.
    pub fn forward(&mut self, count: usize) -> Option<Position> {
        if self.current + count >= self.entries.len() {
            return None;
        }
        self.current += count;
        self.entries.get(self.current).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: usize) -> Position {
        Position::new(row, 0)
    }

    #[test]
    fn marks_set_and_get() {
        let mut m = Marks::default();
        assert!(m.set('a', Position::new(3, 2)));
        assert!(!m.set('A', p(0)));
        assert_eq!(m.get('a'), Some(Position::new(3, 2)));
        assert_eq!(m.get('b'), None);
        m.set(PREVIOUS_CONTEXT, p(7));
        assert_eq!(m.get('`'), Some(p(7)));
    }

    #[test]
    fn back_saves_live_and_forward_returns() {
        let mut j = JumpList::new(10);
        j.push(p(0));
        j.push(p(10));
        assert_eq!(j.back(p(20), 1), Some(p(10)));
        assert_eq!(j.back(p(10), 1), Some(p(0)));
        assert_eq!(j.back(p(0), 1), None);
        assert_eq!(j.forward(1), Some(p(10)));
        assert_eq!(j.forward(1), Some(p(20)));
        assert_eq!(j.forward(1), None);
    }

    #[test]
    fn push_mid_list_truncates_and_same_row_collapses() {
        let mut j = JumpList::new(10);
        j.push(p(1));
        j.push(p(2));
        j.push(Position::new(2, 5));
        assert_eq!(j.len(), 2);
        j.push(p(3));
        assert_eq!(j.back(p(9), 2), Some(Position::new(2, 5)));
        j.push(p(5));
        assert_eq!(j.len(), 2);
        assert_eq!(j.forward(1), None);
    }

    #[test]
    fn bounded() {
        let mut j = JumpList::new(3);
        for row in 0..6 {
            j.push(p(row));
        }
        assert_eq!(j.len(), 3);
        assert_eq!(j.back(p(50), 3), Some(p(3)));
    }
}
