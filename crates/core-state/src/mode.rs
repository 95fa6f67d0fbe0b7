//! Mode state machine.
//!
//! `transition` is a pure function over the closed `Mode` sum type; `ModeManager`
//! wraps it with the live state and a bounded introspection history. Rejected
//! transitions leave the state untouched.

use crate::error::EngineError;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Which key opened an Insert session. Only used for repeat and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertVariant {
    /// `i`
    Insert,
    /// `a`
    Append,
    /// `I`
    InsertAtFirstNonBlank,
    /// `A`
    AppendAtLineEnd,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
    /// `c`, `s`, `S`, `C` and Visual `c`
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Char,
    Line,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Insert(InsertVariant),
    Visual(VisualKind),
    Replace,
    ReplaceSingle,
    CommandLine,
}

impl Mode {
    pub fn is_insert(self) -> bool {
        matches!(self, Mode::Insert(_))
    }

    pub fn is_visual(self) -> bool {
        matches!(self, Mode::Visual(_))
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert(_) => "INSERT",
            Mode::Visual(VisualKind::Char) => "VISUAL",
            Mode::Visual(VisualKind::Line) => "VISUAL LINE",
            Mode::Visual(VisualKind::Block) => "VISUAL BLOCK",
            Mode::Replace => "REPLACE",
            Mode::ReplaceSingle => "REPLACE (single)",
            Mode::CommandLine => "COMMAND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeEvent {
    EnterInsert(InsertVariant),
    EnterVisual(VisualKind),
    EnterReplace,
    EnterReplaceSingle,
    EnterCommandLine,
    Escape,
    OperatorApplied,
    ReplaceCommitted,
    Submit,
}

/// The transition table.
pub fn transition(from: Mode, event: ModeEvent) -> Result<Mode, EngineError> {
    use Mode::*;
    use ModeEvent::*;
    let to = match (from, event) {
        (Normal, EnterInsert(v)) => Insert(v),
        (Normal, EnterVisual(k)) => Visual(k),
        (Normal, EnterReplace) => Replace,
        (Normal, EnterReplaceSingle) => ReplaceSingle,
        (Normal, EnterCommandLine) => CommandLine,
        (Insert(_), Escape) | (Replace, Escape) => Normal,
        (Visual(_), Escape) | (Visual(_), OperatorApplied) => Normal,
        (Visual(cur), EnterVisual(k)) if cur == k => Normal,
        (Visual(_), EnterVisual(k)) => Visual(k),
        (ReplaceSingle, ReplaceCommitted) | (ReplaceSingle, Escape) => Normal,
        (CommandLine, Submit) | (CommandLine, Escape) => Normal,
        _ => return Err(EngineError::InvalidTransition { from, event }),
    };
    Ok(to)
}

#[derive(Debug, Clone)]
pub struct ModeManager {
    mode: Mode,
    history: VecDeque<Mode>,
    history_len: usize,
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new(32)
    }
}

impl ModeManager {
    pub fn new(history_len: usize) -> Self {
        Self {
            mode: Mode::Normal,
            history: VecDeque::new(),
            history_len: history_len.max(1),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Previous modes, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Mode> {
        self.history.iter()
    }

    pub fn apply(&mut self, event: ModeEvent) -> Result<Mode, EngineError> {
        match transition(self.mode, event) {
            Ok(to) => {
                if self.history.len() == self.history_len {
                    self.history.pop_front();
                }
                self.history.push_back(self.mode);
                trace!(target: "state.mode", from = ?self.mode, to = ?to, ?event, "mode_transition");
                self.mode = to;
                Ok(to)
            }
            Err(err) => {
                debug!(target: "state.mode", mode = ?self.mode, ?event, "transition_rejected");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_accepts_documented_edges() {
        let cases = [
            (Mode::Normal, ModeEvent::EnterInsert(InsertVariant::Append), Mode::Insert(InsertVariant::Append)),
            (Mode::Normal, ModeEvent::EnterVisual(VisualKind::Line), Mode::Visual(VisualKind::Line)),
            (Mode::Normal, ModeEvent::EnterReplace, Mode::Replace),
            (Mode::Normal, ModeEvent::EnterReplaceSingle, Mode::ReplaceSingle),
            (Mode::Normal, ModeEvent::EnterCommandLine, Mode::CommandLine),
            (Mode::Insert(InsertVariant::Insert), ModeEvent::Escape, Mode::Normal),
            (Mode::Replace, ModeEvent::Escape, Mode::Normal),
            (Mode::Visual(VisualKind::Char), ModeEvent::OperatorApplied, Mode::Normal),
            (Mode::Visual(VisualKind::Block), ModeEvent::Escape, Mode::Normal),
            (Mode::Visual(VisualKind::Char), ModeEvent::EnterVisual(VisualKind::Char), Mode::Normal),
            (Mode::Visual(VisualKind::Char), ModeEvent::EnterVisual(VisualKind::Block), Mode::Visual(VisualKind::Block)),
            (Mode::ReplaceSingle, ModeEvent::ReplaceCommitted, Mode::Normal),
            (Mode::CommandLine, ModeEvent::Submit, Mode::Normal),
            (Mode::CommandLine, ModeEvent::Escape, Mode::Normal),
        ];
        for (from, event, to) in cases {
            assert_eq!(transition(from, event), Ok(to), "{from:?} + {event:?}");
        }
    }

    #[test]
    fn table_rejects_everything_else() {
        for (from, event) in [
            (Mode::Normal, ModeEvent::Escape),
            (Mode::Normal, ModeEvent::Submit),
            (Mode::Insert(InsertVariant::Insert), ModeEvent::EnterVisual(VisualKind::Char)),
            (Mode::Visual(VisualKind::Line), ModeEvent::EnterInsert(InsertVariant::Insert)),
            (Mode::CommandLine, ModeEvent::OperatorApplied),
            (Mode::Replace, ModeEvent::ReplaceCommitted),
        ] {
            assert_eq!(
                transition(from, event),
                Err(EngineError::InvalidTransition { from, event })
            );
        }
    }

    #[test]
    fn manager_keeps_state_on_rejection_and_bounds_history() {
        let mut m = ModeManager::new(2);
        assert!(m.apply(ModeEvent::Escape).is_err());
        assert_eq!(m.mode(), Mode::Normal);
        assert_eq!(m.history().count(), 0);
        m.apply(ModeEvent::EnterInsert(InsertVariant::Insert)).unwrap();
        m.apply(ModeEvent::Escape).unwrap();
        m.apply(ModeEvent::EnterCommandLine).unwrap();
        let hist: Vec<Mode> = m.history().copied().collect();
        assert_eq!(hist, vec![Mode::Insert(InsertVariant::Insert), Mode::Normal]);
        assert_eq!(m.mode(), Mode::CommandLine);
    }
}
