//! Command layer of the modal engine.
//!
//! Keys flow through three stages:
//! * `KeyTranslator` accumulates counts, registers, operators and prefix keys
//!   and emits one `Action` per complete command.
//! * `span_resolver` and `text_object` turn motions and objects into ranges.
//! * `dispatcher::dispatch` applies an `Action` to an `EditorContext`.
//!
//! `Engine` ties the stages together and is the only type most callers need.

use core_state::{Direction, EngineError, InsertVariant, PutPlacement, VisualKind};
use core_text::motion::FindSpec;

pub mod dispatcher;
mod engine;
pub mod ex;
pub mod key_translator;
pub mod span_resolver;
pub mod text_object;

pub use dispatcher::{DispatchResult, EditorContext, dispatch};
pub use engine::Engine;
pub use ex::{ExCommand, LineRange};
pub use key_translator::KeyTranslator;
pub use text_object::{TextObject, TextObjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    FirstNonBlank,
    LineEnd,
    WordForward,
    BigWordForward,
    WordBackward,
    BigWordBackward,
    WordEnd,
    BigWordEnd,
    /// `gg`; a count selects the row.
    FileStart,
    /// `G`; a count selects the row.
    FileEnd,
    ParagraphForward,
    ParagraphBackward,
    Find(FindSpec),
    RepeatFind,
    RepeatFindReverse,
    /// `` `x ``
    MarkExact(char),
    /// `'x`
    MarkLine(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Delete,
    Yank,
    Change,
}

impl OperatorKind {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            'd' => Some(OperatorKind::Delete),
            'y' => Some(OperatorKind::Yank),
            'c' => Some(OperatorKind::Change),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            OperatorKind::Delete => 'd',
            OperatorKind::Yank => 'y',
            OperatorKind::Change => 'c',
        }
    }
}

/// What an operator acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorTarget {
    Motion(MotionKind),
    /// Doubled operator (`dd`, `cc`, `yy`): `count` whole lines.
    Lines,
    Object(TextObject),
}

/// How far a Visual operator reaches beyond the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualExtent {
    Selection,
    /// `X`, `Y`, `S`, `R`: every selected row, whole.
    Lines,
    /// `D`, `C`: whole rows, or to end of line for a block.
    ToLineEnd,
}

/// Insert- and Replace-mode edits. Kept as values so an insert session can be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKind {
    InsertChar(char),
    Newline,
    Tab,
    Backspace,
    DeleteUnder,
    Move(Direction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Motion {
        motion: MotionKind,
        count: Option<usize>,
    },
    Operator {
        op: OperatorKind,
        target: OperatorTarget,
        count: Option<usize>,
        register: Option<char>,
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
    /// `r` was typed; the next key is the replacement.
    BeginReplaceSingle,
    ReplaceChar {
        ch: char,
        count: usize,
    },
    EnterInsert {
        variant: InsertVariant,
        count: usize,
    },
    EnterReplace {
        count: usize,
    },
    EnterVisual(VisualKind),
    Undo {
        count: usize,
    },
    Redo {
        count: usize,
    },
    RepeatLast {
        count: Option<usize>,
    },
    SetMark(char),
    JumpBack {
        count: usize,
    },
    JumpForward {
        count: usize,
    },
    CommandStart {
        count: Option<usize>,
    },
    CommandChar(char),
    CommandBackspace,
    CommandSubmit,
    VisualSwap,
    VisualObject {
        object: TextObject,
        count: usize,
    },
    VisualOperator {
        op: OperatorKind,
        extent: VisualExtent,
        register: Option<char>,
    },
    VisualJoin {
        spaces: bool,
    },
    VisualReplace(char),
    VisualPut {
        count: usize,
        register: Option<char>,
    },
    Edit(EditKind),
    Escape,
    /// A pending command was dropped; the error becomes the dispatch notice.
    Rejected(EngineError),
}
