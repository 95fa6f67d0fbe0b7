//! Recoverable engine conditions.
//!
//! None of these abort the dispatch loop. The dispatcher turns them into a notice on
//! the dispatch result and keeps going with the buffer untouched.

use crate::mode::{Mode, ModeEvent};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid mode transition from {from:?} on {event:?}")]
    InvalidTransition { from: Mode, event: ModeEvent },
    #[error("position {row}:{col} is outside the buffer")]
    OutOfBounds { row: usize, col: usize },
    #[error("already at oldest change")]
    EmptyUndoStack,
    #[error("already at newest change")]
    EmptyRedoStack,
    #[error("operator {operator} cannot be resolved by {key}")]
    UnresolvedOperator { operator: char, key: String },
    #[error("register {0} is empty")]
    RegisterMiss(char),
    #[error("mark {0} is not set")]
    MarkNotFound(char),
    #[error("invalid register name {0:?}")]
    InvalidRegister(char),
    #[error("no previous change to repeat")]
    NoPreviousChange,
    #[error("jump list exhausted")]
    JumpListExhausted,
    #[error("motion failed")]
    MotionFailed,
}

pub type EngineResult<T> = Result<T, EngineError>;
