//! Dispatcher applying `Action` to an `EditorContext`.
//!
//! Decomposed into focused sub-modules:
//! * `motion`   - cursor movement, marks and the jump list
//! * `operator` - `d`/`c`/`y` over resolved ranges
//! * `mode`     - mode entry/exit and insert sessions
//! * `edit`     - insert/replace edits, put, join, `r`
//! * `visual`   - selection handling and visual operators
//! * `command`  - the `:` line
//! * `undo`     - undo / redo
//! * `repeat`   - recording and replaying the last change (`.`)
//!
//! Every handler returns `EngineResult<()>`. Errors never escape `dispatch`:
//! they become the notice of the returned `DispatchResult` and the state is
//! left as the failing handler found it.

use crate::{Action, EditKind};
use core_config::EngineConfig;
use core_state::{
    CommandLineState, EngineError, EngineResult, InsertVariant, Mode, ModeManager,
    Registers, Selection, TextBuffer,
};
use core_text::{Buffer, Position};
use core_text::motion::FindSpec;
use tracing::{debug, trace};

mod command;
mod edit;
mod mode;
mod motion;
mod operator;
mod repeat;
mod undo;
mod visual;

pub(crate) use repeat::{Change, RepeatState};
pub(crate) use operator::{capture as capture_range, delete as delete_range};

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Anything observable changed (cursor, mode, selection, content, pending keys).
    pub dirty: bool,
    /// Buffer content changed.
    pub buffer_changed: bool,
    /// A recoverable condition that was swallowed.
    pub notice: Option<EngineError>,
    /// Text of a submitted `:` line, without the colon.
    pub command_line: Option<String>,
}

impl DispatchResult {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn notice(err: EngineError) -> Self {
        Self {
            notice: Some(err),
            ..Self::default()
        }
    }

    pub fn submitted(line: String) -> Self {
        Self {
            command_line: Some(line),
            ..Self::default()
        }
    }
}

/// Where an insert session came from; decides what `.` records when it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionOrigin {
    Insert(InsertVariant),
    Replace,
    /// A change operator waiting for its inserted text.
    Change(Change),
}

/// Keys typed since entering Insert or Replace mode.
#[derive(Debug, Clone)]
pub(crate) struct InsertSession {
    origin: SessionOrigin,
    count: usize,
    keys: Vec<EditKind>,
    overwritten: Vec<edit::Overwrite>,
}

impl InsertSession {
    fn new(origin: SessionOrigin, count: usize) -> Self {
        Self {
            origin,
            count: count.max(1),
            keys: Vec::new(),
            overwritten: Vec::new(),
        }
    }
}

/// Everything one key may touch.
pub struct EditorContext {
    pub text: TextBuffer,
    pub registers: Registers,
    pub modes: ModeManager,
    /// Present exactly while a Visual mode is active.
    pub selection: Option<Selection>,
    pub command_line: CommandLineState,
    pub config: EngineConfig,
    pub(crate) last_find: Option<FindSpec>,
    pub(crate) session: Option<InsertSession>,
    pub(crate) repeat: RepeatState,
}

impl EditorContext {
    pub fn new(buffer: Buffer, config: EngineConfig) -> Self {
        Self {
            text: TextBuffer::with_limits(buffer, config.undo_max, config.jump_max),
            registers: Registers::new(),
            modes: ModeManager::new(config.mode_history),
            selection: None,
            command_line: CommandLineState::default(),
            config,
            last_find: None,
            session: None,
            repeat: RepeatState::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Observed {
    revision: u64,
    cursor: Position,
    mode: Mode,
    selection: Option<Selection>,
    command_line: String,
}

impl Observed {
    fn of(ctx: &EditorContext) -> Self {
        Self {
            revision: ctx.text.revision(),
            cursor: ctx.text.cursor(),
            mode: ctx.mode(),
            selection: ctx.selection,
            command_line: ctx.command_line.buffer().to_string(),
        }
    }
}

/// Run `f` and describe what it changed. A submitted command line is passed through.
pub(crate) fn observed<F>(ctx: &mut EditorContext, f: F) -> DispatchResult
where
    F: FnOnce(&mut EditorContext) -> EngineResult<Option<String>>,
{
    let before = Observed::of(ctx);
    let mut result = match f(ctx) {
        Ok(Some(line)) => DispatchResult::submitted(line),
        Ok(None) => DispatchResult::clean(),
        Err(err) => {
            debug!(target: "actions.dispatch", error = %err, mode = ?ctx.mode(), "notice");
            DispatchResult::notice(err)
        }
    };
    let after = Observed::of(ctx);
    result.buffer_changed = before.revision != after.revision;
    result.dirty = before != after;
    result
}

/// Apply an action to the editor context.
pub fn dispatch(action: Action, ctx: &mut EditorContext) -> DispatchResult {
    trace!(target: "actions.dispatch", ?action, mode = ?ctx.mode(), "dispatch");
    observed(ctx, |ctx| {
        let none = |r: EngineResult<()>| -> EngineResult<Option<String>> { r.map(|()| None) };
        match action {
            Action::Motion { motion, count } => none(motion::handle_motion(ctx, motion, count)),
            Action::Operator {
                op,
                target,
                count,
                register,
            } => none(operator::handle_operator(ctx, op, target, count, register)),
            Action::Put {
                placement,
                count,
                register,
            } => none(edit::handle_put(ctx, placement, count, register)),
            Action::Join { count, spaces } => none(edit::handle_join(ctx, count, spaces)),
            Action::BeginReplaceSingle => none(mode::enter_replace_single(ctx)),
            Action::ReplaceChar { ch, count } => none(edit::handle_replace_char(ctx, ch, count)),
            Action::EnterInsert { variant, count } => none(mode::enter_insert(ctx, variant, count)),
            Action::EnterReplace { count } => none(mode::enter_replace(ctx, count)),
            Action::EnterVisual(kind) => none(visual::toggle(ctx, kind)),
            Action::Undo { count } => none(undo::handle_undo(ctx, count)),
            Action::Redo { count } => none(undo::handle_redo(ctx, count)),
            Action::RepeatLast { count } => none(repeat::handle_repeat(ctx, count)),
            Action::SetMark(name) => none(motion::set_mark(ctx, name)),
            Action::JumpBack { count } => none(motion::jump(ctx, count, false)),
            Action::JumpForward { count } => none(motion::jump(ctx, count, true)),
            Action::CommandStart { count } => none(command::start(ctx, count)),
            Action::CommandChar(ch) => none(command::push(ctx, ch)),
            Action::CommandBackspace => none(command::backspace(ctx)),
            Action::CommandSubmit => command::submit(ctx).map(Some),
            Action::VisualSwap => none(visual::swap(ctx)),
            Action::VisualObject { object, count } => none(visual::select_object(ctx, object, count)),
            Action::VisualOperator {
                op,
                extent,
                register,
            } => none(visual::handle_operator(ctx, op, extent, register)),
            Action::VisualJoin { spaces } => none(visual::handle_join(ctx, spaces)),
            Action::VisualReplace(ch) => none(visual::handle_replace(ctx, ch)),
            Action::VisualPut { count, register } => none(visual::handle_put(ctx, count, register)),
            Action::Edit(kind) => none(edit::handle_edit(ctx, kind)),
            Action::Escape => none(mode::escape(ctx)),
            Action::Rejected(err) => Err(err),
        }
    })
}
