//! KeyTranslator: stateful key -> Action translation.
//!
//! The translator is the partial-command accumulator. It advances one key at a
//! time and emits an `Action` once a command is complete.
//!
//! State Machine:
//! * Idle: optional `pending_count` (prefix digits) and `pending_register`
//!   (`"x`, at most once, before the operator).
//! * OperatorPending(op): operator captured; digits build `post_op_count`. The
//!   same operator again targets whole lines (`dd`), `i`/`a` start a text object
//!   and a motion resolves the command with `count = prefix * post_op`
//!   (saturating, clamped to `max_count`).
//! * Awaiting: the previous key needs one more character (`f`, `t`, `m`, `'`,
//!   `` ` ``, `"`, `g`, Visual `r`, objects).
//!
//! A leading `0` is the `LineStart` motion, also right after an operator (`d0`).
//! `<Esc>` drops everything. Any key that cannot continue a pending command
//! drops the whole command and is reported through `Action::Rejected`.
//!
//! Insert, Replace and CommandLine keys carry no pending state and map directly.

use crate::text_object::{TextObject, TextObjectKind};
use crate::{Action, EditKind, MotionKind, OperatorKind, OperatorTarget, VisualExtent};
use core_events::{KeyCode, KeyEvent};
use core_state::{
    Direction, EngineError, InsertVariant, Marks, Mode, PutPlacement, VisualKind, registers,
};
use core_text::motion::FindSpec;
use tracing::trace;

/// Counts saturate here unless configured otherwise.
pub const DEFAULT_MAX_COUNT: usize = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Register,
    Find { forward: bool, till: bool },
    SetMark,
    Mark { linewise: bool },
    GPrefix,
    Object { inner: bool },
    VisualReplace,
}

impl Awaiting {
    /// The key that opened this state, for rejection notices.
    fn lead(self) -> char {
        match self {
            Awaiting::Register => '"',
            Awaiting::Find { forward, till } => match (forward, till) {
                (true, false) => 'f',
                (true, true) => 't',
                (false, false) => 'F',
                (false, true) => 'T',
            },
            Awaiting::SetMark => 'm',
            Awaiting::Mark { linewise: true } => '\'',
            Awaiting::Mark { linewise: false } => '`',
            Awaiting::GPrefix => 'g',
            Awaiting::Object { inner: true } => 'i',
            Awaiting::Object { inner: false } => 'a',
            Awaiting::VisualReplace => 'r',
        }
    }
}

enum MotionStep {
    Done(MotionKind),
    Wait,
    Miss,
}

#[derive(Debug)]
pub struct KeyTranslator {
    /// Count prefix prior to an operator or motion (e.g. `12d` or `12w`).
    pending_count: Option<usize>,
    /// Pending operator kind (d,y,c) awaiting motion.
    pending_operator: Option<OperatorKind>,
    /// Count following an operator but before the motion (e.g. `d3w`).
    post_op_count: Option<usize>,
    /// Pending explicit register (after '"').
    pending_register: Option<char>,
    awaiting: Option<Awaiting>,
    /// Count carried from `r` to the replacement key.
    replace_count: usize,
    /// Keys of the command typed so far.
    keys: String,
    max_count: usize,
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self::with_max_count(DEFAULT_MAX_COUNT)
    }

    pub fn with_max_count(max_count: usize) -> Self {
        Self {
            pending_count: None,
            pending_operator: None,
            post_op_count: None,
            pending_register: None,
            awaiting: None,
            replace_count: 1,
            keys: String::new(),
            max_count: max_count.max(1),
        }
    }

    /// Drop any partially typed command.
    pub fn reset(&mut self) {
        self.pending_count = None;
        self.pending_operator = None;
        self.post_op_count = None;
        self.pending_register = None;
        self.awaiting = None;
        self.keys.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.pending_count.is_none()
            && self.pending_operator.is_none()
            && self.post_op_count.is_none()
            && self.pending_register.is_none()
            && self.awaiting.is_none()
    }

    /// Text of the partially typed command (for a "showcmd" area).
    pub fn pending_keys(&self) -> &str {
        &self.keys
    }

    pub fn translate(&mut self, mode: Mode, key: &KeyEvent) -> Option<Action> {
        trace!(target: "actions.translate", ?mode, key = %key, pending = %self.keys, "translate_key");
        match mode {
            Mode::Insert(_) | Mode::Replace => insert_map(key),
            Mode::CommandLine => command_map(key),
            Mode::ReplaceSingle => Some(self.replace_single(key)),
            Mode::Normal | Mode::Visual(_) => {
                self.keys.push_str(&key.to_string());
                let action = self.command_key(mode.is_visual(), key);
                if action.is_some() {
                    self.reset();
                }
                action
            }
        }
    }

    fn replace_single(&mut self, key: &KeyEvent) -> Action {
        let count = std::mem::replace(&mut self.replace_count, 1);
        let ch = match key.code {
            KeyCode::Enter => Some('\n'),
            KeyCode::Tab => Some('\t'),
            _ => key.printable(),
        };
        match ch {
            Some(ch) => Action::ReplaceChar { ch, count },
            None => Action::Escape,
        }
    }

    fn command_key(&mut self, visual: bool, key: &KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Esc {
            let idle = self.is_idle();
            self.reset();
            return idle.then_some(Action::Escape);
        }
        if let Some(awaiting) = self.awaiting.take() {
            return self.complete_awaiting(awaiting, visual, key);
        }
        if key.is_ctrl() {
            return self.ctrl_key(visual, key);
        }
        let ch = match key.code {
            KeyCode::Char(c) => c,
            KeyCode::Left | KeyCode::Backspace => 'h',
            KeyCode::Right => 'l',
            KeyCode::Up => 'k',
            KeyCode::Down => 'j',
            KeyCode::Delete => 'x',
            KeyCode::Tab if !visual && self.pending_operator.is_none() => {
                return Some(Action::JumpForward { count: self.count() });
            }
            _ => return self.reject(None, key),
        };

        if ch.is_ascii_digit() && (ch != '0' || self.counting()) {
            self.push_digit(ch);
            return None;
        }
        if ch == '"' {
            if self.pending_operator.is_some() || self.pending_register.is_some() {
                return self.reject(None, key);
            }
            self.awaiting = Some(Awaiting::Register);
            return None;
        }
        if let Some(op) = self.pending_operator {
            return self.operator_key(op, ch, key);
        }
        if visual {
            self.visual_key(ch, key)
        } else {
            self.normal_key(ch, key)
        }
    }

    /// True when a digit continues a count rather than starting one.
    fn counting(&self) -> bool {
        if self.pending_operator.is_some() {
            self.post_op_count.is_some()
        } else {
            self.pending_count.is_some()
        }
    }

    fn push_digit(&mut self, ch: char) {
        let digit = ch as usize - '0' as usize;
        let slot = if self.pending_operator.is_some() {
            &mut self.post_op_count
        } else {
            &mut self.pending_count
        };
        let value = slot
            .unwrap_or(0)
            .saturating_mul(10)
            .saturating_add(digit)
            .min(self.max_count);
        *slot = Some(value);
    }

    /// Count for an immediate command (default 1).
    fn count(&self) -> usize {
        self.pending_count.unwrap_or(1)
    }

    /// Product of prefix and post-operator counts, `None` when neither was typed.
    fn total_count(&self) -> Option<usize> {
        match (self.pending_count, self.post_op_count) {
            (None, None) => None,
            (a, b) => Some(
                a.unwrap_or(1)
                    .saturating_mul(b.unwrap_or(1))
                    .min(self.max_count),
            ),
        }
    }

    fn finish_operator(&self, op: OperatorKind, target: OperatorTarget) -> Action {
        Action::Operator {
            op,
            target,
            count: self.total_count(),
            register: self.pending_register,
        }
    }

    fn finish_motion(&self, motion: MotionKind) -> Action {
        match self.pending_operator {
            Some(op) => self.finish_operator(op, OperatorTarget::Motion(motion)),
            None => Action::Motion {
                motion,
                count: self.pending_count,
            },
        }
    }

    fn reject(&mut self, lead: Option<char>, key: &KeyEvent) -> Option<Action> {
        let operator = self.pending_operator.map(OperatorKind::key).or(lead);
        self.reset();
        let operator = operator?;
        trace!(target: "actions.translate", %operator, key = %key, "pending_command_rejected");
        Some(Action::Rejected(EngineError::UnresolvedOperator {
            operator,
            key: key.to_string(),
        }))
    }

    fn motion_step(&mut self, ch: char) -> MotionStep {
        let motion = match ch {
            'h' => MotionKind::Left,
            'l' | ' ' => MotionKind::Right,
            'j' => MotionKind::Down,
            'k' => MotionKind::Up,
            '0' => MotionKind::LineStart,
            '^' => MotionKind::FirstNonBlank,
            '$' => MotionKind::LineEnd,
            'w' => MotionKind::WordForward,
            'W' => MotionKind::BigWordForward,
            'b' => MotionKind::WordBackward,
            'B' => MotionKind::BigWordBackward,
            'e' => MotionKind::WordEnd,
            'E' => MotionKind::BigWordEnd,
            'G' => MotionKind::FileEnd,
            '{' => MotionKind::ParagraphBackward,
            '}' => MotionKind::ParagraphForward,
            ';' => MotionKind::RepeatFind,
            ',' => MotionKind::RepeatFindReverse,
            'f' | 'F' | 't' | 'T' => {
                self.awaiting = Some(Awaiting::Find {
                    forward: matches!(ch, 'f' | 't'),
                    till: matches!(ch, 't' | 'T'),
                });
                return MotionStep::Wait;
            }
            '`' | '\'' => {
                self.awaiting = Some(Awaiting::Mark {
                    linewise: ch == '\'',
                });
                return MotionStep::Wait;
            }
            'g' => {
                self.awaiting = Some(Awaiting::GPrefix);
                return MotionStep::Wait;
            }
            _ => return MotionStep::Miss,
        };
        MotionStep::Done(motion)
    }

    fn operator_key(&mut self, op: OperatorKind, ch: char, key: &KeyEvent) -> Option<Action> {
        if ch == op.key() {
            return Some(self.finish_operator(op, OperatorTarget::Lines));
        }
        if ch == 'i' || ch == 'a' {
            self.awaiting = Some(Awaiting::Object { inner: ch == 'i' });
            return None;
        }
        match self.motion_step(ch) {
            MotionStep::Done(motion) => Some(self.finish_motion(motion)),
            MotionStep::Wait => None,
            MotionStep::Miss => self.reject(None, key),
        }
    }

    fn normal_key(&mut self, ch: char, key: &KeyEvent) -> Option<Action> {
        use OperatorKind::*;
        let count = self.count();
        let register = self.pending_register;
        let action = match ch {
            'd' | 'c' | 'y' => {
                self.pending_operator = OperatorKind::from_key(ch);
                self.post_op_count = None;
                return None;
            }
            'x' => self.finish_operator(Delete, OperatorTarget::Motion(MotionKind::Right)),
            'X' => self.finish_operator(Delete, OperatorTarget::Motion(MotionKind::Left)),
            'D' => self.finish_operator(Delete, OperatorTarget::Motion(MotionKind::LineEnd)),
            'C' => self.finish_operator(Change, OperatorTarget::Motion(MotionKind::LineEnd)),
            's' => self.finish_operator(Change, OperatorTarget::Motion(MotionKind::Right)),
            'S' => self.finish_operator(Change, OperatorTarget::Lines),
            'Y' => self.finish_operator(Yank, OperatorTarget::Lines),
            'p' | 'P' => Action::Put {
                placement: if ch == 'p' {
                    PutPlacement::After
                } else {
                    PutPlacement::Before
                },
                count,
                register,
            },
            'J' => Action::Join {
                count,
                spaces: true,
            },
            'r' => {
                self.replace_count = count;
                Action::BeginReplaceSingle
            }
            'i' | 'a' | 'I' | 'A' | 'o' | 'O' => Action::EnterInsert {
                variant: match ch {
                    'i' => InsertVariant::Insert,
                    'a' => InsertVariant::Append,
                    'I' => InsertVariant::InsertAtFirstNonBlank,
                    'A' => InsertVariant::AppendAtLineEnd,
                    'o' => InsertVariant::OpenBelow,
                    _ => InsertVariant::OpenAbove,
                },
                count,
            },
            'R' => Action::EnterReplace { count },
            'v' => Action::EnterVisual(VisualKind::Char),
            'V' => Action::EnterVisual(VisualKind::Line),
            'u' => Action::Undo { count },
            '.' => Action::RepeatLast {
                count: self.pending_count,
            },
            'm' => {
                self.awaiting = Some(Awaiting::SetMark);
                return None;
            }
            ':' => Action::CommandStart {
                count: self.pending_count,
            },
            _ => {
                return match self.motion_step(ch) {
                    MotionStep::Done(motion) => Some(self.finish_motion(motion)),
                    MotionStep::Wait => None,
                    MotionStep::Miss => self.reject(None, key),
                };
            }
        };
        Some(action)
    }

    fn visual_key(&mut self, ch: char, key: &KeyEvent) -> Option<Action> {
        use OperatorKind::*;
        let register = self.pending_register;
        let operator = |op, extent| Action::VisualOperator {
            op,
            extent,
            register,
        };
        let action = match ch {
            'd' | 'x' => operator(Delete, VisualExtent::Selection),
            'y' => operator(Yank, VisualExtent::Selection),
            'c' | 's' => operator(Change, VisualExtent::Selection),
            'X' => operator(Delete, VisualExtent::Lines),
            'Y' => operator(Yank, VisualExtent::Lines),
            'S' | 'R' => operator(Change, VisualExtent::Lines),
            'D' => operator(Delete, VisualExtent::ToLineEnd),
            'C' => operator(Change, VisualExtent::ToLineEnd),
            'o' => Action::VisualSwap,
            'J' => Action::VisualJoin { spaces: true },
            'p' | 'P' => Action::VisualPut {
                count: self.count(),
                register,
            },
            'v' => Action::EnterVisual(VisualKind::Char),
            'V' => Action::EnterVisual(VisualKind::Line),
            'i' | 'a' => {
                self.awaiting = Some(Awaiting::Object { inner: ch == 'i' });
                return None;
            }
            'r' => {
                self.awaiting = Some(Awaiting::VisualReplace);
                return None;
            }
            _ => {
                return match self.motion_step(ch) {
                    MotionStep::Done(motion) => Some(self.finish_motion(motion)),
                    MotionStep::Wait => None,
                    MotionStep::Miss => self.reject(None, key),
                };
            }
        };
        Some(action)
    }

    fn ctrl_key(&mut self, visual: bool, key: &KeyEvent) -> Option<Action> {
        let KeyCode::Char(c) = key.code else {
            return self.reject(None, key);
        };
        if self.pending_operator.is_some() {
            return self.reject(None, key);
        }
        let count = self.count();
        match c.to_ascii_lowercase() {
            'r' if !visual => Some(Action::Redo { count }),
            'o' if !visual => Some(Action::JumpBack { count }),
            'i' if !visual => Some(Action::JumpForward { count }),
            'v' => Some(Action::EnterVisual(VisualKind::Block)),
            _ => self.reject(None, key),
        }
    }

    fn complete_awaiting(&mut self, awaiting: Awaiting, visual: bool, key: &KeyEvent) -> Option<Action> {
        let ch = match (awaiting, key.code) {
            (Awaiting::VisualReplace, KeyCode::Tab) => Some('\t'),
            _ => key.printable(),
        };
        let Some(ch) = ch else {
            return self.reject(Some(awaiting.lead()), key);
        };
        match awaiting {
            Awaiting::Register => {
                if registers::is_valid_name(ch) {
                    self.pending_register = Some(ch);
                    None
                } else {
                    self.reset();
                    Some(Action::Rejected(EngineError::InvalidRegister(ch)))
                }
            }
            Awaiting::Find { forward, till } => Some(self.finish_motion(MotionKind::Find(FindSpec {
                ch,
                forward,
                till,
            }))),
            Awaiting::Mark { linewise } if Marks::is_valid_name(ch) => {
                Some(self.finish_motion(if linewise {
                    MotionKind::MarkLine(ch)
                } else {
                    MotionKind::MarkExact(ch)
                }))
            }
            Awaiting::SetMark if ch.is_ascii_lowercase() => Some(Action::SetMark(ch)),
            Awaiting::GPrefix if ch == 'g' => Some(self.finish_motion(MotionKind::FileStart)),
            Awaiting::GPrefix if ch == 'J' && self.pending_operator.is_none() => Some(if visual {
                Action::VisualJoin { spaces: false }
            } else {
                Action::Join {
                    count: self.count(),
                    spaces: false,
                }
            }),
            Awaiting::Object { inner } => match TextObjectKind::from_key(ch) {
                Some(kind) => {
                    let object = TextObject { kind, inner };
                    Some(match self.pending_operator {
                        Some(op) => self.finish_operator(op, OperatorTarget::Object(object)),
                        None => Action::VisualObject {
                            object,
                            count: self.count(),
                        },
                    })
                }
                None => self.reject(Some(awaiting.lead()), key),
            },
            Awaiting::VisualReplace => Some(Action::VisualReplace(ch)),
            _ => self.reject(Some(awaiting.lead()), key),
        }
    }
}

fn insert_map(key: &KeyEvent) -> Option<Action> {
    if key.is_ctrl() {
        return None;
    }
    let edit = match key.code {
        KeyCode::Char(c) => EditKind::InsertChar(c),
        KeyCode::Enter => EditKind::Newline,
        KeyCode::Tab => EditKind::Tab,
        KeyCode::Backspace => EditKind::Backspace,
        KeyCode::Delete => EditKind::DeleteUnder,
        KeyCode::Left => EditKind::Move(Direction::Left),
        KeyCode::Right => EditKind::Move(Direction::Right),
        KeyCode::Up => EditKind::Move(Direction::Up),
        KeyCode::Down => EditKind::Move(Direction::Down),
        KeyCode::Esc => return Some(Action::Escape),
    };
    Some(Action::Edit(edit))
}

fn command_map(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::Escape),
        KeyCode::Enter => Some(Action::CommandSubmit),
        KeyCode::Backspace => Some(Action::CommandBackspace),
        KeyCode::Tab => Some(Action::CommandChar('\t')),
        _ => key.printable().map(Action::CommandChar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, KeyEvent, KeyModifiers};

    fn kc(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            mods: KeyModifiers::empty(),
        }
    }

    fn feed(tr: &mut KeyTranslator, mode: Mode, keys: &str) -> Vec<Action> {
        keys.chars()
            .filter_map(|c| tr.translate(mode, &kc(c)))
            .collect()
    }

    #[test]
    fn motion_with_count() {
        let mut tr = KeyTranslator::new();
        assert!(tr.translate(Mode::Normal, &kc('5')).is_none());
        match tr.translate(Mode::Normal, &kc('l')) {
            Some(Action::Motion {
                motion: MotionKind::Right,
                count: Some(5),
            }) => {}
            other => panic!("expected 5l got {:?}", other),
        }
        assert!(tr.is_idle());
    }

    #[test]
    fn counts_multiply_across_operator() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "2d3w").as_slice() {
            [Action::Operator {
                op: OperatorKind::Delete,
                target: OperatorTarget::Motion(MotionKind::WordForward),
                count: Some(6),
                register: None,
            }] => {}
            other => panic!("expected d6w got {:?}", other),
        }
    }

    #[test]
    fn leading_zero_is_line_start_even_after_operator() {
        let mut tr = KeyTranslator::new();
        match tr.translate(Mode::Normal, &kc('0')) {
            Some(Action::Motion {
                motion: MotionKind::LineStart,
                count: None,
            }) => {}
            other => panic!("expected 0 motion got {:?}", other),
        }
        match feed(&mut tr, Mode::Normal, "d0").as_slice() {
            [Action::Operator {
                target: OperatorTarget::Motion(MotionKind::LineStart),
                ..
            }] => {}
            other => panic!("expected d0 got {:?}", other),
        }
        match feed(&mut tr, Mode::Normal, "10j").as_slice() {
            [Action::Motion {
                motion: MotionKind::Down,
                count: Some(10),
            }] => {}
            other => panic!("expected 10j got {:?}", other),
        }
    }

    #[test]
    fn count_saturates_at_max() {
        let mut tr = KeyTranslator::with_max_count(50);
        match feed(&mut tr, Mode::Normal, "99999x").as_slice() {
            [Action::Operator { count: Some(50), .. }] => {}
            other => panic!("expected clamped count got {:?}", other),
        }
    }

    #[test]
    fn doubled_operator_is_linewise() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "3yy").as_slice() {
            [Action::Operator {
                op: OperatorKind::Yank,
                target: OperatorTarget::Lines,
                count: Some(3),
                ..
            }] => {}
            other => panic!("expected 3yy got {:?}", other),
        }
    }

    #[test]
    fn register_prefix_attaches_to_operator_and_put() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "\"adw").as_slice() {
            [Action::Operator {
                register: Some('a'),
                ..
            }] => {}
            other => panic!("expected register a got {:?}", other),
        }
        match feed(&mut tr, Mode::Normal, "\"b2p").as_slice() {
            [Action::Put {
                placement: PutPlacement::After,
                count: 2,
                register: Some('b'),
            }] => {}
            other => panic!("expected \"b2p got {:?}", other),
        }
    }

    #[test]
    fn invalid_register_drops_command() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "\"!").as_slice() {
            [Action::Rejected(EngineError::InvalidRegister('!'))] => {}
            other => panic!("expected invalid register got {:?}", other),
        }
        assert!(tr.is_idle());
        assert_eq!(tr.pending_keys(), "");
    }

    #[test]
    fn unmapped_key_after_operator_is_rejected() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "dq").as_slice() {
            [Action::Rejected(EngineError::UnresolvedOperator { operator: 'd', key })] => {
                assert_eq!(key, "q");
            }
            other => panic!("expected rejection got {:?}", other),
        }
        assert!(tr.is_idle());
    }

    #[test]
    fn escape_cancels_pending_operator_silently() {
        let mut tr = KeyTranslator::new();
        assert!(feed(&mut tr, Mode::Normal, "2d").is_empty());
        assert_eq!(tr.pending_keys(), "2d");
        assert!(tr.translate(Mode::Normal, &KeyEvent::named(KeyCode::Esc)).is_none());
        assert!(tr.is_idle());
        match tr.translate(Mode::Normal, &KeyEvent::named(KeyCode::Esc)) {
            Some(Action::Escape) => {}
            other => panic!("expected bare Escape got {:?}", other),
        }
    }

    #[test]
    fn shorthands_expand_to_operators() {
        let mut tr = KeyTranslator::new();
        let cases = [
            ('x', OperatorKind::Delete, OperatorTarget::Motion(MotionKind::Right)),
            ('X', OperatorKind::Delete, OperatorTarget::Motion(MotionKind::Left)),
            ('D', OperatorKind::Delete, OperatorTarget::Motion(MotionKind::LineEnd)),
            ('C', OperatorKind::Change, OperatorTarget::Motion(MotionKind::LineEnd)),
            ('s', OperatorKind::Change, OperatorTarget::Motion(MotionKind::Right)),
            ('S', OperatorKind::Change, OperatorTarget::Lines),
            ('Y', OperatorKind::Yank, OperatorTarget::Lines),
        ];
        for (key, op, target) in cases {
            match tr.translate(Mode::Normal, &kc(key)) {
                Some(Action::Operator {
                    op: o, target: t, ..
                }) if o == op && t == target => {}
                other => panic!("{key}: expected {op:?} {target:?} got {:?}", other),
            }
        }
    }

    #[test]
    fn find_and_mark_take_one_more_key() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "dt,").as_slice() {
            [Action::Operator {
                target: OperatorTarget::Motion(MotionKind::Find(FindSpec {
                    ch: ',',
                    forward: true,
                    till: true,
                })),
                ..
            }] => {}
            other => panic!("expected dt, got {:?}", other),
        }
        match feed(&mut tr, Mode::Normal, "'a").as_slice() {
            [Action::Motion {
                motion: MotionKind::MarkLine('a'),
                ..
            }] => {}
            other => panic!("expected 'a got {:?}", other),
        }
        match feed(&mut tr, Mode::Normal, "mz").as_slice() {
            [Action::SetMark('z')] => {}
            other => panic!("expected mz got {:?}", other),
        }
    }

    #[test]
    fn g_prefix() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "dgg").as_slice() {
            [Action::Operator {
                target: OperatorTarget::Motion(MotionKind::FileStart),
                ..
            }] => {}
            other => panic!("expected dgg got {:?}", other),
        }
        match feed(&mut tr, Mode::Normal, "3gJ").as_slice() {
            [Action::Join {
                count: 3,
                spaces: false,
            }] => {}
            other => panic!("expected 3gJ got {:?}", other),
        }
        match feed(&mut tr, Mode::Normal, "gq").as_slice() {
            [Action::Rejected(EngineError::UnresolvedOperator { operator: 'g', .. })] => {}
            other => panic!("expected gq rejection got {:?}", other),
        }
    }

    #[test]
    fn text_objects_after_operator_and_in_visual() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "ci\"").as_slice() {
            [Action::Operator {
                op: OperatorKind::Change,
                target: OperatorTarget::Object(TextObject {
                    kind: TextObjectKind::Quote('"'),
                    inner: true,
                }),
                ..
            }] => {}
            other => panic!("expected ci\" got {:?}", other),
        }
        match feed(&mut tr, Mode::Visual(VisualKind::Char), "2ap").as_slice() {
            [Action::VisualObject {
                object: TextObject {
                    kind: TextObjectKind::Paragraph,
                    inner: false,
                },
                count: 2,
            }] => {}
            other => panic!("expected v2ap got {:?}", other),
        }
    }

    #[test]
    fn visual_operators_and_motions() {
        let mut tr = KeyTranslator::new();
        let visual = Mode::Visual(VisualKind::Char);
        match feed(&mut tr, visual, "\"ad").as_slice() {
            [Action::VisualOperator {
                op: OperatorKind::Delete,
                extent: VisualExtent::Selection,
                register: Some('a'),
            }] => {}
            other => panic!("expected visual delete got {:?}", other),
        }
        match feed(&mut tr, visual, "Y").as_slice() {
            [Action::VisualOperator {
                op: OperatorKind::Yank,
                extent: VisualExtent::Lines,
                ..
            }] => {}
            other => panic!("expected visual Y got {:?}", other),
        }
        match feed(&mut tr, visual, "3w").as_slice() {
            [Action::Motion {
                motion: MotionKind::WordForward,
                count: Some(3),
            }] => {}
            other => panic!("expected 3w got {:?}", other),
        }
        match feed(&mut tr, visual, "rx").as_slice() {
            [Action::VisualReplace('x')] => {}
            other => panic!("expected rx got {:?}", other),
        }
    }

    #[test]
    fn replace_single_carries_count() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "3r").as_slice() {
            [Action::BeginReplaceSingle] => {}
            other => panic!("expected r got {:?}", other),
        }
        match tr.translate(Mode::ReplaceSingle, &kc('z')) {
            Some(Action::ReplaceChar { ch: 'z', count: 3 }) => {}
            other => panic!("expected 3rz got {:?}", other),
        }
        match tr.translate(Mode::ReplaceSingle, &KeyEvent::named(KeyCode::Enter)) {
            Some(Action::ReplaceChar { ch: '\n', count: 1 }) => {}
            other => panic!("expected r<CR> got {:?}", other),
        }
    }

    #[test]
    fn control_chords() {
        let mut tr = KeyTranslator::new();
        match tr.translate(Mode::Normal, &KeyEvent::ctrl('r')) {
            Some(Action::Redo { count: 1 }) => {}
            other => panic!("expected redo got {:?}", other),
        }
        match feed(&mut tr, Mode::Normal, "2").as_slice() {
            [] => {}
            other => panic!("expected pending count got {:?}", other),
        }
        match tr.translate(Mode::Normal, &KeyEvent::ctrl('o')) {
            Some(Action::JumpBack { count: 2 }) => {}
            other => panic!("expected 2<C-o> got {:?}", other),
        }
        match tr.translate(Mode::Normal, &KeyEvent::named(KeyCode::Tab)) {
            Some(Action::JumpForward { count: 1 }) => {}
            other => panic!("expected <Tab> jump got {:?}", other),
        }
        match tr.translate(Mode::Normal, &KeyEvent::ctrl('v')) {
            Some(Action::EnterVisual(VisualKind::Block)) => {}
            other => panic!("expected block visual got {:?}", other),
        }
    }

    #[test]
    fn insert_and_command_line_keys_map_directly() {
        let mut tr = KeyTranslator::new();
        let insert = Mode::Insert(InsertVariant::Insert);
        match tr.translate(insert, &kc('2')) {
            Some(Action::Edit(EditKind::InsertChar('2'))) => {}
            other => panic!("expected literal digit got {:?}", other),
        }
        match tr.translate(insert, &KeyEvent::named(KeyCode::Backspace)) {
            Some(Action::Edit(EditKind::Backspace)) => {}
            other => panic!("expected backspace got {:?}", other),
        }
        match tr.translate(Mode::CommandLine, &kc('d')) {
            Some(Action::CommandChar('d')) => {}
            other => panic!("expected command char got {:?}", other),
        }
        match tr.translate(Mode::CommandLine, &KeyEvent::named(KeyCode::Enter)) {
            Some(Action::CommandSubmit) => {}
            other => panic!("expected submit got {:?}", other),
        }
    }

    #[test]
    fn count_before_colon_is_forwarded() {
        let mut tr = KeyTranslator::new();
        match feed(&mut tr, Mode::Normal, "4:").as_slice() {
            [Action::CommandStart { count: Some(4) }] => {}
            other => panic!("expected 4: got {:?}", other),
        }
    }
}
