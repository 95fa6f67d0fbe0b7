//! Register storage.
//!
//! Slots: unnamed `"`, last yank `0`, delete ring `1`-`9`, small delete `-`,
//! named `a`-`z` (uppercase appends), black hole `_` and the read-only `.`
//! holding the text of the last insert session. Writes are last-writer-wins.

use crate::error::EngineError;
use std::collections::VecDeque;
use tracing::trace;

/// Number of slots in the numbered delete ring (`1`-`9`).
pub const DELETE_RING_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    CharWise,
    /// Text is one `\n`-terminated entry per line.
    LineWise,
    /// Rows joined by `\n`; `width` is the rectangle width in display columns.
    BlockWise { width: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterContent {
    pub text: String,
    pub kind: RegisterKind,
}

impl RegisterContent {
    pub fn charwise(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: RegisterKind::CharWise,
        }
    }

    pub fn linewise<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        Self {
            text,
            kind: RegisterKind::LineWise,
        }
    }

    pub fn blockwise<S: AsRef<str>>(rows: &[S], width: usize) -> Self {
        let text = rows
            .iter()
            .map(|r| r.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            text,
            kind: RegisterKind::BlockWise { width },
        }
    }

    pub fn empty() -> Self {
        Self::charwise(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Payload split into lines. Line-wise payloads drop their final terminator.
    pub fn lines(&self) -> Vec<String> {
        let body = match self.kind {
            RegisterKind::LineWise => self.text.strip_suffix('\n').unwrap_or(&self.text),
            _ => self.text.as_str(),
        };
        body.split('\n').map(str::to_string).collect()
    }

    /// True when a delete of this payload belongs in the small delete register.
    fn is_small(&self) -> bool {
        self.kind == RegisterKind::CharWise && !self.text.contains('\n')
    }

    fn append(&mut self, other: &RegisterContent) {
        match (self.kind, other.kind) {
            (RegisterKind::CharWise, RegisterKind::CharWise) => self.text.push_str(&other.text),
            (RegisterKind::LineWise, RegisterKind::LineWise) => self.text.push_str(&other.text),
            (RegisterKind::CharWise, RegisterKind::LineWise) => {
                self.text.push('\n');
                self.text.push_str(&other.text);
                self.kind = RegisterKind::LineWise;
            }
            (RegisterKind::LineWise, _) => {
                self.text.push_str(&other.text);
                self.text.push('\n');
            }
            (RegisterKind::BlockWise { width: a }, kind) => {
                let b = match kind {
                    RegisterKind::BlockWise { width } => width,
                    _ => 0,
                };
                self.text.push('\n');
                self.text.push_str(other.text.trim_end_matches('\n'));
                self.kind = RegisterKind::BlockWise { width: a.max(b) };
            }
            (RegisterKind::CharWise, RegisterKind::BlockWise { .. }) => {
                self.text.push('\n');
                self.text.push_str(&other.text);
            }
        }
    }
}

/// Resolved destination of a register name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unnamed,
    Yank,
    Numbered(usize),
    SmallDelete,
    Named { index: usize, append: bool },
    BlackHole,
    LastInsert,
}

fn slot_for(name: char) -> Result<Slot, EngineError> {
    Ok(match name {
        '"' => Slot::Unnamed,
        '0' => Slot::Yank,
        '1'..='9' => Slot::Numbered(name as usize - '1' as usize),
        '-' => Slot::SmallDelete,
        'a'..='z' => Slot::Named {
            index: name as usize - 'a' as usize,
            append: false,
        },
        'A'..='Z' => Slot::Named {
            index: name as usize - 'A' as usize,
            append: true,
        },
        '_' => Slot::BlackHole,
        '.' => Slot::LastInsert,
        other => return Err(EngineError::InvalidRegister(other)),
    })
}

/// True for every name accepted after a `"` prefix.
pub fn is_valid_name(name: char) -> bool {
    slot_for(name).is_ok()
}

#[derive(Debug, Clone)]
pub struct Registers {
    unnamed: Option<RegisterContent>,
    yank: Option<RegisterContent>,
    numbered: VecDeque<RegisterContent>,
    small_delete: Option<RegisterContent>,
    named: [Option<RegisterContent>; 26],
    last_insert: String,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            unnamed: None,
            yank: None,
            numbered: VecDeque::with_capacity(DELETE_RING_LEN),
            small_delete: None,
            named: std::array::from_fn(|_| None),
            last_insert: String::new(),
        }
    }

    /// Record a yank. Without a target the payload lands in `0`; the unnamed
    /// register always mirrors it.
    pub fn yank(&mut self, target: Option<char>, content: RegisterContent) -> Result<(), EngineError> {
        let slot = match target {
            None => Slot::Yank,
            Some(name) => slot_for(name)?,
        };
        match slot {
            Slot::BlackHole => return Ok(()),
            Slot::LastInsert => return Err(EngineError::InvalidRegister('.')),
            Slot::Unnamed | Slot::Yank => self.yank = Some(content.clone()),
            _ => {}
        }
        let stored = self.store(slot, content);
        trace!(target: "state.registers", ?target, kind = ?stored.kind, len = stored.text.len(), "yank");
        self.unnamed = Some(stored);
        Ok(())
    }

    /// Record a delete or change. Without a named target, multi-line payloads
    /// shift the numbered ring and single-line ones go to `-`.
    pub fn delete(&mut self, target: Option<char>, content: RegisterContent) -> Result<(), EngineError> {
        let slot = match target {
            None | Some('"') => None,
            Some(name) => Some(slot_for(name)?),
        };
        let stored = match slot {
            Some(Slot::BlackHole) => return Ok(()),
            Some(Slot::LastInsert) => return Err(EngineError::InvalidRegister('.')),
            Some(slot) => self.store(slot, content),
            None if content.is_small() => self.store(Slot::SmallDelete, content),
            None => self.shift_ring(content),
        };
        trace!(target: "state.registers", ?target, kind = ?stored.kind, len = stored.text.len(), ring = self.numbered.len(), "delete");
        self.unnamed = Some(stored);
        Ok(())
    }

    fn shift_ring(&mut self, content: RegisterContent) -> RegisterContent {
        if self.numbered.len() == DELETE_RING_LEN {
            self.numbered.pop_back();
        }
        self.numbered.push_front(content.clone());
        content
    }

    fn store(&mut self, slot: Slot, content: RegisterContent) -> RegisterContent {
        match slot {
            Slot::Unnamed | Slot::BlackHole | Slot::LastInsert => content,
            Slot::Yank => {
                self.yank = Some(content.clone());
                content
            }
            Slot::SmallDelete => {
                self.small_delete = Some(content.clone());
                content
            }
            Slot::Numbered(idx) => {
                while self.numbered.len() <= idx {
                    self.numbered.push_back(RegisterContent::empty());
                }
                self.numbered[idx] = content.clone();
                content
            }
            Slot::Named { index, append } => {
                let merged = match (&mut self.named[index], append) {
                    (Some(existing), true) if !existing.is_empty() => {
                        existing.append(&content);
                        existing.clone()
                    }
                    _ => content,
                };
                self.named[index] = Some(merged.clone());
                merged
            }
        }
    }

    /// Read a register. Missing slots read as empty content; only malformed names fail.
    pub fn get(&self, name: Option<char>) -> Result<RegisterContent, EngineError> {
        let slot = match name {
            None => Slot::Unnamed,
            Some(name) => slot_for(name)?,
        };
        let found = match slot {
            Slot::Unnamed => self.unnamed.clone(),
            Slot::Yank => self.yank.clone(),
            Slot::Numbered(idx) => self.numbered.get(idx).cloned(),
            Slot::SmallDelete => self.small_delete.clone(),
            Slot::Named { index, .. } => self.named[index].clone(),
            Slot::BlackHole => None,
            Slot::LastInsert => Some(RegisterContent::charwise(self.last_insert.clone())),
        };
        Ok(found.unwrap_or_else(RegisterContent::empty))
    }

    pub fn unnamed(&self) -> Option<&RegisterContent> {
        self.unnamed.as_ref()
    }

    /// Numbered ring, `1` first.
    pub fn numbered(&self) -> impl Iterator<Item = &RegisterContent> {
        self.numbered.iter()
    }

    pub fn set_last_insert(&mut self, text: impl Into<String>) {
        self.last_insert = text.into();
    }

    pub fn last_insert(&self) -> &str {
        &self.last_insert
    }

    /// Non-empty named registers, for a `:registers` style listing.
    pub fn named_snapshot(&self) -> Vec<(char, &RegisterContent)> {
        self.named
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref()
                    .filter(|c| !c.is_empty())
                    .map(|c| ((b'a' + i as u8) as char, c))
            })
            .collect()
    }
}
