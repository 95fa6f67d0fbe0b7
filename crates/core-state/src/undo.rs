//! Snapshot undo/redo over an arena.
//!
//! Snapshots (rope clone + cursor + content hash) live in a slot arena with a
//! free list; the undo and redo stacks hold `SnapshotId`s. Rope clones share
//! their chunks, so a snapshot costs roughly the edited chunks, not the document.

use crate::error::EngineError;
use core_text::{Buffer, Position};
use std::collections::VecDeque;
use tracing::trace;

/// Default bound on undo depth.
pub const UNDO_HISTORY_MAX: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(usize);

#[derive(Clone)]
struct Snapshot {
    buffer: Buffer,
    cursor: Position,
    hash: u64,
}

pub struct UndoEngine {
    slots: Vec<Option<Snapshot>>,
    free: Vec<usize>,
    undo_stack: VecDeque<SnapshotId>,
    redo_stack: Vec<SnapshotId>,
    max: usize,
    skipped: u64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_MAX)
    }
}

impl UndoEngine {
    pub fn new(max: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max: max.max(1),
            skipped: 0,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.skipped
    }
    /// Occupied arena slots (undo + redo entries).
    pub fn live_snapshots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
    pub fn arena_capacity(&self) -> usize {
        self.slots.len()
    }

    fn alloc(&mut self, snap: Snapshot) -> SnapshotId {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(snap);
                SnapshotId(idx)
            }
            None => {
                self.slots.push(Some(snap));
                SnapshotId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: SnapshotId) -> Option<Snapshot> {
        let snap = self.slots.get_mut(id.0).and_then(Option::take);
        if snap.is_some() {
            self.free.push(id.0);
        }
        snap
    }

    /// Record the state before a change. Identical consecutive states are skipped.
    /// A new change invalidates the redo history.
    pub fn push(&mut self, buffer: &Buffer, cursor: Position) {
        let hash = buffer.content_hash();
        let top = self
            .undo_stack
            .back()
            .and_then(|id| self.slots.get(id.0))
            .and_then(Option::as_ref);
        if top.is_some_and(|s| s.hash == hash) {
            self.skipped += 1;
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), hash, "snapshot_dedupe_skip");
            self.clear_redo();
            return;
        }
        let id = self.alloc(Snapshot {
            buffer: buffer.clone(),
            cursor,
            hash,
        });
        self.undo_stack.push_back(id);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), slot = id.0, lines = buffer.line_count(), "push_snapshot");
        if self.undo_stack.len() > self.max
            && let Some(oldest) = self.undo_stack.pop_front()
        {
            self.release(oldest);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        self.clear_redo();
    }

    fn clear_redo(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }
        for id in std::mem::take(&mut self.redo_stack) {
            self.release(id);
        }
        trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
    }

    /// Restore the most recent snapshot; the current state moves to the redo stack.
    pub fn undo(&mut self, buffer: &mut Buffer, cursor: &mut Position) -> Result<(), EngineError> {
        let id = self.undo_stack.pop_back().ok_or(EngineError::EmptyUndoStack)?;
        let snap = self.release(id).ok_or(EngineError::EmptyUndoStack)?;
        let current = self.alloc(Snapshot {
            hash: buffer.content_hash(),
            buffer: std::mem::replace(buffer, snap.buffer),
            cursor: std::mem::replace(cursor, snap.cursor),
        });
        self.redo_stack.push(current);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        Ok(())
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self, buffer: &mut Buffer, cursor: &mut Position) -> Result<(), EngineError> {
        let id = self.redo_stack.pop().ok_or(EngineError::EmptyRedoStack)?;
        let snap = self.release(id).ok_or(EngineError::EmptyRedoStack)?;
        let current = self.alloc(Snapshot {
            hash: buffer.content_hash(),
            buffer: std::mem::replace(buffer, snap.buffer),
            cursor: std::mem::replace(cursor, snap.cursor),
        });
        self.undo_stack.push_back(current);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        Ok(())
    }
}
