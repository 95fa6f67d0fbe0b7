//! `Engine`: one buffer, one key translator, one dispatch loop.

use crate::dispatcher::{self, DispatchResult, EditorContext};
use crate::ex::{self, ExCommand};
use crate::key_translator::KeyTranslator;
use core_config::EngineConfig;
use core_events::KeyEvent;
use core_state::{CommandLineState, Mode, Registers, SelectionRange, TextBuffer};
use core_text::{Buffer, Position};
use tracing::{debug, trace};

/// Owns the editor state and feeds it keys one at a time. Each key is fully
/// processed before `handle_key` returns.
pub struct Engine {
    ctx: EditorContext,
    translator: KeyTranslator,
}

impl Engine {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(lines, EngineConfig::default())
    }

    pub fn with_config<I, S>(lines: I, config: EngineConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let buffer = Buffer::from_lines(lines);
        debug!(target: "runtime", lines = buffer.line_count(), ?config, "engine_created");
        Self {
            ctx: EditorContext::new(buffer, config),
            translator: KeyTranslator::with_max_count(config.max_count),
        }
    }

    /// Process one key.
    pub fn handle_key(&mut self, key: &KeyEvent) -> DispatchResult {
        let pending_before = self.translator.pending_keys().to_string();
        let action = self.translator.translate(self.ctx.mode(), key);
        let pending_changed = pending_before != self.translator.pending_keys();
        let mut result = match action {
            Some(action) => dispatcher::dispatch(action, &mut self.ctx),
            None => DispatchResult::clean(),
        };
        result.dirty |= pending_changed;
        trace!(target: "runtime", ?key, dirty = result.dirty, changed = result.buffer_changed, "key_processed");
        result
    }

    /// Process a key sequence, returning each key's result.
    pub fn handle_keys<'a, I>(&mut self, keys: I) -> Vec<DispatchResult>
    where
        I: IntoIterator<Item = &'a KeyEvent>,
    {
        keys.into_iter().map(|k| self.handle_key(k)).collect()
    }

    /// Apply a pre-parsed ex command. Pending keys are discarded first.
    pub fn execute_ex(&mut self, cmd: &ExCommand) -> DispatchResult {
        self.translator.reset();
        ex::execute(cmd, &mut self.ctx)
    }

    pub fn lines(&self) -> Vec<String> {
        self.ctx.text.lines()
    }

    pub fn cursor(&self) -> Position {
        self.ctx.text.cursor()
    }

    pub fn mode(&self) -> Mode {
        self.ctx.mode()
    }

    /// The resolved selection while in Visual mode.
    pub fn selection(&self) -> Option<SelectionRange> {
        if !self.mode().is_visual() {
            return None;
        }
        self.ctx.selection.map(|s| s.resolve(self.ctx.text.buffer()))
    }

    /// Partially typed command, for a "showcmd" area.
    pub fn pending_keys(&self) -> &str {
        self.translator.pending_keys()
    }

    pub fn registers(&self) -> &Registers {
        &self.ctx.registers
    }

    /// Recent modes, oldest first.
    pub fn mode_history(&self) -> Vec<Mode> {
        self.ctx.modes.history().copied().collect()
    }

    pub fn command_line(&self) -> &CommandLineState {
        &self.ctx.command_line
    }

    pub fn text(&self) -> &TextBuffer {
        &self.ctx.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::parse_keys;
    use pretty_assertions::assert_eq;

    fn run(engine: &mut Engine, keys: &str) -> Vec<DispatchResult> {
        let keys = parse_keys(keys).unwrap();
        engine.handle_keys(&keys)
    }

    #[test]
    fn pending_keys_mark_dirty_without_buffer_change() {
        let mut e = Engine::from_lines(["one two three"]);
        let r = run(&mut e, "2d");
        assert!(r.iter().all(|r| r.dirty && !r.buffer_changed));
        assert_eq!(e.pending_keys(), "2d");
        let r = run(&mut e, "w");
        assert!(r[0].buffer_changed);
        assert_eq!(e.pending_keys(), "");
        assert_eq!(e.lines(), vec!["three"]);
    }

    #[test]
    fn selection_only_in_visual() {
        let mut e = Engine::from_lines(["abc"]);
        assert_eq!(e.selection(), None);
        run(&mut e, "vl");
        assert_eq!(
            e.selection(),
            Some(SelectionRange::Chars {
                start: Position::new(0, 0),
                end: Position::new(0, 2)
            })
        );
        run(&mut e, "<Esc>");
        assert_eq!(e.selection(), None);
        assert_eq!(
            e.mode_history(),
            vec![Mode::Normal, Mode::Visual(core_state::VisualKind::Char)]
        );
    }

    #[test]
    fn submitted_line_is_handed_back() {
        let mut e = Engine::from_lines(["abc"]);
        let r = run(&mut e, ":w<CR>");
        assert_eq!(r.last().and_then(|r| r.command_line.clone()), Some("w".to_string()));
        assert_eq!(e.mode(), Mode::Normal);
    }
}
