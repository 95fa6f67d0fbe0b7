#![allow(dead_code)] // Shared across integration test binaries; each uses a subset.

use core_actions::{DispatchResult, Engine};
use core_events::parse_keys;
use core_text::Position;

pub fn engine(lines: &[&str]) -> Engine {
    Engine::from_lines(lines)
}

/// Feed a key script in vi notation (`"d2w"`, `"ifoo<Esc>"`).
pub fn feed(engine: &mut Engine, keys: &str) -> Vec<DispatchResult> {
    let keys = parse_keys(keys).expect("valid key notation");
    engine.handle_keys(&keys)
}

/// Result of the final key of a script.
pub fn feed_last(engine: &mut Engine, keys: &str) -> DispatchResult {
    feed(engine, keys).pop().unwrap_or_default()
}

/// Run a script on a fresh engine and return it.
pub fn run(lines: &[&str], keys: &str) -> Engine {
    let mut e = engine(lines);
    feed(&mut e, keys);
    e
}

pub fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

pub fn register_text(engine: &Engine, name: char) -> String {
    engine
        .registers()
        .get(Some(name))
        .map(|c| c.text)
        .unwrap_or_default()
}
