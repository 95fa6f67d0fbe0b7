mod common;
use common::*;

use core_actions::{ExCommand, LineRange};
use core_state::{EngineError, Mode};
use pretty_assertions::assert_eq;
use regex::Regex;

#[test]
fn typed_line_is_handed_to_the_host() {
    let mut e = engine(&["abc"]);
    feed(&mut e, ":s/a/b");
    assert_eq!(e.mode(), Mode::CommandLine);
    assert_eq!(e.command_line().content(), "s/a/b");
    let r = feed_last(&mut e, "<CR>");
    assert_eq!(r.command_line.as_deref(), Some("s/a/b"));
    assert!(!r.buffer_changed);
    assert_eq!(e.mode(), Mode::Normal);
    assert_eq!(e.lines(), vec!["abc"]);
}

#[test]
fn count_prefills_a_range() {
    let mut e = engine(&["abc"]);
    feed(&mut e, "4:");
    assert_eq!(e.command_line().content(), ".,.+3");
    feed(&mut e, "<Esc>");
    assert_eq!(e.mode(), Mode::Normal);
    assert!(!e.command_line().is_active());
}

#[test]
fn backspace_on_empty_line_cancels() {
    let mut e = engine(&["abc"]);
    feed(&mut e, ":x<BS>");
    assert_eq!(e.mode(), Mode::CommandLine);
    feed(&mut e, "<BS>");
    assert_eq!(e.mode(), Mode::Normal);
}

#[test]
fn ex_delete_and_substitute() {
    let mut e = engine(&["one", "two", "three", "four"]);
    let r = e.execute_ex(&ExCommand::Delete {
        range: LineRange::new(2, 1),
        register: Some('d'),
    });
    assert!(r.buffer_changed);
    assert_eq!(e.lines(), vec!["one", "four"]);
    assert_eq!(register_text(&e, 'd'), "two\nthree\n");

    e.execute_ex(&ExCommand::Substitute {
        range: LineRange::new(0, 99),
        pattern: Regex::new("o").unwrap(),
        replacement: "0".to_string(),
        global: true,
    });
    assert_eq!(e.lines(), vec!["0ne", "f0ur"]);
    assert_eq!(e.cursor(), pos(1, 0));
    feed(&mut e, "u");
    assert_eq!(e.lines(), vec!["one", "four"]);
}

#[test]
fn ex_goto_is_a_jump() {
    let mut e = engine(&["a", "b", "c"]);
    e.execute_ex(&ExCommand::GotoLine(2));
    assert_eq!(e.cursor(), pos(2, 0));
    feed(&mut e, "<C-o>");
    assert_eq!(e.cursor(), pos(0, 0));
}

#[test]
fn ex_discards_pending_keys_and_requires_normal_mode() {
    let mut e = engine(&["a", "b"]);
    feed(&mut e, "2d");
    e.execute_ex(&ExCommand::Join {
        range: LineRange::new(0, 1),
    });
    assert_eq!(e.pending_keys(), "");
    assert_eq!(e.lines(), vec!["a b"]);

    feed(&mut e, "i");
    let r = e.execute_ex(&ExCommand::SetMark { name: 'a', row: 0 });
    assert!(matches!(r.notice, Some(EngineError::InvalidTransition { .. })));
}
