mod common;
use common::*;

use core_state::EngineError;
use pretty_assertions::assert_eq;

#[test]
fn undo_and_redo_are_noops_at_the_ends() {
    let mut e = engine(&["abc"]);
    assert_eq!(feed_last(&mut e, "u").notice, Some(EngineError::EmptyUndoStack));
    assert_eq!(feed_last(&mut e, "<C-r>").notice, Some(EngineError::EmptyRedoStack));
    assert_eq!(e.lines(), vec!["abc"]);
}

#[test]
fn insert_session_is_one_undo_unit() {
    let mut e = engine(&[""]);
    feed(&mut e, "ifoo<CR>bar<Esc>");
    assert_eq!(e.lines(), vec!["foo", "bar"]);
    feed(&mut e, "u");
    assert_eq!(e.lines(), vec![""]);
    feed(&mut e, "<C-r>");
    assert_eq!(e.lines(), vec!["foo", "bar"]);
}

#[test]
fn counted_undo_and_redo() {
    let mut e = engine(&["abcdef"]);
    feed(&mut e, "xxx");
    feed(&mut e, "2u");
    assert_eq!(e.lines(), vec!["bcdef"]);
    feed(&mut e, "5<C-r>");
    assert_eq!(e.lines(), vec!["def"]);
}

#[test]
fn new_change_clears_redo() {
    let mut e = engine(&["abc"]);
    feed(&mut e, "xux");
    assert_eq!(feed_last(&mut e, "<C-r>").notice, Some(EngineError::EmptyRedoStack));
}

#[test]
fn change_with_insert_is_one_unit_and_repeats() {
    let mut e = engine(&["foo bar baz"]);
    feed(&mut e, "cwX<Esc>");
    feed(&mut e, "w.");
    assert_eq!(e.lines(), vec!["X X baz"]);
    feed(&mut e, "u");
    assert_eq!(e.lines(), vec!["X bar baz"]);
    feed(&mut e, "u");
    assert_eq!(e.lines(), vec!["foo bar baz"]);
}

#[test]
fn nothing_to_repeat() {
    let mut e = engine(&["abc"]);
    assert_eq!(feed_last(&mut e, ".").notice, Some(EngineError::NoPreviousChange));
    feed(&mut e, "yyjmaG");
    assert_eq!(feed_last(&mut e, ".").notice, Some(EngineError::NoPreviousChange));
}

#[test]
fn count_on_dot_replaces_recorded_count() {
    let mut e = engine(&["a", "b", "c", "d", "e", "f"]);
    feed(&mut e, "2dd");
    assert_eq!(e.lines(), vec!["c", "d", "e", "f"]);
    feed(&mut e, "3.");
    assert_eq!(e.lines(), vec!["f"]);
}

#[test]
fn dot_repeats_appends_and_puts() {
    let e = run(&["a", "b"], "A;<Esc>j.");
    assert_eq!(e.lines(), vec!["a;", "b;"]);

    let e = run(&["x", "y"], "yyp.");
    assert_eq!(e.lines(), vec!["x", "x", "x", "y"]);

    let e = run(&["a", "b", "c", "d"], "J.");
    assert_eq!(e.lines(), vec!["a b c", "d"]);
}

#[test]
fn dot_repeats_visual_delete_over_same_extent() {
    let e = run(&["abcdef"], "vld.");
    assert_eq!(e.lines(), vec!["ef"]);

    let e = run(&["a", "b", "c", "d", "e"], "Vjd.");
    assert_eq!(e.lines(), vec!["e"]);
}

#[test]
fn dot_repeats_replace_mode_and_r() {
    let e = run(&["abcd", "efgh"], "Rxy<Esc>j0.");
    assert_eq!(e.lines(), vec!["xycd", "xygh"]);

    let e = run(&["abcd"], "2rzl.");
    assert_eq!(e.lines(), vec!["zzzz"]);
}

#[test]
fn dot_after_text_object_change() {
    let e = run(&["(a) (b)"], "lci(x<Esc>f(l.");
    assert_eq!(e.lines(), vec!["(x) (x)"]);
}

#[test]
fn replay_is_one_undo_unit() {
    let mut e = engine(&[""]);
    feed(&mut e, "3ia<Esc>");
    feed(&mut e, ".");
    assert_eq!(e.lines(), vec!["aaaaaa"]);
    feed(&mut e, "u");
    assert_eq!(e.lines(), vec!["aaa"]);
}
