mod common;
use common::*;

use core_state::{EngineError, InsertVariant, Mode};
use pretty_assertions::assert_eq;

#[test]
fn dw_on_last_word_stays_on_its_line() {
    let e = run(&["foo bar", "baz"], "wdw");
    assert_eq!(e.lines(), vec!["foo ", "baz"]);
    assert_eq!(e.cursor(), pos(0, 3));
}

#[test]
fn dj_deletes_two_lines_and_fails_on_last() {
    let e = run(&["a", "b", "c"], "dj");
    assert_eq!(e.lines(), vec!["c"]);

    let mut e = engine(&["a", "b"]);
    let r = feed_last(&mut e, "jdj");
    assert_eq!(r.notice, Some(EngineError::MotionFailed));
    assert_eq!(e.lines(), vec!["a", "b"]);
}

#[test]
fn d_to_file_ends() {
    assert_eq!(run(&["a", "b", "c"], "jdG").lines(), vec!["a"]);
    assert_eq!(run(&["a", "b", "c"], "jdgg").lines(), vec!["c"]);
    assert_eq!(run(&["a", "b", "c", "d"], "d2G").lines(), vec!["c", "d"]);
}

#[test]
fn shorthand_deletes() {
    let e = run(&["hello world"], "wD");
    assert_eq!(e.lines(), vec!["hello "]);
    assert_eq!(e.cursor(), pos(0, 5));
    assert_eq!(run(&["abcd"], "$X").lines(), vec!["abd"]);
    assert_eq!(run(&["abcd"], "l2x").lines(), vec!["ad"]);
}

#[test]
fn find_motions_under_operators() {
    assert_eq!(run(&["abcxdef"], "dfx").lines(), vec!["def"]);
    assert_eq!(run(&["abcxdef"], "dtx").lines(), vec!["xdef"]);
    assert_eq!(run(&["a.b.c.d"], "f.;d,").lines(), vec!["a.c.d"]);
    assert_eq!(run(&["abcxdef"], "$dFx").lines(), vec!["abcf"]);
}

#[test]
fn change_word_and_line() {
    let e = run(&["foo bar baz"], "wcwX<Esc>");
    assert_eq!(e.lines(), vec!["foo X baz"]);
    assert_eq!(e.cursor(), pos(0, 4));

    let e = run(&["  indented", "next"], "ccnew<Esc>");
    assert_eq!(e.lines(), vec!["new", "next"]);

    let mut e = engine(&["abc"]);
    feed(&mut e, "lC");
    assert_eq!(e.mode(), Mode::Insert(InsertVariant::Change));
    assert_eq!(e.lines(), vec!["a"]);
    assert_eq!(e.cursor(), pos(0, 1));
}

#[test]
fn text_objects_under_operators() {
    assert_eq!(run(&["foo bar baz"], "wdiw").lines(), vec!["foo  baz"]);
    assert_eq!(run(&["foo bar baz"], "wdaw").lines(), vec!["foo baz"]);
    assert_eq!(run(&["f(a, b) c"], "2ldi(").lines(), vec!["f() c"]);
    assert_eq!(run(&["f(a, b) c"], "2lda(").lines(), vec!["f c"]);
    assert_eq!(run(&["say \"hi\" now"], "fhda\"").lines(), vec!["say now"]);
    assert_eq!(run(&["say \"hi\" now"], "fhci\"yo<Esc>").lines(), vec!["say \"yo\" now"]);
    assert_eq!(run(&["a", "b", "", "c"], "dip").lines(), vec!["", "c"]);
    assert_eq!(run(&["a", "b", "", "c"], "dap").lines(), vec!["c"]);
}

#[test]
fn braces_spanning_lines_are_linewise() {
    let e = run(&["fn x() {", "    body();", "}"], "jdi{");
    assert_eq!(e.lines(), vec!["fn x() {", "}"]);
    assert_eq!(register_text(&e, '"'), "    body();\n");
}

#[test]
fn yank_does_not_touch_buffer() {
    let mut e = engine(&["one two", "three"]);
    let results = feed(&mut e, "wyw");
    assert!(results.iter().all(|r| !r.buffer_changed));
    assert_eq!(register_text(&e, '0'), "two");
    assert_eq!(e.cursor(), pos(0, 4));
    feed(&mut e, "yj");
    assert_eq!(register_text(&e, '0'), "one two\nthree\n");
}

#[test]
fn unmappable_key_drops_operator() {
    let mut e = engine(&["abc"]);
    let r = feed_last(&mut e, "dz");
    assert!(matches!(r.notice, Some(EngineError::UnresolvedOperator { operator: 'd', .. })));
    assert_eq!(e.pending_keys(), "");
    feed(&mut e, "l");
    assert_eq!(e.cursor(), pos(0, 1));
    assert_eq!(e.lines(), vec!["abc"]);
}

#[test]
fn exclusive_motion_ending_in_column_zero() {
    let e = run(&["a b", "", "c"], "d}");
    assert_eq!(e.lines(), vec!["", "c"]);
    let e = run(&["ab cd", "", "ef"], "ld}");
    assert_eq!(e.lines(), vec!["a", "", "ef"]);
}
