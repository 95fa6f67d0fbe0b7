mod common;
use common::*;

use core_state::{Mode, RegisterKind, SelectionRange, VisualKind};
use pretty_assertions::assert_eq;

#[test]
fn linewise_delete() {
    let e = run(&["a", "b", "c"], "Vjd");
    assert_eq!(e.lines(), vec!["c"]);
    assert_eq!(register_text(&e, '1'), "a\nb\n");
}

#[test]
fn charwise_yank_across_lines() {
    let mut e = engine(&["abc", "def"]);
    feed(&mut e, "lvj");
    assert_eq!(
        e.selection(),
        Some(SelectionRange::Chars {
            start: pos(0, 1),
            end: pos(1, 2)
        })
    );
    feed(&mut e, "y");
    assert_eq!(register_text(&e, '0'), "bc\nde");
    assert_eq!(e.cursor(), pos(0, 1));
    assert_eq!(e.mode(), Mode::Normal);
}

#[test]
fn blockwise_delete_and_yank() {
    let e = run(&["abcd", "efgh", "ijkl"], "l<C-v>jld");
    assert_eq!(e.lines(), vec!["ad", "eh", "ijkl"]);
    assert_eq!(e.cursor(), pos(0, 1));

    let e = run(&["abcd", "efgh"], "l<C-v>jy");
    let reg = e.registers().get(None).unwrap();
    assert_eq!(reg.text, "b\nf");
    assert_eq!(reg.kind, RegisterKind::BlockWise { width: 1 });
}

#[test]
fn block_to_line_end_and_put() {
    let e = run(&["abcd", "efgh"], "l<C-v>jD");
    assert_eq!(e.lines(), vec!["a", "e"]);

    let e = run(&["abcd", "efgh"], "<C-v>jy$p");
    assert_eq!(e.lines(), vec!["abcda", "efghe"]);
}

#[test]
fn swap_ends_then_extend() {
    let e = run(&["abcdef"], "lvllohd");
    assert_eq!(e.lines(), vec!["ef"]);
}

#[test]
fn change_selection_enters_insert() {
    let e = run(&["foo bar"], "wviwcX<Esc>");
    assert_eq!(e.lines(), vec!["foo X"]);
    assert_eq!(e.mode(), Mode::Normal);
}

#[test]
fn replace_and_join_selection() {
    assert_eq!(run(&["abc"], "vlrx").lines(), vec!["xxc"]);
    assert_eq!(run(&["a", "b", "c"], "VjjJ").lines(), vec!["a b c"]);
}

#[test]
fn put_over_selection_swaps_unnamed() {
    let e = run(&["one two"], "yiwwviwp");
    assert_eq!(e.lines(), vec!["one one"]);
    assert_eq!(register_text(&e, '"'), "two");
    assert_eq!(register_text(&e, '0'), "one");
}

#[test]
fn kind_switches_and_exit() {
    let mut e = engine(&["abc", "def"]);
    feed(&mut e, "vj");
    feed(&mut e, "V");
    assert_eq!(e.mode(), Mode::Visual(VisualKind::Line));
    assert_eq!(e.selection(), Some(SelectionRange::Lines { first: 0, last: 1 }));
    feed(&mut e, "V");
    assert_eq!(e.mode(), Mode::Normal);
    assert_eq!(e.selection(), None);

    let r = feed(&mut e, "v<Esc>");
    assert!(r.iter().all(|r| !r.buffer_changed));
    assert_eq!(e.mode(), Mode::Normal);
}

#[test]
fn linewise_forms_of_charwise_selection() {
    assert_eq!(run(&["abc", "def"], "lvD").lines(), vec!["def"]);
    let e = run(&["abc", "def"], "lvY");
    assert_eq!(register_text(&e, '0'), "abc\n");
}

#[test]
fn objects_extend_selection() {
    let mut e = engine(&["x (a b) y"]);
    feed(&mut e, "fava(");
    assert_eq!(
        e.selection(),
        Some(SelectionRange::Chars {
            start: pos(0, 2),
            end: pos(0, 7)
        })
    );
    feed(&mut e, "d");
    assert_eq!(e.lines(), vec!["x  y"]);
}

#[test]
fn undo_returns_cursor_to_selection_start() {
    let doc = &["hello world foo", "  foo(bar, \"baz\") qux.", "x"];
    for keys in ["vjd", "Vjd", "<C-v>jld", "vjc1<Esc>", "vjJ", "vjrQ"] {
        let mut e = engine(doc);
        feed(&mut e, "ww");
        assert_eq!(e.cursor(), pos(0, 12));
        feed(&mut e, keys);
        assert_ne!(e.lines(), doc.to_vec(), "{keys} changed nothing");
        feed(&mut e, "u");
        assert_eq!(e.lines(), doc.to_vec(), "{keys}");
        assert_eq!(e.cursor(), pos(0, 12), "{keys}");
        assert_eq!(e.mode(), Mode::Normal);
    }
}
