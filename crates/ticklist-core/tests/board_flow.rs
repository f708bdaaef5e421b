use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::Utc;
use ticklist_core::{Board, BoardError, DUPLICATE_ALERT, Overlay, RearmPolicy, Task, Toggle};

fn match_keys(board: &Board) -> HashSet<String> {
    board.tasks().iter().map(|t| Task::match_key(&t.text)).collect()
}

#[test]
fn buy_milk_scenario() {
    let t0 = Instant::now();
    let now = Utc::now();
    let mut board = Board::default();

    board.set_input("Buy milk");
    let id = board.submit(now).expect("submit").expect("new id");
    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.tasks()[0].text, "Buy milk");
    assert!(!board.tasks()[0].completed);
    assert_eq!(board.input(), "");

    board.set_input("buy milk");
    let err = board.submit(now).expect_err("duplicate should be rejected");
    assert_eq!(err.to_string(), DUPLICATE_ALERT);
    assert!(matches!(err, BoardError::DuplicateTask { ref text } if text == "buy milk"));
    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.input(), "buy milk");

    assert!(matches!(board.toggle(id, t0), Toggle::Completed(_)));
    assert!(board.tasks()[0].completed);
    assert!(board.overlay().is_visible());

    board.tick(t0 + Duration::from_secs(10));
    assert!(!board.overlay().is_visible());
}

#[test]
fn blank_submissions_never_change_the_list() {
    let now = Utc::now();
    let mut board = Board::default();
    board.add("one", now).expect("add");

    for blank in ["", " ", "\t\n", "   \u{3000}"] {
        board.set_input(blank);
        assert_eq!(board.submit(now).expect("blank is not an error"), None);
        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.input(), blank);
    }
}

#[test]
fn submission_trims_and_prepends() {
    let now = Utc::now();
    let mut board = Board::default();
    board.add("first", now).expect("add");
    board.add("   second task  ", now).expect("add");

    let texts: Vec<&str> = board.tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["second task", "first"]);
    assert!(board.tasks().iter().all(|t| !t.completed));
}

#[test]
fn list_never_holds_case_insensitive_duplicates() {
    let now = Utc::now();
    let mut board = Board::default();
    let inputs = [
        "Milk", "milk", " MILK ", "Eggs", "eggs ", "Straße", "STRASSE", "straße", "Éclair",
        "éclair", "buy  milk", "buy milk",
    ];

    for input in inputs {
        let _ = board.add(input, now);
        let keys = match_keys(&board);
        assert_eq!(keys.len(), board.tasks().len());
    }

    // internal whitespace is compared exactly
    assert!(board.tasks().iter().any(|t| t.text == "buy  milk"));
    assert!(board.tasks().iter().any(|t| t.text == "buy milk"));
}

#[test]
fn double_toggle_restores_list_but_keeps_one_countdown() {
    let t0 = Instant::now();
    let now = Utc::now();
    let mut board = Board::default();
    board.add("a", now).expect("add");
    let id = board.add("b", now).expect("add").expect("id");
    board.add("c", now).expect("add");
    let before = board.tasks().to_vec();

    assert!(matches!(board.toggle(id, t0), Toggle::Completed(_)));
    assert_eq!(board.toggle(id, t0), Toggle::Reopened);

    assert_eq!(board.tasks(), before.as_slice());
    assert_eq!(board.overlay().pending_count(), 1);
    assert!(board.overlay().is_visible());
}

#[test]
fn delete_removes_exactly_one_and_keeps_order() {
    let now = Utc::now();
    let mut board = Board::default();
    let a = board.add("a", now).expect("add").expect("id");
    let b = board.add("b", now).expect("add").expect("id");
    let c = board.add("c", now).expect("add").expect("id");

    let removed = board.delete(b).expect("present");
    assert_eq!(removed.text, "b");
    let ids: Vec<_> = board.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![c, a]);

    let before = board.tasks().to_vec();
    assert!(board.delete(b).is_none());
    assert_eq!(board.tasks(), before.as_slice());
}

#[test]
fn unknown_ids_are_silent_no_ops() {
    let t0 = Instant::now();
    let mut board = Board::default();
    let id = board.add("a", Utc::now()).expect("add").expect("id");
    board.delete(id);
    board.set_input("draft");

    assert_eq!(board.toggle(id, t0), Toggle::NotFound);
    assert!(!board.overlay().is_visible());
    assert_eq!(board.input(), "draft");
}

#[test]
fn delete_does_not_touch_overlay_or_input() {
    let t0 = Instant::now();
    let mut board = Board::default();
    let id = board.add("a", Utc::now()).expect("add").expect("id");
    board.toggle(id, t0);
    board.set_input("half typed");

    board.delete(id);
    assert!(board.overlay().is_visible());
    assert_eq!(board.overlay().pending_count(), 1);
    assert_eq!(board.input(), "half typed");
}

#[test]
fn default_board_stacks_hides_and_closes_overlay_early() {
    let t0 = Instant::now();
    let now = Utc::now();
    let mut board = Board::default();
    assert_eq!(board.overlay().policy(), RearmPolicy::Stack);
    let a = board.add("a", now).expect("add").expect("id");
    let b = board.add("b", now).expect("add").expect("id");

    board.toggle(a, t0);
    board.toggle(b, t0 + Duration::from_secs(6));
    assert_eq!(board.overlay().pending_count(), 2);
    board.tick(t0 + Duration::from_secs(10));
    assert!(!board.overlay().is_visible());
    assert_eq!(board.overlay().pending_count(), 1);
}

#[test]
fn replaced_hide_keeps_overlay_for_full_delay() {
    let t0 = Instant::now();
    let now = Utc::now();
    let mut board = Board::new(Overlay::new(Duration::from_secs(10), RearmPolicy::Replace));
    let a = board.add("a", now).expect("add").expect("id");
    let b = board.add("b", now).expect("add").expect("id");

    board.toggle(a, t0);
    board.toggle(b, t0 + Duration::from_secs(6));
    board.tick(t0 + Duration::from_secs(10));
    assert!(board.overlay().is_visible());
    board.tick(t0 + Duration::from_secs(16));
    assert!(!board.overlay().is_visible());
}
