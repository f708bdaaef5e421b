use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ticklist_core::{DUPLICATE_ALERT, OverlaySettings};
use ticklist_tui::App;

fn press(app: &mut App, code: KeyCode, now: Instant) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now);
}

fn ctrl(app: &mut App, ch: char, now: Instant) {
    app.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL), now);
}

fn type_text(app: &mut App, text: &str, now: Instant) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch), now);
    }
}

#[test]
fn typing_and_enter_adds_newest_first() {
    let now = Instant::now();
    let mut app = App::new(OverlaySettings::default());

    type_text(&mut app, "Buy milk", now);
    assert_eq!(app.board().input(), "Buy milk");
    press(&mut app, KeyCode::Enter, now);

    type_text(&mut app, "Walk dogg", now);
    press(&mut app, KeyCode::Backspace, now);
    press(&mut app, KeyCode::Enter, now);

    let texts: Vec<&str> = app.board().tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Walk dog", "Buy milk"]);
    assert_eq!(app.board().input(), "");
    assert_eq!(app.selected(), Some(0));
}

#[test]
fn duplicate_opens_alert_that_swallows_next_key() {
    let now = Instant::now();
    let mut app = App::new(OverlaySettings::default());
    type_text(&mut app, "Buy milk", now);
    press(&mut app, KeyCode::Enter, now);

    type_text(&mut app, "buy MILK", now);
    press(&mut app, KeyCode::Enter, now);
    assert_eq!(app.alert(), Some(DUPLICATE_ALERT));
    assert_eq!(app.board().tasks().len(), 1);

    press(&mut app, KeyCode::Char('x'), now);
    assert_eq!(app.alert(), None);
    assert_eq!(app.board().input(), "buy MILK");
    assert!(!app.should_quit());
}

#[test]
fn tab_toggles_selected_and_overlay_expires() {
    let t0 = Instant::now();
    let mut app = App::new(OverlaySettings::default());
    type_text(&mut app, "a", t0);
    press(&mut app, KeyCode::Enter, t0);
    type_text(&mut app, "b", t0);
    press(&mut app, KeyCode::Enter, t0);

    press(&mut app, KeyCode::Down, t0);
    press(&mut app, KeyCode::Tab, t0);
    let tasks = app.board().tasks();
    assert!(!tasks[0].completed);
    assert!(tasks[1].completed);
    assert!(app.board().overlay().is_visible());

    app.tick(t0 + Duration::from_secs(9));
    assert!(app.board().overlay().is_visible());
    app.tick(t0 + Duration::from_secs(10));
    assert!(!app.board().overlay().is_visible());
}

#[test]
fn ctrl_shortcuts_toggle_and_delete() {
    let now = Instant::now();
    let mut app = App::new(OverlaySettings::default());
    for text in ["a", "b", "c"] {
        type_text(&mut app, text, now);
        press(&mut app, KeyCode::Enter, now);
    }

    press(&mut app, KeyCode::Down, now);
    press(&mut app, KeyCode::Down, now);
    press(&mut app, KeyCode::Down, now);
    assert_eq!(app.selected(), Some(2));

    ctrl(&mut app, 't', now);
    assert!(app.board().tasks()[2].completed);
    assert_eq!(app.board().input(), "");

    let now = now + Duration::from_secs(10);
    app.tick(now);
    ctrl(&mut app, 'd', now);
    let texts: Vec<&str> = app.board().tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["c", "b"]);
    assert_eq!(app.selected(), Some(1));

    press(&mut app, KeyCode::Delete, now);
    press(&mut app, KeyCode::Delete, now);
    assert!(app.board().tasks().is_empty());
    assert_eq!(app.selected(), None);

    press(&mut app, KeyCode::Tab, now);
    press(&mut app, KeyCode::Delete, now);
}

#[test]
fn esc_and_ctrl_c_quit() {
    let now = Instant::now();
    let mut app = App::new(OverlaySettings::default());
    press(&mut app, KeyCode::Esc, now);
    assert!(app.should_quit());

    let mut app = App::new(OverlaySettings::default());
    type_text(&mut app, "x", now);
    press(&mut app, KeyCode::Enter, now);
    type_text(&mut app, "X", now);
    press(&mut app, KeyCode::Enter, now);
    assert!(app.alert().is_some());
    ctrl(&mut app, 'c', now);
    assert!(app.should_quit());
}

#[test]
fn release_events_are_ignored() {
    let now = Instant::now();
    let mut app = App::new(OverlaySettings::default());
    let mut key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
    key.kind = KeyEventKind::Release;
    app.handle_key(key, now);
    assert_eq!(app.board().input(), "");
}

#[test]
fn keys_under_overlay_change_nothing() {
    let t0 = Instant::now();
    let mut app = App::new(OverlaySettings::default());
    type_text(&mut app, "a", t0);
    press(&mut app, KeyCode::Enter, t0);
    type_text(&mut app, "b", t0);
    press(&mut app, KeyCode::Enter, t0);

    press(&mut app, KeyCode::Tab, t0);
    assert!(app.board().overlay().is_visible());
    let before = app.board().tasks().to_vec();

    press(&mut app, KeyCode::Down, t0);
    press(&mut app, KeyCode::Tab, t0);
    ctrl(&mut app, 't', t0);
    press(&mut app, KeyCode::Delete, t0);
    ctrl(&mut app, 'd', t0);
    type_text(&mut app, "c", t0);
    press(&mut app, KeyCode::Enter, t0);
    press(&mut app, KeyCode::Backspace, t0);

    assert_eq!(app.board().tasks(), before.as_slice());
    assert_eq!(app.board().input(), "");
    assert_eq!(app.selected(), Some(0));
    assert_eq!(app.board().overlay().pending_count(), 1);
    assert!(!app.should_quit());

    app.tick(t0 + Duration::from_secs(10));
    press(&mut app, KeyCode::Down, t0 + Duration::from_secs(10));
    press(&mut app, KeyCode::Tab, t0 + Duration::from_secs(10));
    assert!(app.board().tasks()[1].completed);
}

#[test]
fn esc_quits_while_overlay_is_up() {
    let now = Instant::now();
    let mut app = App::new(OverlaySettings::default());
    type_text(&mut app, "a", now);
    press(&mut app, KeyCode::Enter, now);
    press(&mut app, KeyCode::Tab, now);
    assert!(app.board().overlay().is_visible());

    press(&mut app, KeyCode::Esc, now);
    assert!(app.should_quit());
}
