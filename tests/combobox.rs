use std::time::{Duration, Instant};

use scorecast_terminal::combobox::{BLUR_GRACE, Combobox, DEBOUNCE, ListState};
use scorecast_terminal::team_search::Team;

fn team(id: u32, name: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        logo: "🔴".to_string(),
        country: "🏴󠁧󠁢󠁥󠁮󠁧󠁿 England".to_string(),
    }
}

fn type_word(combobox: &mut Combobox, word: &str, now: Instant) {
    for ch in word.chars() {
        combobox.push_char(ch, now);
    }
}

#[test]
fn debounce_fires_only_after_the_quiet_interval() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "liv", t0);
    assert!(cb.poll(t0 + DEBOUNCE - Duration::from_millis(1)).is_none());

    let request = cb.poll(t0 + DEBOUNCE).expect("deadline passed");
    assert_eq!(request.query, "liv");
    assert!(cb.is_loading());

    // The deadline is consumed; nothing fires twice.
    assert!(cb.poll(t0 + DEBOUNCE + Duration::from_secs(1)).is_none());
}

#[test]
fn every_keystroke_restarts_the_debounce() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "li", t0);
    let t1 = t0 + Duration::from_millis(200);
    cb.push_char('v', t1);

    // The first deadline was superseded.
    assert!(cb.poll(t0 + DEBOUNCE).is_none());
    assert!(cb.poll(t1 + DEBOUNCE).is_some());
}

#[test]
fn short_query_closes_without_a_lookup() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    cb.push_char('l', t0);
    assert!(cb.poll(t0 + DEBOUNCE).is_none());
    assert_eq!(cb.list_state(), ListState::Closed);
    assert!(cb.suggestions().is_empty());

    // Whitespace padding does not rescue a short query.
    let mut padded = Combobox::new();
    type_word(&mut padded, "  l ", t0);
    assert!(padded.poll(t0 + DEBOUNCE).is_none());
}

#[test]
fn results_open_the_list_and_empty_results_close_it() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "liv", t0);
    let request = cb.poll(t0 + DEBOUNCE).unwrap();

    assert!(cb.on_results(request.seq, vec![team(4, "Liverpool")]));
    assert!(cb.is_open());

    type_word(&mut cb, "zz", t0 + Duration::from_secs(1));
    let request = cb.poll(t0 + Duration::from_secs(1) + DEBOUNCE).unwrap();
    assert!(cb.on_results(request.seq, Vec::new()));
    assert_eq!(cb.list_state(), ListState::Closed);
    assert!(cb.no_results());
}

#[test]
fn stale_sequence_results_are_discarded() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "ba", t0);
    let first = cb.poll(t0 + DEBOUNCE).unwrap();

    cb.push_char('y', t0 + DEBOUNCE + Duration::from_millis(10));
    let second = cb.poll(t0 + 2 * DEBOUNCE + Duration::from_millis(10)).unwrap();
    assert!(second.seq > first.seq);

    // The slower first lookup lands after the second was issued.
    assert!(!cb.on_results(first.seq, vec![team(2, "Barcelona")]));
    assert!(cb.suggestions().is_empty());

    assert!(cb.on_results(second.seq, vec![team(5, "Bayern Munich")]));
    assert_eq!(cb.suggestions()[0].name, "Bayern Munich");
}

#[test]
fn cursor_clamps_at_both_ends() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "ma", t0);
    let request = cb.poll(t0 + DEBOUNCE).unwrap();
    cb.on_results(
        request.seq,
        vec![team(3, "Manchester City"), team(13, "Manchester United")],
    );

    assert_eq!(cb.cursor(), -1);
    cb.cursor_down();
    cb.cursor_down();
    cb.cursor_down();
    assert_eq!(cb.cursor(), 1);

    cb.cursor_up();
    cb.cursor_up();
    cb.cursor_up();
    assert_eq!(cb.cursor(), -1);
}

#[test]
fn commit_requires_a_cursored_candidate() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "liv", t0);
    let request = cb.poll(t0 + DEBOUNCE).unwrap();
    cb.on_results(request.seq, vec![team(4, "Liverpool")]);

    assert!(cb.commit().is_none());

    cb.cursor_down();
    let committed = cb.commit().expect("cursored candidate");
    assert_eq!(committed.name, "Liverpool");
    assert_eq!(cb.query(), "Liverpool");
    assert_eq!(cb.committed_logo(), Some("🔴"));
    assert!(!cb.is_open());

    // Committing schedules no further lookup.
    assert!(cb.poll(t0 + Duration::from_secs(5)).is_none());
}

#[test]
fn typing_after_a_commit_drops_the_logo() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "liv", t0);
    let request = cb.poll(t0 + DEBOUNCE).unwrap();
    cb.on_results(request.seq, vec![team(4, "Liverpool")]);
    cb.cursor_down();
    cb.commit();

    cb.push_char('x', t0 + Duration::from_secs(1));
    assert!(cb.committed_logo().is_none());
}

#[test]
fn escape_closes_and_resets_the_cursor() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "liv", t0);
    let request = cb.poll(t0 + DEBOUNCE).unwrap();
    cb.on_results(request.seq, vec![team(4, "Liverpool")]);
    cb.cursor_down();

    cb.on_escape();
    assert_eq!(cb.list_state(), ListState::Closed);
    assert_eq!(cb.cursor(), -1);
}

#[test]
fn blur_closes_only_after_the_grace_window() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "liv", t0);
    let request = cb.poll(t0 + DEBOUNCE).unwrap();
    cb.on_results(request.seq, vec![team(4, "Liverpool")]);

    let blur_at = t0 + Duration::from_secs(1);
    cb.on_focus_lost(blur_at);

    // Inside the grace window a selection still registers.
    assert!(cb.poll(blur_at + BLUR_GRACE - Duration::from_millis(1)).is_none());
    assert!(cb.is_open());
    cb.cursor_down();
    assert!(cb.commit().is_some());

    // After the window the list is closed.
    cb.on_focus_lost(blur_at);
    assert!(cb.poll(blur_at + BLUR_GRACE).is_none());
    assert!(!cb.is_open());
}

#[test]
fn regaining_focus_cancels_the_pending_blur() {
    let mut cb = Combobox::new();
    let t0 = Instant::now();

    type_word(&mut cb, "liv", t0);
    let request = cb.poll(t0 + DEBOUNCE).unwrap();
    cb.on_results(request.seq, vec![team(4, "Liverpool")]);

    cb.on_focus_lost(t0 + Duration::from_secs(1));
    cb.on_focus();
    assert!(cb.poll(t0 + Duration::from_secs(2)).is_none());
    assert!(cb.is_open());
}
