use std::sync::mpsc;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;

use typemaster::language::{Corpus, TextGenerator};
use typemaster::scoring::{score, CharStatus};
use typemaster::stats::compute_stats;
use typemaster::{Controller, InputOutcome, SessionConfig, SessionState, TickOutcome};

fn controller(config: SessionConfig) -> Controller {
    let generator = TextGenerator::seeded(Corpus::builtin().unwrap(), 11);
    Controller::new(generator, config).unwrap()
}

#[test]
fn exact_input_is_all_correct() {
    let card = score("cat", "cat");

    assert_eq!(card.statuses, vec![CharStatus::Correct; 3]);
    assert_eq!(card.errors, 0);
    let stats = compute_stats(card.total_chars, card.errors, card.correct_chars, 0.1);
    assert_eq!(stats.accuracy, 100);
}

#[test]
fn one_wrong_character_costs_a_third_of_accuracy() {
    let card = score("cat", "cag");

    assert_eq!(
        card.statuses,
        vec![CharStatus::Correct, CharStatus::Correct, CharStatus::Incorrect]
    );
    assert_eq!(card.errors, 1);
    let stats = compute_stats(card.total_chars, card.errors, card.correct_chars, 0.1);
    assert_eq!(stats.accuracy, 67);
}

#[test]
fn words_session_finishes_on_exact_target() {
    let mut controller = controller(SessionConfig::words(5).unwrap());
    let (tx, rx) = mpsc::channel();
    controller.subscribe(tx);

    let target = controller.session().target().to_string();
    assert_eq!(target, "The quick brown fox jumps");

    let start = Instant::now();
    let (head, last) = target.split_at(target.len() - 1);
    assert_eq!(controller.handle_input(head, start), InputOutcome::Updated);
    assert_eq!(controller.session().state(), SessionState::Running);

    let outcome = controller.handle_input(
        &format!("{head}{last}"),
        start + Duration::from_secs(6),
    );

    let results = assert_matches!(outcome, InputOutcome::Finished(results) => results);
    assert_eq!(results.accuracy, 100);
    assert_eq!(results.elapsed_seconds, 6);
    assert_eq!(results.length_label, "5w");
    assert_eq!(controller.session().state(), SessionState::Finished);
    assert_eq!(rx.try_recv().unwrap(), results);
    assert!(rx.try_recv().is_err());
}

#[test]
fn timed_session_ends_on_thirtieth_tick() {
    let mut controller = controller(SessionConfig::timed(30).unwrap());
    let (tx, rx) = mpsc::channel();
    controller.subscribe(tx);

    let start = Instant::now();
    assert_eq!(controller.type_char('T', start), InputOutcome::Updated);
    assert!(controller.timer_active());

    for second in 1..30 {
        let now = start + Duration::from_secs(second);
        assert_matches!(controller.handle_tick(now), TickOutcome::Ticked { remaining } if remaining == 30 - second as u32);
    }

    let results = assert_matches!(
        controller.handle_tick(start + Duration::from_secs(30)),
        TickOutcome::Finished(results) => results
    );
    assert_eq!(results.elapsed_seconds, 30);
    assert!(!controller.timer_active());

    assert_eq!(
        controller.handle_tick(start + Duration::from_secs(31)),
        TickOutcome::Ignored
    );
    assert_eq!(controller.session().remaining_seconds(), Some(0));
    assert_eq!(rx.try_iter().count(), 1);
}

#[test]
fn nothing_typed_reports_full_accuracy_and_zero_speed() {
    let stats = compute_stats(0, 0, 0, 0.1);

    assert_eq!(stats.accuracy, 100);
    assert_eq!(stats.gross_wpm, 0);
    assert_eq!(stats.net_wpm, 0);
}

#[test]
fn restart_replaces_session_and_ignores_stale_ticks() {
    let mut controller = controller(SessionConfig::timed(15).unwrap());
    let start = Instant::now();
    controller.type_char('x', start);
    assert!(controller.timer_active());

    controller.restart().unwrap();

    assert_eq!(controller.session().state(), SessionState::Idle);
    assert!(!controller.timer_active());
    assert_eq!(
        controller.handle_tick(start + Duration::from_secs(1)),
        TickOutcome::Ignored
    );
    assert_eq!(controller.session().remaining_seconds(), Some(15));
}

#[test]
fn words_mode_rejects_typing_past_the_target() {
    let mut controller = controller(SessionConfig::words(1).unwrap());
    let now = Instant::now();

    assert_eq!(controller.handle_input("Thex", now), InputOutcome::Rejected);
    assert_eq!(controller.session().state(), SessionState::Idle);
    assert_eq!(controller.session().input_text(), "");
}

#[test]
fn net_wpm_never_exceeds_gross() {
    let mut controller = controller(SessionConfig::words(10).unwrap());
    let start = Instant::now();
    controller.handle_input("Thx quixk", start);

    let stats = controller
        .session()
        .live_stats(start + Duration::from_secs(3));
    assert!(stats.net_wpm <= stats.gross_wpm);
    assert!(stats.accuracy < 100);
}
