use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use typemaster::language::{Corpus, TextGenerator};
use typemaster::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use typemaster::{Controller, SessionConfig, SessionState};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn controller(config: SessionConfig) -> Controller {
    Controller::new(
        TextGenerator::seeded(Corpus::builtin().unwrap(), 1),
        config,
    )
    .unwrap()
}

// Headless loop using the runtime + Controller without a TTY
#[test]
fn headless_words_flow_completes() {
    let mut controller = controller(SessionConfig::words(2).unwrap());
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for c in "The quick".chars() {
        tx.send(key(c)).unwrap();
    }

    for _ in 0..100u32 {
        let now = Instant::now();
        match runner.step() {
            AppEvent::Tick => {
                controller.handle_tick(now);
            }
            AppEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    controller.type_char(c, now);
                }
            }
            AppEvent::Frame | AppEvent::Resize(..) => {}
        }
        runner.sync_ticks(controller.timer_active(), now);
        if controller.session().is_finished() {
            break;
        }
    }

    let results = controller.session().final_stats().unwrap();
    assert_eq!(results.accuracy, 100);
    assert_eq!(results.errors, 0);
    // words mode never arms the countdown
    assert!(!runner.ticks_armed());
}

#[test]
fn headless_timed_session_finishes_by_ticks() {
    let mut controller = controller(SessionConfig::timed(3).unwrap());
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(10)),
    );

    tx.send(key('T')).unwrap();
    tx.send(key('x')).unwrap();

    let mut ticks = 0;
    for _ in 0..200u32 {
        let now = Instant::now();
        match runner.step() {
            AppEvent::Tick => {
                ticks += 1;
                controller.handle_tick(now);
            }
            AppEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    controller.type_char(c, now);
                }
            }
            AppEvent::Frame | AppEvent::Resize(..) => {}
        }
        runner.sync_ticks(controller.timer_active(), now);
        if controller.session().is_finished() {
            break;
        }
    }

    assert_eq!(controller.session().state(), SessionState::Finished);
    assert_eq!(ticks, 3);
    assert!(!runner.ticks_armed());

    let results = controller.session().final_stats().unwrap();
    assert_eq!(results.elapsed_seconds, 3);
    assert_eq!(results.errors, 1);
    assert_eq!(results.accuracy, 50);
}

#[test]
fn headless_restart_disarms_ticks() {
    let mut controller = controller(SessionConfig::timed(30).unwrap());
    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    )
    .with_frames(Duration::from_millis(2));

    let now = Instant::now();
    controller.type_char('T', now);
    runner.sync_ticks(controller.timer_active(), now);
    assert!(runner.ticks_armed());

    controller.restart().unwrap();
    runner.sync_ticks(controller.timer_active(), now);
    assert!(!runner.ticks_armed());

    for _ in 0..5 {
        assert!(matches!(runner.step(), AppEvent::Frame));
    }
    assert_eq!(controller.session().state(), SessionState::Idle);
}
