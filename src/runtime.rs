use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Session countdown resolution.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Redraw/animation cadence.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Animation/redraw frame.
    Frame,
    /// Once-per-second session timer.
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    Some(AppEvent::Key(key))
                }
                Ok(CtEvent::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
                Ok(_) => None,
                Err(_) => break,
            };

            if let Some(evt) = evt {
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time.
///
/// Ticks are only produced while armed. The first tick after arming arrives
/// one full interval later, and disarming guarantees no further ticks until
/// the next arm.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    frame_interval: Option<Duration>,
    next_tick: Cell<Option<Instant>>,
    next_frame: Cell<Option<Instant>>,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            frame_interval: None,
            next_tick: Cell::new(None),
            next_frame: Cell::new(None),
        }
    }

    /// Also emit `Frame` events at the given cadence.
    pub fn with_frames(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self.next_frame.set(Some(Instant::now() + interval));
        self
    }

    pub fn arm_ticks(&self, now: Instant) {
        self.next_tick.set(Some(now + self.ticker.interval()));
    }

    pub fn disarm_ticks(&self) {
        self.next_tick.set(None);
    }

    pub fn ticks_armed(&self) -> bool {
        self.next_tick.get().is_some()
    }

    /// Arm or disarm so ticks run exactly while `active` holds.
    pub fn sync_ticks(&self, active: bool, now: Instant) {
        match (active, self.ticks_armed()) {
            (true, false) => self.arm_ticks(now),
            (false, true) => self.disarm_ticks(),
            _ => {}
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.next_tick.get(), self.next_frame.get()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn due(&self, now: Instant) -> Option<AppEvent> {
        if let Some(tick) = self.next_tick.get().filter(|t| *t <= now) {
            let next = tick + self.ticker.interval();
            self.next_tick.set(Some(if next <= now {
                now + self.ticker.interval()
            } else {
                next
            }));
            return Some(AppEvent::Tick);
        }

        if let (Some(frame), Some(interval)) = (self.next_frame.get(), self.frame_interval) {
            if frame <= now {
                self.next_frame.set(Some(now + interval));
                return Some(AppEvent::Frame);
            }
        }
        None
    }

    /// Blocks until the next event or the next due tick/frame.
    pub fn step(&self) -> AppEvent {
        loop {
            let now = Instant::now();
            if let Some(evt) = self.due(now) {
                return evt;
            }

            let timeout = match self.next_deadline() {
                Some(deadline) => deadline.saturating_duration_since(now),
                None => self.ticker.interval(),
            };

            match self.event_source.recv_timeout(timeout) {
                Ok(evt) => return evt,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => std::thread::sleep(timeout),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn step_returns_tick_when_armed() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));
        runner.arm_ticks(Instant::now());

        match runner.step() {
            AppEvent::Tick => {}
            other => panic!("expected Tick, got {other:?}"),
        }
        assert!(runner.ticks_armed());
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize(80, 24)).unwrap();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));

        match runner.step() {
            AppEvent::Resize(80, 24) => {}
            other => panic!("expected Resize, got {other:?}"),
        }
    }

    #[test]
    fn disarmed_runner_only_emits_frames() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)))
            .with_frames(Duration::from_millis(2));
        runner.arm_ticks(Instant::now());
        runner.disarm_ticks();

        for _ in 0..5 {
            match runner.step() {
                AppEvent::Frame => {}
                other => panic!("expected Frame, got {other:?}"),
            }
        }
    }

    #[test]
    fn sync_ticks_follows_timer_state() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::default());
        let now = Instant::now();

        runner.sync_ticks(true, now);
        assert!(runner.ticks_armed());
        let armed_at = runner.next_tick.get();

        runner.sync_ticks(true, now + Duration::from_millis(500));
        assert_eq!(runner.next_tick.get(), armed_at);

        runner.sync_ticks(false, now);
        assert!(!runner.ticks_armed());
    }

    #[test]
    fn key_events_do_not_delay_ticks() {
        let (tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(200)));
        runner.arm_ticks(Instant::now());

        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        for _ in 0..3 {
            tx.send(AppEvent::Key(key)).unwrap();
        }

        let mut keys = 0;
        loop {
            match runner.step() {
                AppEvent::Key(_) => keys += 1,
                AppEvent::Tick => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(keys, 3);
    }
}
