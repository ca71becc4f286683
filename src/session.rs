use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::scoring::{score, CharStatus, Scorecard};
use crate::stats::{clamp_minutes, compute_stats, elapsed_minutes, Stats};
use crate::time_series::WpmSeries;

/// Termination policy of a session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Ends when a fixed countdown reaches zero.
    Time,
    /// Ends when the input reaches the length of the target text.
    Words,
}

/// Mode plus its length parameter: seconds in time mode, words in words mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub length: u32,
}

impl SessionConfig {
    pub fn new(mode: Mode, length: u32) -> Result<Self> {
        if length == 0 {
            return Err(Error::InvalidLength);
        }
        Ok(Self { mode, length })
    }

    pub fn timed(secs: u32) -> Result<Self> {
        Self::new(Mode::Time, secs)
    }

    pub fn words(count: u32) -> Result<Self> {
        Self::new(Mode::Words, count)
    }

    /// Short label such as `30s` or `50w`.
    pub fn length_label(&self) -> String {
        match self.mode {
            Mode::Time => format!("{}s", self.length),
            Mode::Words => format!("{}w", self.length),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Finished,
}

/// Kind of edit a keystroke would make to the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    Insert,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// Input was scored; the session keeps running.
    Updated,
    /// Input would overshoot the target in words mode; nothing changed.
    Rejected,
    /// The session is already finished.
    Ignored,
    /// This input completed the session.
    Finished(FinalStats),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Ticked { remaining: u32 },
    /// No running countdown to advance.
    Ignored,
    Finished(FinalStats),
}

/// Frozen results of a finished session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinalStats {
    pub net_wpm: u32,
    pub gross_wpm: u32,
    pub accuracy: u32,
    pub elapsed_seconds: u32,
    pub mode: Mode,
    pub length_label: String,
    pub total_chars: usize,
    pub errors: usize,
    pub correct_chars: usize,
}

impl FinalStats {
    pub fn stats(&self) -> Stats {
        Stats {
            gross_wpm: self.gross_wpm,
            net_wpm: self.net_wpm,
            accuracy: self.accuracy,
        }
    }
}

/// Once-per-second countdown for time mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    limit: u32,
    remaining: u32,
    active: bool,
}

impl Countdown {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
            active: false,
        }
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Count one second down and return what is left.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whole seconds counted down so far.
    pub fn elapsed(&self) -> u32 {
        self.limit - self.remaining
    }
}

/// One typing attempt, from target generation to final results.
///
/// State only moves forward: `Idle -> Running -> Finished`. A new attempt is
/// a new `Session`.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    target: String,
    target_len: usize,
    state: SessionState,
    started_at: Option<Instant>,
    countdown: Option<Countdown>,
    input: String,
    scorecard: Scorecard,
    samples: WpmSeries,
    final_stats: Option<FinalStats>,
}

impl Session {
    pub fn new(config: SessionConfig, target: String) -> Result<Self> {
        if target.is_empty() {
            return Err(Error::EmptyTarget);
        }

        let countdown = match config.mode {
            Mode::Time => Some(Countdown::new(config.length)),
            Mode::Words => None,
        };

        Ok(Self {
            config,
            target_len: target.chars().count(),
            scorecard: Scorecard::untouched(&target),
            target,
            state: SessionState::Idle,
            started_at: None,
            countdown,
            input: String::new(),
            samples: WpmSeries::default(),
            final_stats: None,
        })
    }

    /// Move from idle to running. Returns false (and changes nothing) if the
    /// session was already started.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state != SessionState::Idle {
            debug!(state = ?self.state, "start ignored");
            return false;
        }

        self.state = SessionState::Running;
        self.started_at = Some(now);
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.start();
        }
        info!(mode = %self.config.mode, length = self.config.length, "session started");
        true
    }

    /// Whether a keystroke of this kind would be accepted right now.
    pub fn accepts(&self, key: Keystroke) -> bool {
        match (self.state, key) {
            (SessionState::Finished, _) => false,
            (_, Keystroke::Delete) => true,
            (_, Keystroke::Insert) => {
                self.config.mode != Mode::Words || self.scorecard.total_chars < self.target_len
            }
        }
    }

    /// Feed the full current input string.
    pub fn input(&mut self, value: &str, now: Instant) -> InputOutcome {
        if self.state == SessionState::Finished {
            return InputOutcome::Ignored;
        }

        let len = value.chars().count();
        if self.config.mode == Mode::Words && len > self.target_len {
            debug!(len, target_len = self.target_len, "input past target rejected");
            return InputOutcome::Rejected;
        }

        self.start(now);
        self.scorecard = score(&self.target, value);
        self.input = value.to_string();
        self.record_sample(now);

        if self.config.mode == Mode::Words && self.scorecard.total_chars >= self.target_len {
            return InputOutcome::Finished(self.finish(now));
        }
        InputOutcome::Updated
    }

    /// Advance the countdown by one second.
    pub fn on_tick(&mut self, now: Instant) -> TickOutcome {
        if self.state != SessionState::Running {
            return TickOutcome::Ignored;
        }

        let remaining = match self.countdown.as_mut() {
            Some(countdown) if countdown.is_active() => countdown.tick(),
            _ => return TickOutcome::Ignored,
        };

        if remaining == 0 {
            return TickOutcome::Finished(self.finish(now));
        }
        TickOutcome::Ticked { remaining }
    }

    fn finish(&mut self, now: Instant) -> FinalStats {
        self.state = SessionState::Finished;

        if let Some(countdown) = self.countdown.as_mut() {
            countdown.stop();
        }

        let (minutes, elapsed_seconds) = match self.countdown {
            Some(countdown) => {
                let secs = countdown.elapsed();
                (clamp_minutes(secs as f64 / 60.0), secs)
            }
            None => {
                let elapsed = self.wall_elapsed(now);
                (
                    elapsed_minutes(elapsed),
                    elapsed.as_secs_f64().round() as u32,
                )
            }
        };

        let card = &self.scorecard;
        let stats = compute_stats(card.total_chars, card.errors, card.correct_chars, minutes);
        let results = FinalStats {
            net_wpm: stats.net_wpm,
            gross_wpm: stats.gross_wpm,
            accuracy: stats.accuracy,
            elapsed_seconds,
            mode: self.config.mode,
            length_label: self.config.length_label(),
            total_chars: card.total_chars,
            errors: card.errors,
            correct_chars: card.correct_chars,
        };

        info!(
            net_wpm = results.net_wpm,
            gross_wpm = results.gross_wpm,
            accuracy = results.accuracy,
            elapsed_seconds,
            "session finished"
        );
        self.final_stats = Some(results.clone());
        results
    }

    fn wall_elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default()
    }

    fn record_sample(&mut self, now: Instant) {
        let elapsed = self.wall_elapsed(now);
        let wpm = self.live_stats(now).net_wpm as f64;
        self.samples.record(elapsed.as_secs_f64(), wpm);
    }

    /// Stats as of `now`; frozen once the session has finished.
    pub fn live_stats(&self, now: Instant) -> Stats {
        if let Some(results) = &self.final_stats {
            return results.stats();
        }
        let card = &self.scorecard;
        compute_stats(
            card.total_chars,
            card.errors,
            card.correct_chars,
            elapsed_minutes(self.wall_elapsed(now)),
        )
    }

    /// Fraction of the session completed, between 0 and 1.
    pub fn progress(&self) -> f64 {
        let fraction = match self.countdown {
            Some(countdown) => countdown.elapsed() as f64 / self.config.length as f64,
            None => self.scorecard.total_chars as f64 / self.target_len as f64,
        };
        fraction.clamp(0.0, 1.0)
    }

    /// Seconds since the first input, or the final figure once finished.
    pub fn elapsed_seconds(&self, now: Instant) -> u32 {
        match &self.final_stats {
            Some(results) => results.elapsed_seconds,
            None => self.wall_elapsed(now).as_secs() as u32,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn input_text(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn scorecard(&self) -> &Scorecard {
        &self.scorecard
    }

    pub fn statuses(&self) -> &[CharStatus] {
        &self.scorecard.statuses
    }

    pub fn cursor(&self) -> Option<usize> {
        self.scorecard.cursor
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining())
    }

    /// True while the time-mode countdown is running.
    pub fn timer_active(&self) -> bool {
        self.countdown.is_some_and(|c| c.is_active())
    }

    pub fn final_stats(&self) -> Option<&FinalStats> {
        self.final_stats.as_ref()
    }

    pub fn samples(&self) -> &WpmSeries {
        &self.samples
    }
}
