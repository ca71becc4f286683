use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::language::TextGenerator;
use crate::session::{
    FinalStats, InputOutcome, Keystroke, Session, SessionConfig, TickOutcome,
};

/// Consumer of the session-finished signal (history, results display).
pub trait SessionListener {
    fn on_session_finished(&mut self, results: &FinalStats);
}

impl<L: SessionListener> SessionListener for Rc<RefCell<L>> {
    fn on_session_finished(&mut self, results: &FinalStats) {
        self.borrow_mut().on_session_finished(results);
    }
}

impl SessionListener for Sender<FinalStats> {
    fn on_session_finished(&mut self, results: &FinalStats) {
        if self.send(results.clone()).is_err() {
            debug!("session listener channel closed");
        }
    }
}

/// Sole owner of the current session.
///
/// Every control action replaces the session wholesale; nothing else mutates
/// it.
pub struct Controller {
    generator: TextGenerator,
    config: SessionConfig,
    session: Session,
    listeners: Vec<Box<dyn SessionListener>>,
}

impl Controller {
    pub fn new(mut generator: TextGenerator, config: SessionConfig) -> Result<Self> {
        let target = generator.generate(&config)?;
        let session = Session::new(config, target)?;

        Ok(Self {
            generator,
            config,
            session,
            listeners: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, listener: impl SessionListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Switch mode/length and begin a fresh idle session.
    pub fn select_mode(&mut self, config: SessionConfig) -> Result<()> {
        let target = self.generator.generate(&config)?;
        self.replace(config, target)?;
        self.config = config;
        Ok(())
    }

    /// Fresh idle session with newly generated text.
    pub fn restart(&mut self) -> Result<()> {
        let target = self.generator.generate(&self.config)?;
        self.replace(self.config, target)
    }

    /// Fresh idle session over the same target text.
    pub fn retry(&mut self) -> Result<()> {
        let target = self.session.target().to_string();
        self.replace(self.config, target)
    }

    fn replace(&mut self, config: SessionConfig, target: String) -> Result<()> {
        let session = Session::new(config, target)?;
        info!(
            mode = %config.mode,
            label = %config.length_label(),
            target_len = session.target().len(),
            "new session"
        );
        self.session = session;
        Ok(())
    }

    /// Explicit start without typing. Redundant calls are no-ops.
    pub fn start(&mut self, now: Instant) -> bool {
        self.session.start(now)
    }

    /// Deliver the full current input value.
    pub fn handle_input(&mut self, value: &str, now: Instant) -> InputOutcome {
        let outcome = self.session.input(value, now);
        if let InputOutcome::Finished(results) = &outcome {
            self.notify(results);
        }
        outcome
    }

    /// Append one typed character to the current input.
    pub fn type_char(&mut self, c: char, now: Instant) -> InputOutcome {
        if self.session.is_finished() {
            return InputOutcome::Ignored;
        }
        if !self.session.accepts(Keystroke::Insert) {
            return InputOutcome::Rejected;
        }
        let mut value = self.session.input_text().to_string();
        value.push(c);
        self.handle_input(&value, now)
    }

    /// Remove the last character of the current input.
    pub fn delete_char(&mut self, now: Instant) -> InputOutcome {
        if self.session.is_finished() {
            return InputOutcome::Ignored;
        }
        let mut value = self.session.input_text().to_string();
        if value.pop().is_none() {
            return InputOutcome::Rejected;
        }
        self.handle_input(&value, now)
    }

    /// Once-per-second timer callback.
    pub fn handle_tick(&mut self, now: Instant) -> TickOutcome {
        let outcome = self.session.on_tick(now);
        if let TickOutcome::Finished(results) = &outcome {
            self.notify(results);
        }
        outcome
    }

    fn notify(&mut self, results: &FinalStats) {
        for listener in self.listeners.iter_mut() {
            listener.on_session_finished(results);
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn timer_active(&self) -> bool {
        self.session.timer_active()
    }

    pub fn generator(&self) -> &TextGenerator {
        &self.generator
    }
}
