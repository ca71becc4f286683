// Library surface for the binary, headless/integration tests, and reuse.
// Keep this free of terminal rendering; the TUI lives in main.rs.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod fx;
pub mod history;
pub mod language;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod share;
pub mod stats;
pub mod time_series;
pub mod util;

pub use controller::{Controller, SessionListener};
pub use error::{Error, Result};
pub use session::{FinalStats, InputOutcome, Mode, Session, SessionConfig, SessionState, TickOutcome};
