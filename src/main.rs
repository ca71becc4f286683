mod ui;

use std::{
    cell::RefCell,
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    rc::Rc,
    sync::Mutex,
    time::Instant,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use typemaster::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    controller::Controller,
    fx::ParticleField,
    history::{export_csv_file, summarize, HistoryEntry, HistoryRecorder, SqliteHistoryStore},
    language::{Corpus, TextGenerator},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner, FRAME_INTERVAL},
    session::{FinalStats, InputOutcome, Mode, SessionConfig, TickOutcome},
    share,
};

/// Mode/length choices cycled with Tab.
const PRESETS: [(Mode, u32); 8] = [
    (Mode::Time, 15),
    (Mode::Time, 30),
    (Mode::Time, 60),
    (Mode::Time, 120),
    (Mode::Words, 10),
    (Mode::Words, 25),
    (Mode::Words, 50),
    (Mode::Words, 100),
];

/// typing speed trainer with live wpm, accuracy, and local history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type sample sentences against the clock or a word count and get live WPM, raw speed and accuracy. Results are kept in a local history per user."
)]
pub struct Cli {
    /// number of seconds to run test (time mode)
    #[clap(short = 's', long, value_parser = clap::value_parser!(u32).range(1..))]
    number_of_secs: Option<u32>,

    /// number of words to type (words mode)
    #[clap(
        short = 'w',
        long,
        conflicts_with = "number_of_secs",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    number_of_words: Option<u32>,

    /// seed for reproducible time-mode text
    #[clap(long)]
    seed: Option<u64>,

    /// sign in locally under this name; remembered until --logout
    #[clap(long, conflicts_with = "logout")]
    user: Option<String>,

    /// sign out and record results as guest
    #[clap(long)]
    logout: bool,

    /// print the history for the current user and exit
    #[clap(long)]
    history: bool,

    /// write the history for the current user as CSV and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// delete the history for the current user and exit
    #[clap(long)]
    clear_history: bool,
}

impl Cli {
    /// Fold command line choices into the persisted preferences
    fn apply(&self, config: &mut Config) {
        if let Some(secs) = self.number_of_secs {
            config.mode = Mode::Time;
            config.time_limit_secs = secs;
        }
        if let Some(words) = self.number_of_words {
            config.mode = Mode::Words;
            config.word_limit = words;
        }
        if self.logout {
            config.sign_out();
        }
        if let Some(ref name) = self.user {
            config.sign_in(name);
        }
    }

    fn is_history_command(&self) -> bool {
        self.history || self.clear_history || self.export.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    Results,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub controller: Controller,
    pub history: Rc<RefCell<HistoryRecorder<SqliteHistoryStore>>>,
    pub history_cache: Vec<HistoryEntry>,
    pub config: Config,
    config_store: Box<dyn ConfigStore>,
    pub state: AppState,
    pub fx: ParticleField,
    pub status: Option<String>,
    preset: Option<usize>,
}

impl App {
    pub fn new(
        mut controller: Controller,
        recorder: HistoryRecorder<SqliteHistoryStore>,
        config: Config,
        config_store: Box<dyn ConfigStore>,
        width: u16,
        height: u16,
    ) -> Self {
        let history = Rc::new(RefCell::new(recorder));
        controller.subscribe(history.clone());

        let current = controller.config();
        let preset = PRESETS
            .iter()
            .position(|&(mode, length)| mode == current.mode && length == current.length);

        Self {
            controller,
            history,
            history_cache: Vec::new(),
            config,
            config_store,
            state: AppState::Typing,
            fx: ParticleField::new(width, height),
            status: None,
            preset,
        }
    }

    fn on_tick(&mut self, now: Instant) {
        match self.controller.handle_tick(now) {
            TickOutcome::Finished(results) => self.on_finished(&results),
            TickOutcome::Ticked { .. } => self.refresh_fx(now),
            TickOutcome::Ignored => {}
        }
    }

    fn on_input(&mut self, outcome: InputOutcome, now: Instant) {
        match outcome {
            InputOutcome::Finished(results) => self.on_finished(&results),
            InputOutcome::Updated => self.refresh_fx(now),
            InputOutcome::Rejected | InputOutcome::Ignored => {}
        }
    }

    fn on_finished(&mut self, results: &FinalStats) {
        self.state = AppState::Results;
        self.fx.set_speed_from_wpm(results.net_wpm);
        self.status = None;
        self.reload_history();
    }

    fn refresh_fx(&mut self, now: Instant) {
        let wpm = self.controller.session().live_stats(now).net_wpm;
        self.fx.set_speed_from_wpm(wpm);
    }

    pub fn reload_history(&mut self) {
        match self.history.borrow().entries() {
            Ok(entries) => self.history_cache = entries,
            Err(e) => {
                warn!(error = %e, "could not load history");
                self.status = Some(format!("could not load history: {e}"));
            }
        }
    }

    fn new_session(&mut self, same_text: bool) {
        let result = if same_text {
            self.controller.retry()
        } else {
            self.controller.restart()
        };
        if let Err(e) = result {
            warn!(error = %e, "could not start a new session");
            self.status = Some(e.to_string());
        }
        self.state = AppState::Typing;
        self.fx.set_speed_from_wpm(0);
    }

    fn cycle_preset(&mut self, forward: bool) {
        let len = PRESETS.len();
        let next = match (self.preset, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, _) => 0,
        };
        let (mode, length) = PRESETS[next];
        let Ok(session) = SessionConfig::new(mode, length) else {
            return;
        };

        match self.controller.select_mode(session) {
            Ok(()) => {
                self.preset = Some(next);
                self.state = AppState::Typing;
                self.status = None;
                self.config.remember(session);
                if let Err(e) = self.config_store.save(&self.config) {
                    warn!(error = %e, "could not save config");
                }
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn share(&mut self) {
        let Some(results) = self.controller.session().final_stats().cloned() else {
            return;
        };
        self.status = Some(if share::open_share(&results) {
            "opened share link in browser".to_string()
        } else {
            share::share_text(&results)
        });
    }

    fn export(&mut self) {
        self.reload_history();
        let key = self.history.borrow().identity().key();
        let path = AppDirs::export_path(&key);
        self.status = Some(match export_csv_file(&self.history_cache, &path) {
            Ok(()) => format!(
                "exported {} results to {}",
                self.history_cache.len(),
                path.display()
            ),
            Err(e) => {
                warn!(error = %e, "export failed");
                format!("export failed: {e}")
            }
        });
    }

    fn clear_history(&mut self) {
        let cleared = self.history.borrow_mut().clear();
        match cleared {
            Ok(n) => {
                info!(removed = n, "history cleared");
                self.status = Some(format!("cleared {n} results"));
            }
            Err(e) => self.status = Some(format!("could not clear history: {e}")),
        }
        self.reload_history();
    }

    fn show_history(&mut self) {
        self.reload_history();
        self.state = AppState::History;
    }

    fn leave_history(&mut self) {
        self.state = if self.controller.session().is_finished() {
            AppState::Results
        } else {
            AppState::Typing
        };
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        match key.code {
            KeyCode::Tab => self.cycle_preset(true),
            KeyCode::BackTab => self.cycle_preset(false),
            KeyCode::Left => self.new_session(true),
            KeyCode::Right => self.new_session(false),
            _ => match self.state {
                AppState::Typing => self.on_typing_key(key, now),
                AppState::Results => self.on_results_key(key),
                AppState::History => self.on_history_key(key),
            },
        }
        Flow::Continue
    }

    fn on_typing_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let outcome = self.controller.type_char(c, now);
                self.on_input(outcome, now);
            }
            KeyCode::Backspace => {
                let outcome = self.controller.delete_char(now);
                self.on_input(outcome, now);
            }
            KeyCode::Enter => {
                self.controller.start(now);
            }
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => self.new_session(true),
            KeyCode::Char('n') => self.new_session(false),
            KeyCode::Char('t') => self.share(),
            KeyCode::Char('h') => self.show_history(),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('b') | KeyCode::Backspace => self.leave_history(),
            KeyCode::Char('c') => self.clear_history(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('r') => self.new_session(true),
            KeyCode::Char('n') => self.new_session(false),
            _ => {}
        }
    }
}

fn init_logging() -> Option<()> {
    let path = AppDirs::log_path();
    std::fs::create_dir_all(path.parent()?).ok()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let filter =
        EnvFilter::try_from_env("TYPEMASTER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()
}

fn run_history_command(
    cli: &Cli,
    recorder: &mut HistoryRecorder<SqliteHistoryStore>,
) -> Result<(), Box<dyn Error>> {
    if cli.clear_history {
        let removed = recorder.clear()?;
        println!(
            "removed {removed} results for {}",
            recorder.identity().display_name()
        );
    }

    let entries = recorder.entries()?;

    if let Some(ref path) = cli.export {
        export_csv_file(&entries, path)?;
        println!("exported {} results to {}", entries.len(), path.display());
    }

    if cli.history {
        println!("history for {}", recorder.identity().display_name());
        if entries.is_empty() {
            println!("no results yet.");
        }
        for entry in &entries {
            println!("{}", ui::history::format_entry(entry));
        }
        if let Some(summary) = summarize(&entries) {
            println!("{}", ui::history::format_summary(&summary));
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply(&mut config);
    if let Err(e) = config_store.save(&config) {
        warn!(error = %e, "could not save config");
    }

    let mut recorder = HistoryRecorder::new(SqliteHistoryStore::open_default()?, config.identity());

    if cli.is_history_command() {
        return run_history_command(&cli, &mut recorder);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let corpus = Corpus::builtin()?;
    let generator = match cli.seed {
        Some(seed) => TextGenerator::seeded(corpus, seed),
        None => TextGenerator::new(corpus),
    };
    let controller = Controller::new(generator, config.session_config()?)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(
        controller,
        recorder,
        config,
        Box::new(config_store),
        size.width,
        size.height,
    );
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default())
        .with_frames(FRAME_INTERVAL);

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let event = runner.step();
        let now = Instant::now();

        match event {
            AppEvent::Tick => app.on_tick(now),
            AppEvent::Frame => app.fx.update(),
            AppEvent::Resize(width, height) => app.fx.resize(width, height),
            AppEvent::Key(key) => {
                if app.on_key(key, now) == Flow::Quit {
                    break;
                }
            }
        }

        // the countdown only ticks while the current session's timer runs
        runner.sync_ticks(app.controller.timer_active(), now);
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}
