use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::history::Identity;
use crate::session::{Mode, SessionConfig};

/// Preferences remembered between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub time_limit_secs: u32,
    pub word_limit: u32,
    /// Locally signed-in name; `None` means guest.
    pub user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            time_limit_secs: 30,
            word_limit: 50,
            user: None,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> Result<SessionConfig> {
        match self.mode {
            Mode::Time => SessionConfig::timed(self.time_limit_secs),
            Mode::Words => SessionConfig::words(self.word_limit),
        }
    }

    /// Remember the last selected mode and its length.
    pub fn remember(&mut self, session: SessionConfig) {
        self.mode = session.mode;
        match session.mode {
            Mode::Time => self.time_limit_secs = session.length,
            Mode::Words => self.word_limit = session.length,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::from_name(self.user.as_deref())
    }

    pub fn sign_in(&mut self, name: &str) {
        if let Identity::User(name) = Identity::from_name(Some(name)) {
            self.user = Some(name);
        }
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Config>(&bytes).ok())
            .unwrap_or_default()
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
