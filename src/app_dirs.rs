use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typemaster";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// `$HOME/.local/state/typemaster`, or the platform data dir without a HOME.
    pub fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else if let Some(proj_dirs) = Self::project() {
            proj_dirs.data_local_dir().to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }

    pub fn config_path() -> PathBuf {
        match Self::project() {
            Some(pd) => pd.config_dir().join("config.json"),
            None => PathBuf::from("typemaster_config.json"),
        }
    }

    pub fn history_db_path() -> PathBuf {
        Self::state_dir().join("history.db")
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join("typemaster.log")
    }

    /// Default destination for CSV exports from the results screen.
    pub fn export_path(identity_key: &str) -> PathBuf {
        let safe: String = identity_key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        Self::state_dir().join(format!("history-{safe}.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert!(AppDirs::history_db_path().ends_with("history.db"));
        assert!(AppDirs::log_path().ends_with("typemaster.log"));
        assert!(AppDirs::config_path().ends_with("config.json"));
    }

    #[test]
    fn test_export_path_is_sanitized() {
        let path = AppDirs::export_path("user:a b");
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("history-user_a_b.csv")
        );
    }
}
