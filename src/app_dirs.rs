use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/snapkey`, or the platform data dir without HOME.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("snapkey"),
            )
        } else {
            ProjectDirs::from("", "", "snapkey").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("scores.db"))
            .unwrap_or_else(|| PathBuf::from("snapkey_scores.db"))
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("snapkey.log"))
            .unwrap_or_else(|| PathBuf::from("snapkey.log"))
    }
}
