use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const SESSION_DIR: &str = "tournament_admin";
const SESSION_FILE: &str = "session.json";

/// Values the surrounding admin app leaves behind for this screen.
/// Never written from here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "selectedTournamentId", default)]
    pub selected_tournament_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl Session {
    pub fn tournament_id(&self) -> Option<&str> {
        self.selected_tournament_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone)]
pub enum SessionStore {
    /// Re-read on every `load` so changes made elsewhere are picked up.
    File(Option<PathBuf>),
    Fixed(Session),
}

impl SessionStore {
    pub fn from_override(path: Option<PathBuf>) -> Self {
        Self::File(path.or_else(default_session_path))
    }

    pub fn load(&self) -> Session {
        match self {
            Self::File(Some(path)) => load_session_file(path),
            Self::File(None) => Session::default(),
            Self::Fixed(session) => session.clone(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(Some(path)) => path.display().to_string(),
            Self::File(None) => "<no session path>".to_string(),
            Self::Fixed(_) => "<in-memory session>".to_string(),
        }
    }
}

fn load_session_file(path: &Path) -> Session {
    let Ok(raw) = fs::read_to_string(path) else {
        return Session::default();
    };
    serde_json::from_str::<Session>(&raw).unwrap_or_default()
}

fn default_session_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(SESSION_DIR).join(SESSION_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(SESSION_DIR)
            .join(SESSION_FILE),
    )
}
