//! Application-level configuration loading, including the session directory.

use std::{collections::HashMap, env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::schedule::model::{Role, User};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LEMS_CONFIG_PATH";
const DEFAULT_ROOM_CAPACITY: usize = 64;
const DEFAULT_LOGIN_PATH: &str = "/login";

/// Viewers known to the server, keyed by their bearer token.
#[derive(Debug, Clone, Default)]
pub struct SessionDirectory {
    sessions: HashMap<String, User>,
}

impl SessionDirectory {
    /// Directory over `sessions`, keyed by token.
    pub fn new(sessions: HashMap<String, User>) -> Self {
        Self { sessions }
    }

    /// Look up the viewer owning `token`.
    pub fn resolve(&self, token: &str) -> Option<&User> {
        self.sessions.get(token)
    }

    /// Number of known sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is configured.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    sessions: SessionDirectory,
    room_capacity: usize,
    login_path: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        sessions = app_config.sessions.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Viewers allowed to open pages.
    pub fn sessions(&self) -> &SessionDirectory {
        &self.sessions
    }

    /// Buffer size of each event room channel.
    pub fn room_capacity(&self) -> usize {
        self.room_capacity
    }

    /// Where viewers are sent when a page cannot be loaded.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sessions: SessionDirectory::default(),
            room_capacity: DEFAULT_ROOM_CAPACITY,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    sessions: Vec<RawSession>,
    room_capacity: Option<usize>,
    login_path: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let sessions = value
            .sessions
            .into_iter()
            .map(|raw| {
                let user = User {
                    username: raw.username,
                    event: raw.event,
                    role: raw.role,
                    is_admin: raw.is_admin,
                };
                (raw.token, user)
            })
            .collect();

        Self {
            sessions: SessionDirectory::new(sessions),
            room_capacity: value.room_capacity.unwrap_or(DEFAULT_ROOM_CAPACITY),
            login_path: value
                .login_path
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single session entry inside the configuration file.
struct RawSession {
    token: String,
    username: String,
    event: Uuid,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    is_admin: bool,
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
