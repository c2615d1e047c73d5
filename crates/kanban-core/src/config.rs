use crate::error::KanbanError;
use crate::result::KanbanResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost/wordpress";

/// Deadline for a whole exchange; hitting it counts as an unreachable service.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn default_timeout() -> Duration {
    REQUEST_TIMEOUT
}

/// Where and how to reach the remote content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(skip, default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Basic auth is only enabled when both halves are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// File section mirroring [`RemoteConfig`] with every field optional so a
/// partial file can be layered under environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordPressSection {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub wordpress: WordPressSection,
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/kanban/wordpress.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("kanban/wordpress.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("kanban\\wordpress.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load the config file, falling back to defaults when it is missing or
    /// unreadable. A malformed file is logged, never fatal.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> KanbanResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| KanbanError::Config(e.to_string()))
    }

    /// Resolve the effective remote settings. Explicit values (usually from
    /// environment variables) win over the file.
    pub fn remote(
        &self,
        base_url: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> RemoteConfig {
        RemoteConfig {
            base_url: base_url
                .or_else(|| self.wordpress.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            username: username.or_else(|| self.wordpress.username.clone()),
            password: password.or_else(|| self.wordpress.password.clone()),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn effective_state_dir(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit
            .or_else(|| self.state_dir.clone())
            .or_else(|| dirs::data_dir().map(|d| d.join("kanban").join("wordpress")))
    }
}
