use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{JokesError, Result};

// Wire and storage constants: persisted installs depend on these names.
pub const DEFAULT_BASE_URL: &str = "https://api.chucknorris.io";
pub const RANDOM_JOKE_PATH: &str = "/jokes/random";
pub const DEFAULT_NAMESPACE: &str = "app_preferences";
pub const JOKE_KEY: &str = "JOKE_KEY_PREFS";
pub const TIMER_KEY: &str = "TIMER";
pub const DEFAULT_INTERVAL_MS: u64 = 300_000; // five minutes between scheduled refreshes
pub const DEFAULT_TICK_MS: u64 = 1_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Something went wrong. Try again later.";

/// Top-level config (jokes.toml + JOKES_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JokesConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Remote joke endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout enforced by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Countdown cadence. Override with JOKES_TIMER__INTERVAL_MS / JOKES_TIMER__TICK_MS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl TimerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Application-scoped prefix for every stored key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            namespace: default_namespace(),
        }
    }
}

impl StorageConfig {
    /// Database path with a leading `~/` expanded to $HOME.
    pub fn resolved_path(&self) -> String {
        match self.path.strip_prefix("~/") {
            Some(rest) => {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                format!("{}/{}", home, rest)
            }
            None => self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Shown when no joke could ever be obtained.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fallback_message: default_fallback_message(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    format!("jokes/{}", env!("CARGO_PKG_VERSION"))
}
fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}
fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}
fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jokes/jokes.db", home)
}

impl JokesConfig {
    /// Load config from a TOML file with JOKES_* env var overrides.
    ///
    /// Path resolution: explicit argument, then ~/.jokes/jokes.toml.
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(%path, "loading config");

        let config: JokesConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("JOKES_").split("__"))
            .extract()
            .map_err(|e| JokesError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.timer.tick_ms == 0 {
            return Err(JokesError::Config("timer.tick_ms must be > 0".into()));
        }
        if self.timer.interval_ms == 0 {
            return Err(JokesError::Config("timer.interval_ms must be > 0".into()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(JokesError::Config("api.base_url must not be empty".into()));
        }
        Ok(())
    }

    /// Full URL of the random-joke resource.
    pub fn joke_url(&self) -> String {
        format!(
            "{}{}",
            self.api.base_url.trim_end_matches('/'),
            RANDOM_JOKE_PATH
        )
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jokes/jokes.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_original_cadence() {
        let cfg = JokesConfig::default();
        assert_eq!(cfg.timer.interval_ms, 300_000);
        assert_eq!(cfg.timer.tick_ms, 1_000);
        assert_eq!(cfg.storage.namespace, "app_preferences");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn joke_url_strips_trailing_slash() {
        let mut cfg = JokesConfig::default();
        cfg.api.base_url = "http://localhost:8080/".to_string();
        assert_eq!(cfg.joke_url(), "http://localhost:8080/jokes/random");
    }

    #[test]
    fn storage_path_expands_home() {
        let storage = StorageConfig {
            path: "~/.jokes/jokes.db".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        };
        let resolved = storage.resolved_path();
        assert!(!resolved.starts_with('~'));
        assert!(resolved.ends_with("/.jokes/jokes.db"));

        let absolute = StorageConfig {
            path: "/tmp/jokes.db".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        };
        assert_eq!(absolute.resolved_path(), "/tmp/jokes.db");
    }

    #[test]
    fn zero_tick_is_rejected() {
        let mut cfg = JokesConfig::default();
        cfg.timer.tick_ms = 0;
        assert!(matches!(cfg.validate(), Err(JokesError::Config(_))));
    }

    #[test]
    fn load_reads_toml_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[timer]\ninterval_ms = 5000\ntick_ms = 500\n\n[display]\nfallback_message = \"nope\""
        )
        .unwrap();

        let cfg = JokesConfig::load(file.path().to_str()).unwrap();
        assert_eq!(cfg.timer.interval_ms, 5000);
        assert_eq!(cfg.timer.tick_ms, 500);
        assert_eq!(cfg.display.fallback_message, "nope");
        // untouched sections keep their defaults
        assert_eq!(cfg.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let cfg = JokesConfig::load(Some("/nonexistent/jokes.toml")).unwrap();
        assert_eq!(cfg.timer.interval_ms, DEFAULT_INTERVAL_MS);
    }
}
