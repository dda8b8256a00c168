//! # Configuration
//!
//! TOML configuration for hosts embedding the mission runtime.
//!
//! ```toml
//! [definitions]
//! dir = "data/missions"
//! async_loading = true
//!
//! [engine]
//! primary_actor = "Player"
//! record_event_history = true
//!
//! [saves]
//! dir = "data/saves"
//! default_slot = "AutoSave"
//!
//! [logging]
//! level = "info"
//! file = "questline.log"
//! ```
//!
//! Every section and field is optional; missing values take the defaults
//! shown above.
//!
//! ```rust,no_run
//! use questline::config::{init_logging, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("questline.toml").await?;
//!     config.validate()?;
//!     init_logging(&config.logging, 0);
//!     Ok(())
//! }
//! ```

use std::str::FromStr;

use anyhow::{anyhow, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::mission::storage::DEFAULT_SLOT;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub definitions: DefinitionsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub saves: SavesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where mission definitions come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DefinitionsConfig {
    /// Directory holding one `<mission-id>.json` per mission.
    pub dir: String,
    /// Read definitions on the blocking pool. When false, loads run inline.
    pub async_loading: bool,
}

impl Default for DefinitionsConfig {
    fn default() -> Self {
        Self {
            dir: "data/missions".to_string(),
            async_loading: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Source identity kill counters attribute kills to.
    pub primary_actor: String,
    /// Keep per-tag event counts for rules that count past events.
    pub record_event_history: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_actor: "Player".to_string(),
            record_event_history: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SavesConfig {
    /// Sled database directory, opened by `SaveStore::from_config`.
    pub dir: String,
    /// Slot written by `MissionRuntime::autosave`.
    pub default_slot: String,
}

impl Default for SavesConfig {
    fn default() -> Self {
        Self {
            dir: "data/saves".to_string(),
            default_slot: DEFAULT_SLOT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| anyhow!("Unknown log level '{}'", self.level))
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.definitions.dir.trim().is_empty() {
            return Err(anyhow!("definitions.dir must not be empty"));
        }
        if self.saves.dir.trim().is_empty() {
            return Err(anyhow!("saves.dir must not be empty"));
        }
        if self.saves.default_slot.is_empty()
            || self.saves.default_slot.chars().any(|ch| ch.is_control())
        {
            return Err(anyhow!(
                "saves.default_slot '{}' is not a usable slot name",
                self.saves.default_slot.escape_default()
            ));
        }
        if self.engine.primary_actor.is_empty() {
            return Err(anyhow!("engine.primary_actor must not be empty"));
        }
        self.logging.level_filter()?;
        Ok(())
    }
}

/// Install the global logger.
///
/// `verbosity` raises the configured level (1 = debug, 2+ = trace). When a
/// log file is configured, lines are appended to it as well as written to
/// stderr. Calling this twice leaves the first logger in place.
pub fn init_logging(config: &LoggingConfig, verbosity: u8) {
    use std::io::Write;

    let configured = config.level_filter().unwrap_or(LevelFilter::Info);
    let level = match verbosity {
        0 => configured,
        1 => configured.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    let file = config.file.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("Failed to open log file {}: {}", path, e))
            .ok()
    });

    match file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                writeln!(fmt, "{}", line)
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }

    let _ = builder.try_init();
}
