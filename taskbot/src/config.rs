//! Configuration system for the task bot.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskbot/config.toml`)
//! 4. Compiled defaults

use std::path::PathBuf;

use tokio::time::Duration;

/// Errors that can occur when loading bot configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure for the bot.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BotConfigFile {
    bot: BotFileConfig,
    jobs: JobsFileConfig,
}

/// `[bot]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BotFileConfig {
    guild: Option<String>,
    data_dir: Option<PathBuf>,
    status_channel: Option<String>,
    prefixes: Option<Vec<String>>,
    confirm_timeout_secs: Option<u64>,
}

/// `[jobs]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct JobsFileConfig {
    ping_interval_secs: Option<u64>,
    digest_interval_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments for the bot.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Chat-platform task management bot")]
pub struct BotCliArgs {
    /// Platform bot token. Not accepted in the config file.
    #[arg(long, env = "TASKBOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Platform guild (server) id the bot serves.
    #[arg(long, env = "TASKBOT_GUILD")]
    pub guild: Option<String>,

    /// Directory holding the task and team JSON files.
    #[arg(short, long, env = "TASKBOT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskbot/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Channel the periodic jobs post to.
    #[arg(long)]
    pub status_channel: Option<String>,

    /// Command prefix; repeat the flag to accept several.
    #[arg(long = "prefix")]
    pub prefixes: Vec<String>,

    /// Seconds between liveness pings.
    #[arg(long)]
    pub ping_interval_secs: Option<u64>,

    /// Seconds between task digests.
    #[arg(long)]
    pub digest_interval_secs: Option<u64>,

    /// Seconds a destructive command waits for confirmation.
    #[arg(long)]
    pub confirm_timeout_secs: Option<u64>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOT_LOG")]
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Platform bot token, when connecting to a real platform.
    pub token: Option<String>,
    /// Platform guild (server) id, when connecting to a real platform.
    pub guild: Option<String>,
    /// Directory holding `tasks.json` and `teams.json`.
    pub data_dir: PathBuf,
    /// Channel the periodic jobs post to.
    pub status_channel: String,
    /// Accepted command prefixes, tried in order.
    pub prefixes: Vec<String>,
    /// Interval between liveness pings.
    pub ping_interval: Duration,
    /// Interval between task digests.
    pub digest_interval: Duration,
    /// How long a destructive command waits for confirmation.
    pub confirm_timeout: Duration,
    /// Log level filter string.
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            guild: None,
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("taskbot"),
            status_channel: "status".to_string(),
            prefixes: vec!["!".to_string(), String::new()],
            ping_interval: Duration::from_secs(300),
            digest_interval: Duration::from_secs(86_400),
            confirm_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

impl BotConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and a missing
    /// file is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed.
    pub fn load(cli: &BotCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `BotConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &BotCliArgs, file: &BotConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            token: cli.token.clone(),
            guild: cli.guild.clone().or_else(|| file.bot.guild.clone()),
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| file.bot.data_dir.clone())
                .unwrap_or(defaults.data_dir),
            status_channel: cli
                .status_channel
                .clone()
                .or_else(|| file.bot.status_channel.clone())
                .unwrap_or(defaults.status_channel),
            prefixes: if cli.prefixes.is_empty() {
                file.bot.prefixes.clone().unwrap_or(defaults.prefixes)
            } else {
                cli.prefixes.clone()
            },
            ping_interval: cli
                .ping_interval_secs
                .or(file.jobs.ping_interval_secs)
                .map_or(defaults.ping_interval, Duration::from_secs),
            digest_interval: cli
                .digest_interval_secs
                .or(file.jobs.digest_interval_secs)
                .map_or(defaults.digest_interval, Duration::from_secs),
            confirm_timeout: cli
                .confirm_timeout_secs
                .or(file.bot.confirm_timeout_secs)
                .map_or(defaults.confirm_timeout, Duration::from_secs),
            log_level: cli.log_level.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file for the bot.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<BotConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(BotConfigFile::default());
        };
        config_dir.join("taskbot").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BotConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
