use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use teloxide::types::ChatId;

use crate::collector::prompts::{DEFAULT_ENDPOINT, DEFAULT_INSTRUCTION};

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "BOT_TOKEN";

/// Settings file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "tildos.json";

/// Telegram tokens are `{bot_id}:{secret}` with a numeric bot id.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+:[A-Za-z0-9_-]+$").expect("token regex is valid"));

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the settings file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// `BOT_TOKEN` is unset or empty.
    MissingToken,
    /// `BOT_TOKEN` does not look like a bot token.
    InvalidToken,
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::MissingToken => write!(f, "{TOKEN_ENV} is not set"),
            Self::InvalidToken => write!(
                f,
                "{TOKEN_ENV} appears invalid (expected format: 123456789:ABCdefGHI...)"
            ),
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::MissingToken | Self::InvalidToken | Self::Validation(_) => None,
        }
    }
}

/// Labels of the inline menu buttons.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MenuLabels {
    /// Button under the welcome message.
    pub request_prompt: String,
    /// Button offered after a recording was received.
    pub request_again: String,
}

impl Default for MenuLabels {
    fn default() -> Self {
        Self {
            request_prompt: "🎙 Получить текст".to_string(),
            request_again: "🔁 Да, ещё текст".to_string(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    /// Base directory for relative paths and logs. Unset means paths stay
    /// relative to the working directory, e.g. `audio/42_7.wav`.
    data_dir: Option<String>,
    /// Where recordings are stored, relative to `data_dir` unless absolute.
    audio_dir: Option<String>,
    /// Registry JSON file, relative to `data_dir` unless absolute.
    registry_path: Option<String>,
    /// Put recordings into one subdirectory per UTC day.
    #[serde(default)]
    partition_by_date: bool,
    /// Send the user's recording back after it was attached.
    #[serde(default)]
    playback: bool,
    prompt_endpoint: Option<String>,
    prompt_instruction: Option<String>,
    ffmpeg_path: Option<String>,
    log_chat_id: Option<i64>,
    #[serde(default)]
    menu: MenuLabels,
}

pub struct Config {
    pub telegram_bot_token: String,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub registry_path: PathBuf,
    pub partition_by_date: bool,
    pub playback: bool,
    pub prompt_endpoint: String,
    pub prompt_instruction: String,
    pub ffmpeg_path: PathBuf,
    pub log_chat_id: Option<ChatId>,
    pub menu: MenuLabels,
}

impl Config {
    /// Load settings from `path` (or the default file if present) and the
    /// token from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let token = std::env::var(TOKEN_ENV).ok();
        match path {
            Some(path) => Self::from_parts(Some(path), token),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                Self::from_parts(default.exists().then_some(default), token)
            }
        }
    }

    pub fn from_parts(path: Option<&Path>, token: Option<String>) -> Result<Self, ConfigError> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;
        if !TOKEN_RE.is_match(&token) {
            return Err(ConfigError::InvalidToken);
        }

        let file = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                serde_json::from_str(&content).map_err(|e| ConfigError::ParseJson {
                    path: path.to_path_buf(),
                    source: e,
                })?
            }
            None => ConfigFile::default(),
        };

        let data_dir = file.data_dir.map(PathBuf::from).unwrap_or_default();
        let audio_dir = data_dir.join(file.audio_dir.as_deref().unwrap_or("audio"));
        let registry_path = data_dir.join(file.registry_path.as_deref().unwrap_or("records.json"));

        let prompt_endpoint = file.prompt_endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !prompt_endpoint.starts_with("http://") && !prompt_endpoint.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "prompt_endpoint must be an http(s) URL, got '{prompt_endpoint}'"
            )));
        }
        let prompt_instruction = file
            .prompt_instruction
            .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string());
        if prompt_instruction.trim().is_empty() {
            return Err(ConfigError::Validation("prompt_instruction must not be empty".into()));
        }
        if file.menu.request_prompt.is_empty() || file.menu.request_again.is_empty() {
            return Err(ConfigError::Validation("menu labels must not be empty".into()));
        }

        Ok(Self {
            telegram_bot_token: token,
            data_dir,
            audio_dir,
            registry_path,
            partition_by_date: file.partition_by_date,
            playback: file.playback,
            prompt_endpoint,
            prompt_instruction,
            ffmpeg_path: PathBuf::from(file.ffmpeg_path.unwrap_or_else(|| "ffmpeg".to_string())),
            log_chat_id: file.log_chat_id.map(ChatId),
            menu: file.menu,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TOKEN: &str = "123456789:ABCdefGHIjklMNOpqrsTUVwxyz";

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    fn token() -> Option<String> {
        Some(TOKEN.to_string())
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::from_parts(None, token()).expect("should load defaults");
        assert_eq!(config.telegram_bot_token, TOKEN);
        assert_eq!(config.data_dir, PathBuf::new());
        assert_eq!(config.audio_dir, PathBuf::from("audio"));
        assert_eq!(config.registry_path, PathBuf::from("records.json"));
        assert_eq!(config.data_dir.join("logs"), PathBuf::from("logs"));
        assert!(!config.partition_by_date);
        assert!(!config.playback);
        assert_eq!(config.prompt_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert!(config.log_chat_id.is_none());
    }

    #[test]
    fn test_file_overrides() {
        let file = write_config(r#"{
            "data_dir": "/srv/tildos",
            "audio_dir": "clips",
            "registry_path": "/var/lib/tildos/records.json",
            "partition_by_date": true,
            "playback": true,
            "log_chat_id": -100200300,
            "menu": { "request_prompt": "Start" }
        }"#);
        let config = Config::from_parts(Some(file.path()), token()).unwrap();
        assert_eq!(config.audio_dir, PathBuf::from("/srv/tildos/clips"));
        assert_eq!(config.registry_path, PathBuf::from("/var/lib/tildos/records.json"));
        assert!(config.partition_by_date);
        assert!(config.playback);
        assert_eq!(config.log_chat_id, Some(ChatId(-100200300)));
        assert_eq!(config.menu.request_prompt, "Start");
        assert_eq!(config.menu.request_again, MenuLabels::default().request_again);
    }

    #[test]
    fn test_missing_token() {
        let err = assert_err(Config::from_parts(None, None));
        assert!(matches!(err, ConfigError::MissingToken));
        assert!(err.to_string().contains(TOKEN_ENV));

        let err = assert_err(Config::from_parts(None, Some("   ".to_string())));
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn test_invalid_token_formats() {
        for bad in ["invalid_token_no_colon", "notanumber:ABCdef", "123456789:", "1:a:b"] {
            let err = assert_err(Config::from_parts(None, Some(bad.to_string())));
            assert!(matches!(err, ConfigError::InvalidToken), "accepted {bad}");
        }
    }

    #[test]
    fn test_bad_endpoint() {
        let file = write_config(r#"{ "prompt_endpoint": "ftp://example.org" }"#);
        let err = assert_err(Config::from_parts(Some(file.path()), token()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let file = write_config(r#"{ "playbak": true }"#);
        let err = assert_err(Config::from_parts(Some(file.path()), token()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::from_parts(Some(Path::new("/nonexistent/path/tildos.json")), token()));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::from_parts(Some(file.path()), token()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
