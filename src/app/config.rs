use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_AUDIO_DIR, DEFAULT_CHAT_MODEL, DEFAULT_GROQ_API_KEY_ENV, DEFAULT_GROQ_API_URL,
    DEFAULT_HOST, DEFAULT_MAX_HISTORY_MESSAGES, DEFAULT_MAX_TOKENS, DEFAULT_PORT,
    DEFAULT_TEMPERATURE, DEFAULT_TTS_LANGUAGE, DEFAULT_TTS_URL, DEFAULT_WHISPER_MODEL,
    GENERAL_PROMPT, HTTP_REQUEST_TIMEOUT_SECS, JOBSEARCH_PROMPT, TASK_PROMPT,
};
use crate::session::ChatMode;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Groq (chat completion + Whisper) provider
    #[serde(default)]
    pub groq: GroqConfig,

    /// Generation parameters and history windowing
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Text-to-speech and audio storage
    #[serde(default)]
    pub speech: SpeechConfig,

    /// System prompt per mode, keyed by mode name
    #[serde(default = "default_prompts")]
    pub prompts: BTreeMap<String, String>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Groq configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Base URL of the OpenAI-compatible API
    pub api_url: String,
    /// Environment variable containing API key
    pub api_key_env: String,
    /// Chat completion model
    pub chat_model: String,
    /// Speech-to-text model
    pub whisper_model: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GROQ_API_URL.to_string(),
            api_key_env: DEFAULT_GROQ_API_KEY_ENV.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            whisper_model: DEFAULT_WHISPER_MODEL.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl GroqConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// How many stored messages are replayed into each request
    pub max_history_messages: usize,
    /// Optional cap on stored messages per user (unbounded when unset)
    pub max_stored_messages: Option<usize>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
            max_stored_messages: None,
        }
    }
}

/// Speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Language code for synthesized speech
    pub language: String,
    /// Translate TTS endpoint
    pub tts_url: String,
    /// Directory where synthesized responses are written
    pub audio_dir: PathBuf,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_TTS_LANGUAGE.to_string(),
            tts_url: DEFAULT_TTS_URL.to_string(),
            audio_dir: PathBuf::from(DEFAULT_AUDIO_DIR),
        }
    }
}

fn default_prompts() -> BTreeMap<String, String> {
    BTreeMap::from([
        (ChatMode::Task.as_str().to_string(), TASK_PROMPT.to_string()),
        (
            ChatMode::JobSearch.as_str().to_string(),
            JOBSEARCH_PROMPT.to_string(),
        ),
        (
            ChatMode::General.as_str().to_string(),
            GENERAL_PROMPT.to_string(),
        ),
    ])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            groq: GroqConfig::default(),
            generation: GenerationSettings::default(),
            speech: SpeechConfig::default(),
            prompts: default_prompts(),
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    } else {
        let global_config = get_config_dir()?.join("config.toml");
        let local_config = PathBuf::from(".parley/config.toml");

        // Add global config if it exists
        if global_config.exists() {
            figment = figment.merge(Toml::file(&global_config));
        }

        // Add local config if it exists
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }
    }

    // Add environment variables (PARLEY_ prefix, `__` for nesting)
    figment = figment.merge(Env::prefixed("PARLEY_").split("__"));

    let config: Config = figment.extract().context("Failed to load configuration")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.generation.max_history_messages == 0 {
        anyhow::bail!("generation.max_history_messages must be at least 1");
    }
    if let Some(max) = config.generation.max_stored_messages {
        if max < config.generation.max_history_messages {
            anyhow::bail!(
                "generation.max_stored_messages ({}) is smaller than max_history_messages ({})",
                max,
                config.generation.max_history_messages
            );
        }
    }
    for key in config.prompts.keys() {
        key.parse::<ChatMode>()
            .with_context(|| format!("Unknown mode '{}' in [prompts]", key))?;
    }
    Ok(())
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "parley") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("parley"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<PathBuf> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(path)
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<Option<PathBuf>> {
    let config_file = get_config_dir()?.join("config.toml");

    if config_file.exists() {
        return Ok(None);
    }

    save_config(&Config::default(), Some(config_file)).map(Some)
}
