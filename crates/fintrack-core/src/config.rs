//! Narrative generation configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, else the override in the data dir
//!    (~/.local/share/fintrack/config/narrative.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top:
//! - `OPENAI_API_KEY`: API credential for the remote service
//! - `FINTRACK_AI_HOST`: Base URL of an OpenAI-compatible server
//! - `FINTRACK_AI_MODEL`: Model name
//! - `FINTRACK_AI_TIMEOUT_SECS`: Bound on the remote call

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, GenerationUnavailable, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/narrative.toml");

/// Credential value shipped in sample configs; never sent to the service
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

pub const DEFAULT_HOST: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shortest key whose prefix may be displayed
const MASK_MIN_KEY_LEN: usize = 12;

/// Settings for the remote narrative generator
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub host: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NarrativeConfig {
    /// Load from file layers, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = load_config(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// The API key if it is usable for a real call
    ///
    /// Unset, blank, and placeholder keys all yield `None`.
    pub fn credential(&self) -> Option<&str> {
        usable_credential(self.api_key.as_deref()).ok()
    }

    pub fn is_placeholder(&self) -> bool {
        self.api_key.as_deref().map(str::trim) == Some(PLACEHOLDER_API_KEY)
    }

    /// API key for display: first 4 characters, the rest hidden
    ///
    /// Keys shorter than 12 characters are hidden entirely.
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            None => "(not set)".to_string(),
            Some(key) if self.is_placeholder() => format!("{} (placeholder)", key),
            Some(key) if key.chars().count() < MASK_MIN_KEY_LEN => "****".to_string(),
            Some(key) => {
                let visible: String = key.chars().take(4).collect();
                format!("{}****", visible)
            }
        }
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(host) = lookup("FINTRACK_AI_HOST") {
            self.host = host.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("FINTRACK_AI_MODEL") {
            self.model = model;
        }
        if let Some(secs) = lookup("FINTRACK_AI_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("FINTRACK_AI_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}

/// Check an API key before it is sent anywhere
///
/// Blank keys count as missing; the sample-config placeholder is rejected
/// separately so callers can report which case applies.
pub fn usable_credential(
    api_key: Option<&str>,
) -> std::result::Result<&str, GenerationUnavailable> {
    match api_key.map(str::trim) {
        None | Some("") => Err(GenerationUnavailable::MissingCredential),
        Some(PLACEHOLDER_API_KEY) => Err(GenerationUnavailable::PlaceholderCredential),
        Some(key) => Ok(key),
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fintrack").join("config").join("narrative.toml"))
}

fn load_config(path: Option<&Path>) -> Result<NarrativeConfig> {
    let override_path = path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    let content = match override_path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "Loading narrative config");
            fs::read_to_string(&p)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", p.display(), e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    remote: Option<RawRemote>,
}

#[derive(Debug, Deserialize)]
struct RawRemote {
    host: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

fn parse_config(content: &str) -> Result<NarrativeConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = NarrativeConfig::default();

    if let Some(remote) = raw.remote {
        if let Some(host) = remote.host {
            config.host = host.trim_end_matches('/').to_string();
        }
        if let Some(model) = remote.model {
            config.model = model;
        }
        config.api_key = remote.api_key;
        if let Some(max_tokens) = remote.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = remote.temperature {
            config.temperature = temperature;
        }
        if let Some(secs) = remote.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
    }

    Ok(config)
}
