use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "../frontend/dist";
pub const DEFAULT_DOTENV_PATHS: [&str; 2] = [".env", "../.env"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not set")]
    MissingApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl MorphConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match read("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                log::warn!("ignoring invalid PORT value {raw:?}; using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            api_key: read("GEMINI_API_KEY"),
            model: read("GEMINI_MODEL").unwrap_or(defaults.model),
            api_base: read("GEMINI_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.api_base),
            port,
            static_dir: read("MORPH_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }

    pub fn with_model(mut self, model: Option<&str>) -> Self {
        if let Some(model) = model.map(str::trim).filter(|value| !value.is_empty()) {
            self.model = model.to_string();
        }
        self
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

pub fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for raw_line in content.lines() {
        let mut line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("export ") {
            line = stripped.trim();
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let mut value = value.trim();
        if value.len() >= 2 {
            let bytes = value.as_bytes();
            let first = bytes[0];
            if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
                value = &value[1..value.len() - 1];
            }
        }
        vars.insert(key.to_string(), value.to_string());
    }
    vars
}

/// Exports the file's variables into the process environment. Variables
/// that are already set keep their current value. Returns how many were
/// applied.
pub fn load_dotenv(path: &Path) -> Result<usize> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var_os(&key).is_some() {
            continue;
        }
        env::set_var(&key, value);
        applied += 1;
    }
    Ok(applied)
}

pub fn load_default_dotenv() -> Option<PathBuf> {
    for candidate in DEFAULT_DOTENV_PATHS {
        let path = Path::new(candidate);
        if !path.is_file() {
            continue;
        }
        match load_dotenv(path) {
            Ok(applied) => {
                log::debug!("loaded {applied} variables from {}", path.display());
                return Some(path.to_path_buf());
            }
            Err(err) => log::warn!("{err:#}"),
        }
    }
    None
}
