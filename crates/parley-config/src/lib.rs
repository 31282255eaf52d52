//! Process configuration for parley.
//!
//! Settings are read once at startup from environment variables (after
//! `.env` has been loaded by the binary) and shared read-only afterwards:
//!
//! - [`Settings`] — Everything the server needs to run
//! - [`ModelAllowList`] — Model identifiers callers may request
//! - [`LlmSettings`] — OpenAI-compatible provider endpoint and key
//! - [`SearchSettings`] — Tavily endpoint and key
//! - [`ServerSettings`] — Bind address
//!
//! # Example
//!
//! ```rust
//! use parley_config::Settings;
//!
//! let settings = Settings::from_lookup(|key| match key {
//!     "ALLOWED_MODEL_NAMES" => Some("llama-3.3-70b-versatile".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert!(settings.allowed_models.contains("llama-3.3-70b-versatile"));
//! assert_eq!(settings.server.port, 9999);
//! ```

use std::fmt;
use std::net::SocketAddr;

use serde::Serialize;

pub const DEFAULT_ALLOWED_MODELS: &[&str] = &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"];
pub const DEFAULT_LLM_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_SEARCH_API_URL: &str = "https://api.tavily.com";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9999;

/// Errors that can occur when loading settings.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// The allow-list resolved to no models.
    #[error("ALLOWED_MODEL_NAMES must name at least one model")]
    EmptyAllowList,
}

/// The fixed set of model identifiers the service accepts.
///
/// Order is kept as configured so listings are stable; duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModelAllowList(Vec<String>);

impl ModelAllowList {
    /// Builds an allow-list from model names, trimming blanks and duplicates.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut models: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !models.iter().any(|m| m == name) {
                models.push(name.to_string());
            }
        }

        if models.is_empty() {
            return Err(ConfigError::EmptyAllowList);
        }
        Ok(Self(models))
    }

    /// Parses a comma-separated list such as `"a, b,c"`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Self::new(raw.split(','))
    }

    /// Returns true if the model may be requested.
    pub fn contains(&self, model: &str) -> bool {
        self.0.iter().any(|m| m == model)
    }

    /// Returns the configured model names in order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ModelAllowList {
    fn default() -> Self {
        Self(DEFAULT_ALLOWED_MODELS.iter().map(|s| s.to_string()).collect())
    }
}

/// OpenAI-compatible chat completion provider.
#[derive(Clone)]
pub struct LlmSettings {
    pub api_base: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Tavily web search provider.
#[derive(Clone)]
pub struct SearchSettings {
    pub api_url: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    /// Returns the address to bind, e.g. `0.0.0.0:9999`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "HOST".into(),
            value: self.host.clone(),
        })
    }
}

/// All process-wide settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub allowed_models: ModelAllowList,
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let allowed_models = match get("ALLOWED_MODEL_NAMES") {
            Some(raw) => ModelAllowList::parse(&raw)?,
            None => ModelAllowList::default(),
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let settings = Self {
            allowed_models,
            llm: LlmSettings {
                api_base: get("GROQ_API_BASE").unwrap_or_else(|| DEFAULT_LLM_API_BASE.into()),
                api_key: get("GROQ_API_KEY"),
            },
            search: SearchSettings {
                api_url: get("TAVILY_API_URL").unwrap_or_else(|| DEFAULT_SEARCH_API_URL.into()),
                api_key: get("TAVILY_API_KEY"),
            },
            server: ServerSettings {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
                port,
            },
        };

        if settings.llm.api_key.is_none() {
            tracing::warn!("GROQ_API_KEY is not set; chat requests will fail");
        }
        if settings.search.api_key.is_none() {
            tracing::warn!("TAVILY_API_KEY is not set; web search will be unavailable");
        }

        Ok(settings)
    }
}
