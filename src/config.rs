//! Layered configuration for blogsmith.
//!
//! Values are resolved file → environment → CLI. The file is an optional
//! `blogsmith.toml`:
//!
//! ```toml
//! [runtime]
//! kind = "gemini"            # or "echo"
//! model = "gemini-2.5-flash"
//! base_url = "https://generativelanguage.googleapis.com/v1beta"
//! max_tool_rounds = 5
//! request_timeout_secs = 120
//!
//! [pipeline]
//! research = 6000
//! outline = 6000
//! draft = 9000
//! critique = 9000
//!
//! [storage]
//! events_path = "logs/events.jsonl"
//! preferences_path = ".blogsmith/preferences.json"
//!
//! [identity]
//! app_name = "AI_BLOG_PRODUCTION_AGENT"
//! user_id = "cli_user"
//! session_id = "cli_session"
//! ```
//!
//! Environment variables (a `.env` file is loaded by the binary first):
//! `GOOGLE_API_KEY`, `GEMINI_MODEL_ID`, `APP_NAME`, `ENVIRONMENT`,
//! `DEBUG_MODE`, `BLOGSMITH_RUNTIME`.

use crate::agents::DEFAULT_MODEL;
use crate::audit::DEFAULT_EVENT_LOG;
use crate::errors::ConfigError;
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MAX_TOOL_ROUNDS};
use crate::orchestrator::CompactionLimits;
use crate::runtime::SessionIdentity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "blogsmith.toml";
pub const DEFAULT_APP_NAME: &str = "AI_BLOG_PRODUCTION_AGENT";
pub const DEFAULT_PREFERENCES_PATH: &str = ".blogsmith/preferences.json";
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Which agent runtime backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// Google Gemini over REST (needs `GOOGLE_API_KEY`)
    #[default]
    Gemini,
    /// Offline runtime that answers `OK:<agent>`
    Echo,
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeKind::Gemini => write!(f, "gemini"),
            RuntimeKind::Echo => write!(f, "echo"),
        }
    }
}

impl std::str::FromStr for RuntimeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(RuntimeKind::Gemini),
            "echo" => Ok(RuntimeKind::Echo),
            _ => Err(ConfigError::InvalidRuntime(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSection {
    #[serde(default)]
    pub kind: RuntimeKind,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_tool_rounds() -> u32 {
    DEFAULT_MAX_TOOL_ROUNDS
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            kind: RuntimeKind::default(),
            model: default_model(),
            base_url: default_base_url(),
            max_tool_rounds: default_max_tool_rounds(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_events_path")]
    pub events_path: PathBuf,
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
}

fn default_events_path() -> PathBuf {
    PathBuf::from(DEFAULT_EVENT_LOG)
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from(DEFAULT_PREFERENCES_PATH)
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
            preferences_path: default_preferences_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySection {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_user_id() -> String {
    "cli_user".to_string()
}

fn default_session_id() -> String {
    "cli_session".to_string()
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            user_id: default_user_id(),
            session_id: default_session_id(),
        }
    }
}

/// Contents of `blogsmith.toml`. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogsmithToml {
    #[serde(default)]
    pub runtime: RuntimeSection,
    #[serde(default)]
    pub pipeline: CompactionLimits,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub identity: IdentitySection,
}

impl BlogsmithToml {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Effective configuration after all layers are applied.
#[derive(Debug, Clone)]
pub struct Config {
    pub runtime: RuntimeSection,
    pub pipeline: CompactionLimits,
    pub storage: StorageSection,
    pub identity: IdentitySection,
    pub environment: String,
    pub debug_mode: bool,
    api_key: Option<String>,
}

impl Config {
    /// Load the file layer and overlay the process environment.
    ///
    /// An explicitly given `path` must exist; the default `blogsmith.toml`
    /// is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => BlogsmithToml::load(path)?,
            None => {
                let default = Path::new(CONFIG_FILE);
                if default.exists() {
                    BlogsmithToml::load(default)?
                } else {
                    BlogsmithToml::default()
                }
            }
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Overlay environment values from `env` on top of `file`.
    pub fn from_sources(
        file: BlogsmithToml,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut runtime = file.runtime;
        let mut identity = file.identity;
        if let Some(model) = env("GEMINI_MODEL_ID") {
            runtime.model = model;
        }
        if let Some(kind) = env("BLOGSMITH_RUNTIME") {
            runtime.kind = kind.parse()?;
        }
        if let Some(app_name) = env("APP_NAME") {
            identity.app_name = app_name;
        }

        Ok(Self {
            runtime,
            pipeline: file.pipeline,
            storage: file.storage,
            identity,
            environment: env("ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            debug_mode: env("DEBUG_MODE").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            api_key: env("GOOGLE_API_KEY"),
        })
    }

    /// The Gemini runtime needs an API key; the echo runtime needs nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.runtime.kind {
            RuntimeKind::Gemini => self.api_key().map(|_| ()),
            RuntimeKind::Echo => Ok(()),
        }
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.runtime.request_timeout_secs)
    }

    pub fn session_identity(&self) -> SessionIdentity {
        SessionIdentity::new(
            &self.identity.app_name,
            &self.identity.user_id,
            &self.identity.session_id,
        )
    }

    /// Render the effective configuration as TOML with the API key redacted.
    pub fn render_redacted(&self) -> Result<String, toml::ser::Error> {
        #[derive(Serialize)]
        struct Environment<'a> {
            environment: &'a str,
            debug_mode: bool,
            google_api_key: &'a str,
        }

        #[derive(Serialize)]
        struct View<'a> {
            runtime: &'a RuntimeSection,
            pipeline: &'a CompactionLimits,
            storage: &'a StorageSection,
            identity: &'a IdentitySection,
            env: Environment<'a>,
        }

        let view = View {
            runtime: &self.runtime,
            pipeline: &self.pipeline,
            storage: &self.storage,
            identity: &self.identity,
            env: Environment {
                environment: &self.environment,
                debug_mode: self.debug_mode,
                google_api_key: if self.has_api_key() {
                    "<redacted>"
                } else {
                    "<not set>"
                },
            },
        };
        toml::to_string_pretty(&view)
    }
}
