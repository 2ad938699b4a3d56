//! Typed error hierarchy for blogsmith.
//!
//! Three enums cover the three failure surfaces:
//! - `RuntimeError`: the external agent runtime (transport, protocol, tool loop)
//! - `InvokeError`: the two fail-soft outcomes of a single agent invocation
//! - `ConfigError`: configuration loading and validation

use thiserror::Error;

/// Literal payload returned when an agent produced no final text.
pub const NO_FINAL_RESPONSE: &str = "Error: No final response from agent.";

/// Errors raised by an agent runtime while submitting a message or draining
/// its response stream.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("runtime returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode runtime response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("agent {agent} exceeded {rounds} tool rounds without a final response")]
    ToolRoundsExhausted { agent: String, rounds: u32 },

    #[error("response stream failed: {0}")]
    Stream(String),
}

/// Failure outcomes of one agent invocation.
///
/// Neither variant ever escapes the orchestrator: `payload()` converts each one
/// into the string that is threaded forward as the stage output.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Error running {agent}: {source}")]
    Transport {
        agent: String,
        #[source]
        source: RuntimeError,
    },

    #[error("{}", NO_FINAL_RESPONSE)]
    EmptyResponse,
}

impl InvokeError {
    /// The literal text substituted for the stage output.
    pub fn payload(&self) -> String {
        self.to_string()
    }

    /// Event-log step name under which this failure is recorded.
    pub fn step(&self) -> &'static str {
        match self {
            InvokeError::Transport { .. } => "run_exception",
            InvokeError::EmptyResponse => "run",
        }
    }
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Missing GOOGLE_API_KEY in environment. Please create a .env file and set GOOGLE_API_KEY="
    )]
    MissingApiKey,

    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid runtime '{0}'. Valid values: gemini, echo")]
    InvalidRuntime(String),
}
