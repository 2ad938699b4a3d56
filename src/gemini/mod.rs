//! Google Gemini `generateContent` backend.
//!
//! [`GeminiClient`] is a thin REST client; [`GeminiRuntime`] drives the
//! function-calling loop on top of it and exposes the result as an
//! [`AgentRuntime`](crate::runtime::AgentRuntime) event stream.

mod client;
mod runtime;
pub mod types;

pub use client::{DEFAULT_BASE_URL, GeminiClient};
pub use runtime::{DEFAULT_MAX_TOOL_ROUNDS, GeminiRuntime};
