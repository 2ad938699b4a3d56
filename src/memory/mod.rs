//! Shared preference memory.
//!
//! Two independent tiers, each behind its own lock:
//! - [`PreferenceStore`]: process-wide key/value memory (tone, audience,
//!   preferred_word_count, blog_history, seo_keywords, ...)
//! - [`SessionOverlay`]: per-session values that shadow the process-wide
//!   value on lookup by key
//!
//! Both are constructed once by the entry point and shared by reference
//! (`Arc`) with the tools and front ends that need them. Nothing syncs the two
//! tiers except the preference tool, which writes both on `set`.

mod session;
mod store;

pub use session::SessionOverlay;
pub use store::PreferenceStore;

/// Session id used when a caller does not supply one.
pub const DEFAULT_SESSION_ID: &str = "default_session";
