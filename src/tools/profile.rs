use super::{Tool, str_arg};
use crate::memory::{DEFAULT_SESSION_ID, PreferenceStore, SessionOverlay};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Operation requested from the profile tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAction {
    Get,
    Set,
    Append,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid action. Must be 'get', 'set', or 'append'.")]
pub struct InvalidAction;

impl FromStr for ProfileAction {
    type Err = InvalidAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "get" => Ok(ProfileAction::Get),
            "set" => Ok(ProfileAction::Set),
            "append" => Ok(ProfileAction::Append),
            _ => Err(InvalidAction),
        }
    }
}

/// Stores and retrieves writing preferences (tone, audience, history, ...).
///
/// `get` prefers the session value, then the process-wide value. `set`
/// writes both tiers; `append` only extends the process-wide list.
pub struct UserProfileTool {
    store: Arc<PreferenceStore>,
    sessions: Arc<SessionOverlay>,
}

impl UserProfileTool {
    pub fn new(store: Arc<PreferenceStore>, sessions: Arc<SessionOverlay>) -> Self {
        Self { store, sessions }
    }

    /// Untyped entry point: validates the raw action and key first.
    pub fn execute(
        &self,
        action: &str,
        key: &str,
        value: Option<Value>,
        session_id: Option<&str>,
    ) -> String {
        let key = key.trim();
        if action.trim().is_empty() || key.is_empty() {
            return "Error: 'action' and 'key' fields are required.".to_string();
        }
        match action.parse::<ProfileAction>() {
            Ok(action) => self.apply(action, key, value, session_id),
            Err(e) => format!("Error: {}", e),
        }
    }

    pub fn apply(
        &self,
        action: ProfileAction,
        key: &str,
        value: Option<Value>,
        session_id: Option<&str>,
    ) -> String {
        let session_id = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION_ID);
        let value = value.unwrap_or(Value::Null);

        match action {
            ProfileAction::Get => {
                let found = self
                    .sessions
                    .lookup(session_id, key)
                    .filter(|v| !v.is_null())
                    .or_else(|| self.store.lookup(key))
                    .filter(|v| !v.is_null());
                found.as_ref().map(render).unwrap_or_else(|| "None".to_string())
            }
            ProfileAction::Set => {
                self.store.set(key, value.clone());
                self.sessions.set(session_id, key, value.clone());
                format!("Stored {} = {}", key, render(&value))
            }
            ProfileAction::Append => {
                self.store.append(key, value.clone());
                format!("Appended to {}: {}", key, render(&value))
            }
        }
    }
}

/// Strings render bare, null as `None`, everything else as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Tool for UserProfileTool {
    fn name(&self) -> &'static str {
        "user_profile_tool"
    }

    fn description(&self) -> &'static str {
        "Stores and retrieves user writing preferences, tone, audience, and history."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {"type": "string", "enum": ["get", "set", "append"]},
                "key": {"type": "string", "description": "Preference key, e.g. tone or audience."},
                "value": {"type": "string", "description": "Value used by set and append."},
                "session_id": {"type": "string", "description": "Session identifier for overrides."}
            },
            "required": ["action", "key"]
        })
    }

    async fn call(&self, args: &Value) -> String {
        let session_id = str_arg(args, "session_id");
        self.execute(
            str_arg(args, "action"),
            str_arg(args, "key"),
            args.get("value").cloned(),
            Some(session_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> (UserProfileTool, Arc<PreferenceStore>, Arc<SessionOverlay>) {
        let store = Arc::new(PreferenceStore::new());
        let sessions = Arc::new(SessionOverlay::new());
        let tool = UserProfileTool::new(Arc::clone(&store), Arc::clone(&sessions));
        (tool, store, sessions)
    }

    #[test]
    fn action_parsing_is_case_insensitive() {
        assert_eq!("GET".parse::<ProfileAction>(), Ok(ProfileAction::Get));
        assert_eq!(" Append ".parse::<ProfileAction>(), Ok(ProfileAction::Append));
        assert_eq!("delete".parse::<ProfileAction>(), Err(InvalidAction));
    }

    #[test]
    fn missing_action_or_key_is_rejected() {
        let (tool, _, _) = tool();
        let expected = "Error: 'action' and 'key' fields are required.";
        assert_eq!(tool.execute("", "tone", None, None), expected);
        assert_eq!(tool.execute("get", "  ", None, None), expected);
    }

    #[test]
    fn invalid_action_is_rejected() {
        let (tool, _, _) = tool();
        assert_eq!(
            tool.execute("delete", "tone", None, None),
            "Error: Invalid action. Must be 'get', 'set', or 'append'."
        );
    }

    #[test]
    fn get_of_unknown_key_is_none_literal() {
        let (tool, _, _) = tool();
        assert_eq!(tool.execute("get", "tone", None, None), "None");
    }

    #[test]
    fn set_writes_both_tiers() {
        let (tool, store, sessions) = tool();
        let out = tool.execute("set", "tone", Some(json!("Casual")), Some("s1"));
        assert_eq!(out, "Stored tone = Casual");
        assert_eq!(store.lookup("tone"), Some(json!("Casual")));
        assert_eq!(sessions.lookup("s1", "tone"), Some(json!("Casual")));
    }

    #[test]
    fn get_prefers_session_value() {
        let (tool, store, sessions) = tool();
        store.set("tone", "Professional");
        sessions.set("s1", "tone", "Playful");
        assert_eq!(tool.execute("get", "tone", None, Some("s1")), "Playful");
        assert_eq!(tool.execute("get", "tone", None, Some("s2")), "Professional");
    }

    #[test]
    fn blank_session_falls_back_to_default_session() {
        let (tool, _, sessions) = tool();
        tool.execute("set", "audience", Some(json!("students")), Some(""));
        assert_eq!(
            sessions.lookup(DEFAULT_SESSION_ID, "audience"),
            Some(json!("students"))
        );
    }

    #[test]
    fn append_touches_only_process_store() {
        let (tool, store, sessions) = tool();
        assert_eq!(
            tool.execute("append", "seo_keywords", Some(json!("rust")), Some("s1")),
            "Appended to seo_keywords: rust"
        );
        tool.execute("append", "seo_keywords", Some(json!("tokio")), Some("s1"));
        assert_eq!(store.lookup("seo_keywords"), Some(json!(["rust", "tokio"])));
        assert_eq!(sessions.lookup("s1", "seo_keywords"), None);
        assert_eq!(
            tool.execute("get", "seo_keywords", None, Some("s1")),
            r#"["rust","tokio"]"#
        );
    }

    #[tokio::test]
    async fn call_reads_json_arguments() {
        let (tool, store, _) = tool();
        let out = tool
            .call(&json!({"action": "set", "key": "tone", "value": "Witty"}))
            .await;
        assert_eq!(out, "Stored tone = Witty");
        assert_eq!(store.lookup("tone"), Some(json!("Witty")));
    }
}
