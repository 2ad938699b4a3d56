//! Preference management: `blogsmith prefs`.

use anyhow::Result;
use blogsmith::memory::{PreferenceStore, SessionOverlay};
use blogsmith::tools::UserProfileTool;
use serde_json::Value;
use std::sync::Arc;

use super::super::{Cli, PrefsCommands};

pub fn cmd_prefs(cli: &Cli, command: &PrefsCommands) -> Result<()> {
    let config = super::load_config(cli)?;
    let path = &config.storage.preferences_path;
    let store = Arc::new(PreferenceStore::load(path)?);
    let tool = UserProfileTool::new(Arc::clone(&store), Arc::new(SessionOverlay::new()));

    match command {
        PrefsCommands::Get { key, session } => {
            println!("{}", tool.execute("get", key, None, session.as_deref()));
        }
        PrefsCommands::Set { key, value } => {
            let out = tool.execute("set", key, Some(Value::from(value.as_str())), None);
            store.save(path)?;
            println!("{}", out);
        }
        PrefsCommands::Append { key, value } => {
            let out = tool.execute("append", key, Some(Value::from(value.as_str())), None);
            store.save(path)?;
            println!("{}", out);
        }
        PrefsCommands::List => {
            let entries = store.snapshot();
            if entries.is_empty() {
                println!("No preferences stored.");
            }
            for (key, value) in entries {
                println!("{} = {}", key, value);
            }
        }
    }
    Ok(())
}
