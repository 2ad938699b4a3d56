//! CLI command implementations.
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `run`     | `Run`            |
//! | `prefs`   | `Prefs`          |
//! | `events`  | `Events`         |
//! | `config`  | `Config`         |

pub mod config;
pub mod events;
pub mod prefs;
pub mod run;

pub use config::cmd_config;
pub use events::cmd_events;
pub use prefs::cmd_prefs;
pub use run::cmd_run;

use anyhow::{Context, Result};
use blogsmith::config::Config;

use super::Cli;

/// Resolve configuration from `--config`, the environment and defaults.
pub(crate) fn load_config(cli: &Cli) -> Result<Config> {
    Config::load(cli.config.as_deref()).context("Failed to load configuration")
}
