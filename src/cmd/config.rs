//! Configuration view: `blogsmith config`.

use anyhow::{Context, Result};
use blogsmith::config::CONFIG_FILE;

use super::super::{Cli, ConfigCommands};

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            let config = super::load_config(cli)?;
            let source = match &cli.config {
                Some(path) => path.display().to_string(),
                None if std::path::Path::new(CONFIG_FILE).exists() => CONFIG_FILE.to_string(),
                None => "(defaults)".to_string(),
            };

            println!("# blogsmith configuration");
            println!("# file: {}", source);
            println!();
            print!(
                "{}",
                config
                    .render_redacted()
                    .context("Failed to render configuration")?
            );

            if let Err(e) = config.validate() {
                eprintln!();
                eprintln!("warning: {}", e);
            }
        }
    }
    Ok(())
}
