//! Recent telemetry: `blogsmith events`.

use anyhow::Result;
use blogsmith::audit::{Event, read_events};
use chrono::{DateTime, Local};
use console::style;

use super::super::Cli;

pub fn cmd_events(cli: &Cli, limit: usize) -> Result<()> {
    let config = super::load_config(cli)?;
    let path = &config.storage.events_path;
    let events = read_events(path, limit)?;

    if events.is_empty() {
        println!("No events recorded in {}", path.display());
        return Ok(());
    }

    for event in &events {
        println!("{}", format_event(event));
    }
    Ok(())
}

fn format_event(event: &Event) -> String {
    let when = DateTime::from_timestamp_micros((event.timestamp * 1_000_000.0) as i64)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{:.3}", event.timestamp));

    let kind = event.event_type.to_string();
    let kind = if event.is_error() {
        style(kind).red().bold()
    } else {
        style(kind).green()
    };

    let mut line = format!(
        "{} {:<10} {:<17} {:<14}",
        style(when).dim(),
        kind,
        event.agent.as_deref().unwrap_or("-"),
        event.step.as_deref().unwrap_or("-"),
    );
    if let Some(duration) = event.duration_seconds {
        line.push_str(&format!(" {:>7.2}s", duration));
    }
    if let Some(message) = &event.message {
        line.push_str(&format!("  {}", first_line(message)));
    }
    line
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
