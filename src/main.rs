use anyhow::Result;
use blogsmith::config::RuntimeKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;

#[derive(Parser)]
#[command(name = "blogsmith")]
#[command(version, about = "Multi-agent blog production pipeline")]
pub struct Cli {
    /// Debug logging and per-stage prompt sizes
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a blogsmith.toml (defaults to ./blogsmith.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run research → outline → draft → critique → SEO → evaluation for one topic
    Run(RunArgs),
    /// Read or update stored writing preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
    /// Show recent telemetry events
    Events {
        /// Number of most recent events to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// View configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Blog topic
    #[arg(long)]
    pub topic: Option<String>,

    /// Writing tone (default: stored preference, then Professional)
    #[arg(long)]
    pub tone: Option<String>,

    /// Target audience (default: stored preference, then beginner developers)
    #[arg(long)]
    pub audience: Option<String>,

    /// Target word count (default: stored preference, then 1500)
    #[arg(long)]
    pub word_count: Option<String>,

    /// Extra instructions for the research, outline and draft stages
    #[arg(long)]
    pub extra: Option<String>,

    /// Agent runtime: gemini or echo. Overrides config and BLOGSMITH_RUNTIME.
    #[arg(long)]
    pub runtime: Option<RuntimeKind>,

    #[arg(long)]
    pub user_id: Option<String>,

    #[arg(long)]
    pub session_id: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum PrefsCommands {
    /// Show a preference (session value first, then stored value)
    Get {
        key: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Store a preference
    Set { key: String, value: String },
    /// Append a value to a list preference
    Append { key: String, value: String },
    /// List all stored preferences
    List,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration (API key redacted)
    Show,
}

fn init_tracing(verbose: bool) {
    let debug = verbose
        || std::env::var("DEBUG_MODE").is_ok_and(|v| v.trim().eq_ignore_ascii_case("true"));
    let level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("blogsmith={}", level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run(args) => cmd::cmd_run(&cli, args).await?,
        Commands::Prefs { command } => cmd::cmd_prefs(&cli, command)?,
        Commands::Events { limit } => cmd::cmd_events(&cli, *limit)?,
        Commands::Config { command } => cmd::cmd_config(&cli, command.clone())?,
    }

    Ok(())
}
