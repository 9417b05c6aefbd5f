use anyhow::Result;
use clap::{Parser, Subcommand};

use vigia::cli;

#[derive(Debug, Parser)]
#[command(name = "vigia")]
#[command(about = "Monitor de status das filiais e terminais")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the branch health table (or one branch's terminals)
    Status {
        /// Filter branches by name or code (case-insensitive substring)
        #[arg(long)]
        search: Option<String>,
        /// Only show branches with this aggregate status: OK, AVISO, ERRO
        #[arg(long)]
        health: Option<String>,
        /// Show the terminal detail view for one branch (name or code)
        #[arg(long)]
        branch: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Continuously refresh the status table
    Watch {
        /// Poll interval in seconds (default from config)
        #[arg(long)]
        interval: Option<u64>,
        /// Filter branches by name or code
        #[arg(long)]
        search: Option<String>,
        /// Only show branches with this aggregate status
        #[arg(long)]
        health: Option<String>,
    },
    /// Show the execution log for one branch
    Logs {
        /// Branch code
        branch: String,
    },
    /// Trigger an on-demand run for one branch
    Run {
        /// Branch code
        branch: String,
    },
    /// Local and remote configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Check config and API connectivity
    Health,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective local configuration
    Show,
    /// Create ~/.vigia/config.toml with annotated defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a key in the global config, e.g. `vigia config set api.base_url URL`
    Set { key: String, value: String },
    /// Reset the local config to defaults
    Reset,
    /// Fetch the remote pipeline config (GET /api/config)
    Pull,
    /// Upload a JSON file as the remote pipeline config (POST /api/config)
    Push {
        /// Path to a JSON file
        file: String,
    },
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Status {
            search,
            health,
            branch,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_status(search.as_deref(), health.as_deref(), branch.as_deref(), fmt)
        }
        Commands::Watch {
            interval,
            search,
            health,
        } => cli::run_watch(interval, search.as_deref(), health.as_deref()),
        Commands::Logs { branch } => cli::run_logs(&branch),
        Commands::Run { branch } => cli::run_trigger(&branch),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
            ConfigAction::Pull => cli::run_config_pull(),
            ConfigAction::Push { file } => cli::run_config_push(&file),
        },
        Commands::Health => cli::run_health(),
    }
}
