//! Main entry point for the Tuhura session CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use dotenv::dotenv;
use shared::config::ClientConfig;
use url::Url;

mod app;
mod commands;
mod logging;

use app::App;
use commands::{register::RegisterArgs, session::LoginArgs};

/// Tuhura CLI
#[derive(Parser)]
#[command(name = "tuhura")]
#[command(about = "Register, log in, and manage your Tuhura session", long_about = None)]
struct Cli {
    /// Path to the configuration file (optional)
    #[arg(
        long,
        short,
        global = true,
        help = "Path to the configuration file (e.g., config.yaml or config.json). If not provided, defaults will be used."
    )]
    config: Option<PathBuf>,

    /// Base URL of the auth API, overriding the configuration
    #[arg(
        long,
        global = true,
        help = "Base URL of the auth API (e.g., http://127.0.0.1:8000). Overrides the configuration file and environment."
    )]
    api_url: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the Tuhura CLI
#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Register(RegisterArgs),

    /// Log in and show the dashboard
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the dashboard for the logged-in user
    Dashboard,

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml or json). Defaults to yaml.
        #[arg(
            long,
            short,
            help = "Format of the configuration file to generate (yaml or json). Defaults to yaml."
        )]
        format: Option<String>,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script
        #[arg(
            long,
            short,
            value_enum,
            help = "The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)"
        )]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(shell);
            return Ok(());
        }
        Commands::Config { format } => {
            let format = format.unwrap_or_else(|| "yaml".to_string());
            return commands::config::generate_config(&format);
        }
        command => command,
    };

    let config = ClientConfig::load_config(cli.config.as_deref(), cli.api_url)?;
    logging::init(&config.log_level);
    let mut app = App::build(&config)?;

    let outcome = match command {
        Commands::Register(args) => commands::register::register(&app, args).await,
        Commands::Login(args) => commands::session::login(&mut app, args).await,
        Commands::Logout => {
            commands::session::logout(&mut app);
            Ok(())
        }
        Commands::Dashboard => commands::session::dashboard(&app),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    };

    app.drain_events();
    outcome
}
