mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::SutekhClient;
use output::{OutputConfig, OutputFormat};
use std::process;
use sutekh::config;

/// Command line client for the Sutekh card database
#[derive(Parser, Debug)]
#[clap(name = "sutekh-cli", about = "Manage a VTES card collection through a Sutekh server")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "SUTEKH_URL", global = true)]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search and manage cards
    #[command(subcommand)]
    Card(commands::card::CardCommands),
    /// Manage expansions and printings
    #[command(subcommand)]
    Expansion(commands::expansion::ExpansionCommands),
    /// Manage card sets: decks, collections and their contents
    #[command(subcommand)]
    Set(commands::set::SetCommands),
    /// Inspect the filter language
    #[command(subcommand)]
    Filter(commands::filter::FilterCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default (port based on debug/release)
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    if let Ok(update) = config::config_from_file(config::get_config_file_path()) {
        if let Some(url) = update.server_url {
            return url;
        }
    }

    // Default: port 3001 in debug builds, 3000 in release
    let port = if cfg!(debug_assertions) { 3001 } else { config::DEFAULT_PORT };
    format!("http://localhost:{}", port)
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!("Could not connect to server. Is sutekh running?\n  {}", err_string);
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = SutekhClient::new(server_url);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Card(cmd) => commands::card::execute(&client, cmd, &output_config).await,
        Commands::Expansion(cmd) => commands::expansion::execute(&client, cmd, &output_config).await,
        Commands::Set(cmd) => commands::set::execute(&client, cmd, &output_config).await,
        Commands::Filter(cmd) => commands::filter::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
