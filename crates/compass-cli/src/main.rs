use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "compass", version, about = "Daily compass CLI")]
struct Cli {
    /// Evaluate as of this instant (RFC 3339) instead of now
    #[arg(long, global = true, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's compass
    Show {
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the lock gate status as JSON
    Status,
    /// Commit today's position (0-100)
    Commit {
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },
    /// Render the compass as SVG
    Render {
        #[command(flatten)]
        args: commands::render::RenderArgs,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("COMPASS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let now = cli.at.unwrap_or_else(Utc::now);

    let result = match cli.command {
        Commands::Show { json } => commands::show::run(now, json),
        Commands::Status => commands::status::run(now),
        Commands::Commit { position } => commands::commit::run(now, position),
        Commands::Render { args } => commands::render::run(now, args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
