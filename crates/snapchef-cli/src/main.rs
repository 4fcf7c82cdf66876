use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "snapchef", version, about = "SnapChef challenges CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse, join and progress challenges
    Challenges {
        #[command(subcommand)]
        action: commands::challenges::ChallengesAction,
    },
    /// Report participant activity
    Event(commands::event::EventArgs),
    /// Timed challenge sessions
    Track {
        #[command(subcommand)]
        action: commands::track::TrackAction,
    },
    /// Completed challenges, most recent first
    History {
        /// Maximum number of entries
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reward totals and board summary
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the challenge service and print events as JSON lines
    Watch {
        /// Stop after this many seconds
        #[arg(long, default_value = "60")]
        seconds: u64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SNAPCHEF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Challenges { action } => commands::challenges::run(action),
        Commands::Event(args) => commands::event::run(args),
        Commands::Track { action } => commands::track::run(action),
        Commands::History { limit, json } => commands::history::run(limit, json),
        Commands::Stats => commands::stats::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch { seconds } => commands::watch::run(seconds),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
