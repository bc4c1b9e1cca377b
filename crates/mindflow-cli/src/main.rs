use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mindflow-cli", version, about = "Mindflow CLI")]
struct Cli {
    /// Database file (defaults to storage.database_path, then the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Insert the activity and tip catalog, optionally with demo data for a user
    Seed {
        /// Also create demo categories, tasks and productivity for this user
        #[arg(long)]
        demo_user: Option<i64>,
    },
    /// Dashboard statistics for a user
    Stats {
        #[arg(long)]
        user: i64,
    },
    /// Mindfulness streak for a user
    Streak {
        #[arg(long)]
        user: i64,
    },
    /// Explain the priority score of a hypothetical task
    Score(commands::score::ScoreArgs),
}

fn main() {
    let cli = Cli::parse();
    let db = cli.db;
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Seed { demo_user } => commands::seed::run(db, demo_user),
        Commands::Stats { user } => commands::stats::run(db, user),
        Commands::Streak { user } => commands::streak::run(db, user),
        Commands::Score(args) => commands::score::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
