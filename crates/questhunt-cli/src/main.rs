use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "questhunt", version, about = "Quest Hunt proximity guidance CLI")]
struct Cli {
    /// Debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the quest catalog
    Quests {
        #[command(subcommand)]
        action: commands::quests::QuestsAction,
    },
    /// Distance and direction between two points
    Distance(commands::distance::DistanceArgs),
    /// Print the proximity tier table
    Tiers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a guidance session towards a quest
    Guide(commands::guide::GuideArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Quests { action } => commands::quests::run(action),
        Commands::Distance(args) => commands::distance::run(args),
        Commands::Tiers { json } => commands::tiers::run(json),
        Commands::Guide(args) => commands::guide::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
