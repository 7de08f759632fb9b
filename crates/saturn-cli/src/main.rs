use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "saturn", version, about = "Saturn work/break timer")]
struct Cli {
    /// Log core state transitions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive timer session
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Render a number of seconds the way the status line does
    Format {
        /// Seconds to render
        seconds: u64,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "saturn=debug,saturn_core=debug"
    } else {
        "saturn=info,saturn_core=warn"
    };
    let filter = EnvFilter::try_from_env("SATURN_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Format { seconds } => commands::format::run(seconds),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
