use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "pomobar", version, about = "Pomodoro session timer")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer, reading commands from stdin
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Send one diagnostic event to the configured endpoint
    Ping,
    /// Render a number of seconds as MM:SS
    Format {
        /// Seconds remaining (fractions are truncated)
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(config, args),
        Commands::Config { action } => commands::config::run(config, action),
        Commands::Ping => commands::ping::run(config),
        Commands::Format { seconds } => commands::format::run(seconds),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
