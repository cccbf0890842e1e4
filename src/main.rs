//! waymark replay runner.
//!
//! Builds an application from a config file and replays a scripted sequence
//! of host signals and submissions against it, printing each completion as a
//! JSON line.
//!
//! ```text
//! waymark --config app.toml replay script.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use waymark::config::{load_config, AppConfig};
use waymark::observability::logging::init_tracing;
use waymark::replay::{Replay, Script};

#[derive(Parser)]
#[command(name = "waymark")]
#[command(about = "Replay navigation and request scripts", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the configuration file while the script runs.
    #[arg(long)]
    watch: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a script of signals and submissions
    Replay {
        script: PathBuf,
    },
    /// Validate the configuration and print it
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    init_tracing(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "waymark starting");

    match cli.command {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Replay { script } => {
            let script = Script::load(&script)?;
            let replay = Replay::new(&config, &script)?;

            // Keep the watcher alive for the whole run.
            let _watcher = match (&cli.config, cli.watch) {
                (Some(path), true) => Some(replay.app().watch_config(path)?),
                (None, true) => {
                    tracing::warn!("--watch ignored without --config");
                    None
                }
                _ => None,
            };

            for report in replay.run(&script.steps).await? {
                println!("{}", serde_json::to_string(&report)?);
            }
        }
    }

    Ok(())
}
