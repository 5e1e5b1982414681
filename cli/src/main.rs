mod replay;
mod scenario;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "convo-cli")]
#[command(about = "Replay scripted sessions against a conversation view")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a scenario file and print the view state after each step
    Replay {
        /// Scenario JSON (seeded threads + steps)
        scenario: PathBuf,

        /// Directory for convo_config.json and logs (defaults to a temp dir)
        #[arg(long, env = "CONVO_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Max time to wait for the view to settle after each step
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
    },

    /// Print the default convo_config.json
    DefaultConfig,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Replay {
            scenario,
            data_dir,
            timeout_ms,
        } => cmd_replay(&scenario, data_dir, Duration::from_millis(timeout_ms)),
        Command::DefaultConfig => {
            println!("{}", convo_core::default_config_json());
            Ok(())
        }
    }
}

fn cmd_replay(
    path: &std::path::Path,
    data_dir: Option<PathBuf>,
    timeout: Duration,
) -> anyhow::Result<()> {
    let scenario = scenario::load(path)?;
    let tmp;
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => {
            tmp = tempfile::tempdir().context("create temp data dir")?;
            tmp.path().to_path_buf()
        }
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    replay::run(scenario, &data_dir, timeout, &mut out)?;
    Ok(())
}
