//! Binary entry point that bootstraps the environment, logging and command
//! line, then runs a calculator session.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use vocalc::app::{self, SessionOptions};
use vocalc::config;
use vocalc::grammar::{render_jsgf, GRAMMAR_NAME};

/// Hands-free calculator driven by recognized speech.
#[derive(Debug, Parser)]
#[command(name = "vocalc", version, about)]
struct Cli {
    /// Configuration file (defaults to $VOCALC_CONFIG or ./config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read utterances from this file, one per line, instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print events as JSON lines.
    #[arg(long)]
    json: bool,

    /// Do not poll for a microphone.
    #[arg(long)]
    no_monitor: bool,

    /// Print the recognizer grammar and exit.
    #[arg(long)]
    print_grammar: bool,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
/// Loads `.env`, initializes logging, and runs the session until the
/// recognition loop exits.
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    if cli.print_grammar {
        print!("{}", render_jsgf(GRAMMAR_NAME));
        return Ok(());
    }

    let config_path = config::config_path(cli.config.as_deref());
    let options = SessionOptions {
        config: config::load_config(&config_path),
        script: cli.script,
        json: cli.json,
        without_monitor: cli.no_monitor,
    };
    app::run_calculator(options).await
}
