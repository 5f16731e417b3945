//! grnsh CLI Entry Point
//!
//! Starts an interactive console against `<engine> <database>`.
//! With `--command`, runs a single command (or `.grn` script) and exits.
//!
//! Engine output goes to stdout. Logs and diagnostics go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use grnsh::config::{load_config, Overrides, Settings};
use grnsh::console::{run_command, run_session};
use grnsh::GrnshError;

/// Exit code when the database argument is missing (-1 as a process status)
const MISSING_DATABASE_EXIT: u8 = 255;

/// Environment variable holding the log filter
const LOG_ENV: &str = "GRNSH_LOG";

/// grnsh - interactive console for line-oriented JSON database engines
#[derive(Parser)]
#[command(name = "grnsh")]
#[command(about = "Interactive console for line-oriented JSON database engines")]
#[command(version)]
struct Cli {
    /// Database handed to the engine
    database: Option<PathBuf>,

    /// Engine executable
    #[arg(short = 'g', long = "groonga", value_name = "PATH")]
    engine: Option<PathBuf>,

    /// Offer argument names when completing bare words
    #[arg(short = 'a', long)]
    complete_arguments: bool,

    /// Render select results as row records
    #[arg(short = 's', long)]
    select_format: bool,

    /// Config file (default: ~/.config/grnsh/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// History file (default: ~/.grnsh_history)
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,

    /// Run one command and exit
    #[arg(short = 'c', long, value_name = "COMMAND")]
    command: Option<String>,

    /// Log more (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(database) = cli.database.clone() else {
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::from(MISSING_DATABASE_EXIT);
    };

    match run(&cli, database) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<GrnshError>() {
            // No reachable database is an expected way to end a session.
            Some(GrnshError::SchemaUnavailable(message)) => {
                eprintln!("grnsh: {message}");
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!("grnsh: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: &Cli, database: PathBuf) -> anyhow::Result<()> {
    let file = load_config(cli.config.as_deref()).context("loading configuration")?;
    let overrides = Overrides {
        engine_path: cli.engine.clone(),
        complete_arguments: cli.complete_arguments,
        format_select: cli.select_format,
        history_file: cli.history.clone(),
    };
    let settings = Settings::resolve(database, overrides, file)?;

    match &cli.command {
        Some(line) => run_command(&settings, line)?,
        None => run_session(&settings)?,
    }
    Ok(())
}

/// Log to stderr; `GRNSH_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
