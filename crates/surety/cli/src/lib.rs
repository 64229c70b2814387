//! suretyctl - operator CLI for the Flight Surety ledger
//!
//! The ledger lives in a JSON snapshot file. This CLI can:
//! - write a sample genesis and initialize a ledger from it
//! - replay relay envelopes against the ledger and print receipts
//! - inspect configuration, airlines, flights, treasury and notifications

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::{apply, init, sample, show};
pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Flight Surety CLI application
#[derive(Parser, Debug)]
#[command(name = "suretyctl")]
#[command(about = "Flight Surety - flight-delay insurance ledger CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Ledger snapshot file
    #[arg(long, env = "SURETY_STATE", default_value = "surety-state.json", global = true)]
    state: PathBuf,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a new ledger from a genesis file
    Init {
        /// Genesis JSON file
        #[arg(long)]
        genesis: PathBuf,

        /// Replace an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Apply a JSON array of envelopes, printing one JSON receipt per line
    Apply {
        /// Envelopes JSON file
        envelopes: PathBuf,

        /// Report rejected envelopes and continue
        #[arg(long)]
        keep_going: bool,

        /// Override the genesis seed for oracle index assignment
        #[arg(long, env = "SURETY_SEED")]
        seed: Option<u64>,
    },

    /// Inspect the ledger
    Show {
        #[command(subcommand)]
        command: show::ShowCommands,
    },

    /// Print or write an example genesis file
    SampleGenesis {
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator, writing to stdout.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_to(args, &mut out)
}

/// Run using the provided argument iterator, writing results to `out`.
pub fn run_to<I, T>(args: I, out: &mut dyn Write) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so stdout stays parseable.
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    match cli.command {
        Commands::Init { genesis, force } => init::execute(&cli.state, &genesis, force, cli.output, out),
        Commands::Apply {
            envelopes,
            keep_going,
            seed,
        } => apply::execute(&cli.state, &envelopes, seed, keep_going, out),
        Commands::Show { command } => show::execute(command, &cli.state, cli.output, out),
        Commands::SampleGenesis { out: path } => sample::execute(path.as_deref(), out),
    }
}
