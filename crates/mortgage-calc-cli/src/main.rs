mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::payment::PaymentArgs;
use commands::schedule::ScheduleArgs;
use commands::session::SessionArgs;

/// Monthly mortgage payment calculations
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Monthly mortgage payment calculations",
    long_about = "Computes the monthly payment for a home loan from price, down payment, \
                  term, interest rate, property tax and home insurance, with decimal \
                  precision. Also prints amortisation schedules and replays form edits."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment breakdown (principal & interest, tax & insurance)
    Payment(PaymentArgs),
    /// Month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// Replay a sequence of form edits and print the resulting form state
    Session(SessionArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "mortgage_calc_core=debug,mortgage=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Session(args) => commands::session::run_session(args),
        Commands::Version => {
            println!("mortgage {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
