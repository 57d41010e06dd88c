pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "contrata",
    about = "Contrata operator CLI",
    long_about = "Validate quotation drafts, compute quotation vigency, replay lifecycle event scripts, and inspect configuration.",
    after_help = "Examples:\n  contrata validate quotation.json\n  contrata vigency quotation.json --today 2026-08-07\n  contrata simulate flow.json\n  contrata config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate a quotation draft against its payment modality")]
    Validate {
        #[arg(help = "JSON file carrying `modality` and `draft`")]
        input: PathBuf,
        #[arg(long, help = "Pin the current date (YYYY-MM-DD) for date checks")]
        today: Option<NaiveDate>,
    },
    #[command(about = "Compute the remaining vigency of a quotation record")]
    Vigency {
        #[arg(help = "JSON file with the quotation's vigency fields")]
        input: PathBuf,
        #[arg(long, help = "Pin the current date (YYYY-MM-DD) instead of the wall clock")]
        today: Option<NaiveDate>,
    },
    #[command(about = "Replay an event script through the hiring lifecycle")]
    Simulate {
        #[arg(help = "JSON file with an optional `start` status and an `events` array")]
        input: PathBuf,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate { input, today } => commands::validate::run(&input, today),
        Command::Vigency { input, today } => commands::vigency::run(&input, today),
        Command::Simulate { input } => commands::simulate::run(&input),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
