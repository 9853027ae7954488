//! tallyroll CLI - Attendance & daily-work report export
//!
//! Command-line interface for turning attendance sheets and daily-work logs
//! into Excel, PDF and console reports.

mod commands;
mod config;
mod notify;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{AttendanceFormat, DailyFormat, Output};
use config::Config;

#[derive(Parser)]
#[command(name = "tallyroll")]
#[command(author, version, about = "Attendance and daily-work report exporter", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors and output paths
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file
    #[arg(long, value_name = "FILE", env = "TALLYROLL_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the monthly attendance grid
    Attendance {
        /// Attendance JSON file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(long)]
        year: i32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,

        #[arg(short, long, value_enum, default_value = "all")]
        format: AttendanceFormat,

        /// Output directory (default: config export.output_dir, then ".")
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Fail on unrecognised status symbols instead of treating them as absent
        #[arg(long)]
        strict: bool,
    },

    /// Summarize daily-work logs by date
    DailyWork {
        /// Daily-work log JSON file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(long)]
        year: i32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,

        #[arg(short, long, value_enum, default_value = "text")]
        format: DailyFormat,

        /// Output directory for xlsx
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Print the column layout for a month
    Schema {
        #[arg(long)]
        year: i32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,

        /// Leave type column (repeatable)
        #[arg(long = "leave-type", value_name = "NAME")]
        leave_types: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let output = |out_dir: Option<PathBuf>| Output {
        dir: config.output_dir(out_dir),
        quiet: cli.quiet,
    };

    let code = match cli.command {
        Some(Commands::Attendance {
            input,
            year,
            month,
            format,
            out_dir,
            strict,
        }) => commands::attendance(&config, &input, year, month, format, strict, &output(out_dir))?,
        Some(Commands::DailyWork {
            input,
            year,
            month,
            format,
            out_dir,
        }) => commands::daily_work(&input, year, month, format, &output(out_dir))?,
        Some(Commands::Schema {
            year,
            month,
            leave_types,
            json,
        }) => commands::schema(&config, year, month, &leave_types, json)?,
        None => {
            println!("tallyroll - Attendance & daily-work report export");
            println!("Run with --help for usage information");
            notify::ExitCode::Success
        }
    };

    Ok(code.into())
}
