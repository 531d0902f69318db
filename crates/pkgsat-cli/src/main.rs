use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

mod config;
mod enumerate;
mod inspect;
mod output;
mod solve;

use config::PkgsatConfig;

#[derive(Parser, Debug)]
#[command(name = "pkgsat")]
#[command(about = "Plan package upgrades with a SAT solver", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this configuration file instead of searching for pkgsat.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute one optimal plan for the request
    Solve(solve::SolveArgs),

    /// List every feasible plan
    Enumerate(enumerate::EnumerateArgs),

    /// Show the problem and the size of its encoding
    Inspect(inspect::InspectArgs),
}

fn configure_logging(verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    // RUST_LOG still wins over the flag
    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level_filter)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    configure_logging(cli.verbose);

    let config = PkgsatConfig::resolve(cli.config.as_ref())?;

    match cli.command {
        Commands::Solve(args) => solve::execute(args, &config),
        Commands::Enumerate(args) => enumerate::execute(args, &config),
        Commands::Inspect(args) => inspect::execute(args, &config),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
