use anyhow::{Context, Result};
use clap::Args;
use console::style;
use log::info;
use pkgsat_pm::{PackageSolver, SolverError};
use std::path::PathBuf;

use crate::config::PkgsatConfig;
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct EnumerateArgs {
    /// Problem file in CUDF syntax
    pub file: PathBuf,

    /// Stop after this many plans
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Check every plan against the problem before printing
    #[arg(long)]
    pub verify: bool,
}

pub fn execute(args: EnumerateArgs, config: &PkgsatConfig) -> Result<i32> {
    let limit = config.max_solutions(args.limit);
    let format = config.format(args.format);

    let problem = pkgsat_cudf::parse_file(&args.file)
        .with_context(|| format!("Failed to read problem {}", args.file.display()))?;

    let solutions = match PackageSolver::new(&problem) {
        Ok(mut solver) => solver.solutions(limit)?,
        Err(SolverError::Unsatisfiable) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    info!("Enumerated {} plans", solutions.len());

    if config.verify(args.verify) {
        for tx in &solutions {
            let violations = output::verify(&problem, tx);
            if !violations.is_empty() {
                output::print_violations(&violations);
                return Ok(1);
            }
        }
    }

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "count": solutions.len(),
                "solutions": solutions,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            if solutions.is_empty() {
                println!("{} No plan satisfies the request", style("Warning:").yellow());
            }
            for (i, tx) in solutions.iter().enumerate() {
                println!("{} #{}", style("Plan").cyan().bold(), i + 1);
                output::print_transaction(tx);
            }
            if let Some(limit) = limit.filter(|l| solutions.len() >= *l) {
                println!("{}", style(format!("Stopped after {} plans", limit)).dim());
            }
        }
    }

    Ok(if solutions.is_empty() { 2 } else { 0 })
}
