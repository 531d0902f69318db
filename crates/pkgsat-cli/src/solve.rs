use anyhow::{Context, Result};
use clap::Args;
use console::style;
use log::info;
use pkgsat_pm::{Criterion, PackageSolver, SolverError};
use std::path::PathBuf;

use crate::config::PkgsatConfig;
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Problem file in CUDF syntax
    pub file: PathBuf,

    /// Optimization criterion (removed, new, changed, notuptodate)
    #[arg(short, long)]
    pub criterion: Option<Criterion>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Check the plan against the problem before printing it
    #[arg(long)]
    pub verify: bool,
}

pub fn execute(args: SolveArgs, config: &PkgsatConfig) -> Result<i32> {
    let criterion = config.criterion(args.criterion);
    let format = config.format(args.format);

    let problem = pkgsat_cudf::parse_file(&args.file)
        .with_context(|| format!("Failed to read problem {}", args.file.display()))?;
    info!("Loaded {} package instances from {}", problem.len(), args.file.display());

    let mut solver = match PackageSolver::new(&problem) {
        Ok(solver) => solver,
        Err(SolverError::Unsatisfiable) => {
            eprintln!("{} The request cannot be satisfied", style("Error:").red().bold());
            return Ok(2);
        }
        Err(e) => return Err(e.into()),
    };

    let tx = solver.optimal_solution(criterion)?;

    if config.verify(args.verify) {
        let violations = output::verify(&problem, &tx);
        if !violations.is_empty() {
            output::print_violations(&violations);
            return Ok(1);
        }
    }

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "criterion": criterion,
                "score": criterion.score(&problem, &tx.apply(&problem.current_installation())),
                "transaction": tx,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!(
                "{} Optimal plan for {} ({} operations)",
                style("Solve:").cyan().bold(),
                style(criterion).green(),
                tx.len()
            );
            output::print_transaction(&tx);
        }
    }

    Ok(0)
}
