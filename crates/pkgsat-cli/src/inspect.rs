use anyhow::{Context, Result};
use clap::Args;
use console::style;
use pkgsat_pm::{PackageSolver, SolverError, TranslationStats};
use std::path::PathBuf;

use crate::config::PkgsatConfig;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Problem file in CUDF syntax
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

pub fn execute(args: InspectArgs, config: &PkgsatConfig) -> Result<i32> {
    let format = config.format(args.format);
    let problem = pkgsat_cudf::parse_file(&args.file)
        .with_context(|| format!("Failed to read problem {}", args.file.display()))?;

    let (satisfiable, stats) = match PackageSolver::new(&problem) {
        Ok(solver) => (true, solver.translation_stats().clone()),
        Err(SolverError::Unsatisfiable) => {
            let mut registry = pkgsat_pm::sat::AtomRegistry::new();
            let translation = pkgsat_pm::translate(&problem, &mut registry);
            (false, translation.stats(registry.len()))
        }
        Err(e) => return Err(e.into()),
    };

    let installed = problem.current_installation();

    match format {
        OutputFormat::Json => {
            let request = problem.request();
            let install: Vec<String> = request.install.iter().map(|p| p.to_string()).collect();
            let remove: Vec<String> = request.remove.iter().map(|p| p.to_string()).collect();
            let value = serde_json::json!({
                "instances": problem.len(),
                "names": problem.package_names().count(),
                "installed": installed,
                "request": { "install": install, "remove": remove },
                "satisfiable": satisfiable,
                "translation": stats,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => print_text(&problem, satisfiable, &stats),
    }

    Ok(0)
}

fn print_text(problem: &pkgsat_cudf::ProblemDescription, satisfiable: bool, stats: &TranslationStats) {
    println!(
        "{} {} instances of {} packages",
        style("Problem:").cyan().bold(),
        problem.len(),
        problem.package_names().count()
    );
    for (name, version) in problem.current_installation().iter() {
        println!("  {} {} {}", style("*").dim(), style(name).white().bold(), style(version).yellow());
    }
    for predicate in &problem.request().install {
        println!("  {} {}", style("install").green(), predicate);
    }
    for predicate in &problem.request().remove {
        println!("  {} {}", style("remove").red(), predicate);
    }

    println!(
        "{} {} atoms, {} clauses in {} groups",
        style("Encoding:").cyan().bold(),
        stats.atoms,
        stats.clauses,
        stats.groups
    );
    for (kind, kind_stats) in &stats.by_kind {
        println!(
            "  {:<12} {:>5} groups {:>7} clauses",
            kind.as_str(),
            kind_stats.groups,
            kind_stats.clauses
        );
    }

    if satisfiable {
        println!("{} satisfiable", style("Status:").green().bold());
    } else {
        println!("{} unsatisfiable", style("Status:").red().bold());
    }
}
