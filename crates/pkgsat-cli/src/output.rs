use console::style;
use pkgsat_cudf::{ProblemDescription, VersionPredicate, Violation};
use pkgsat_pm::Transaction;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Plan violations found when replaying a transaction on the installed system
pub fn verify(problem: &ProblemDescription, tx: &Transaction) -> Vec<Violation> {
    let result = tx.apply(&problem.current_installation());
    problem.check(&result)
}

fn print_section(sign: console::StyledObject<&str>, packages: &[VersionPredicate]) {
    for pkg in packages {
        println!(
            "  {} {} {}",
            sign,
            style(&pkg.name).white().bold(),
            style(pkg.version).yellow()
        );
    }
}

/// Human readable rendering of one plan
pub fn print_transaction(tx: &Transaction) {
    if tx.is_empty() {
        println!("  {}", style("Nothing to do").dim());
        return;
    }
    print_section(style("+").green(), &tx.install);
    print_section(style("^").cyan(), &tx.upgrade);
    print_section(style("-").red(), &tx.remove);
}

pub fn print_violations(violations: &[Violation]) {
    eprintln!(
        "{} Plan does not satisfy the problem ({} violations)",
        style("Error:").red().bold(),
        violations.len()
    );
    for violation in violations {
        eprintln!("  {} {}", style("-").red(), violation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_solver_plan() {
        let problem = pkgsat_cudf::parse_str(
            "package: a\nversion: 1\ninstalled: true\n\npackage: a\nversion: 2\n\nrequest:\ninstall: a = 2\n",
        )
        .unwrap();
        let mut tx = Transaction::new();
        tx.upgrade.push(VersionPredicate::exact("a", 2));
        assert!(verify(&problem, &tx).is_empty());

        let noop = Transaction::new();
        assert_eq!(verify(&problem, &noop).len(), 1);
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: OutputFormat,
        }
        let w: Wrapper = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(w.format, OutputFormat::Json);
    }
}
