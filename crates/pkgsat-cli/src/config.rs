use anyhow::{Context, Result};
use pkgsat_pm::Criterion;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

pub const CONFIG_FILE: &str = "pkgsat.toml";

/// The pkgsat configuration file structure (pkgsat.toml)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PkgsatConfig {
    /// Solver defaults
    pub solver: SolverConfig,

    /// Output defaults
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Criterion used by `pkgsat solve` when none is given
    pub criterion: Option<Criterion>,

    /// Limit used by `pkgsat enumerate` when none is given
    pub max_solutions: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,

    /// Re-check every printed plan against the problem
    pub verify: bool,
}

impl PkgsatConfig {
    /// Load configuration from pkgsat.toml, searching upward from the given directory
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);

            if config_path.exists() {
                return Self::load_file(&config_path).map(Some);
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Load configuration by searching upward from the current working directory
    pub fn load_from_cwd() -> Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        Self::load(&cwd)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Explicit file wins; otherwise search upward, falling back to defaults
    pub fn resolve(explicit: Option<&PathBuf>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => Ok(Self::load_from_cwd()?.unwrap_or_default()),
        }
    }

    pub fn criterion(&self, flag: Option<Criterion>) -> Criterion {
        flag.or(self.solver.criterion).unwrap_or(Criterion::Changed)
    }

    pub fn format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.output.format).unwrap_or_default()
    }

    pub fn verify(&self, flag: bool) -> bool {
        flag || self.output.verify
    }

    pub fn max_solutions(&self, flag: Option<usize>) -> Option<usize> {
        flag.or(self.solver.max_solutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: PkgsatConfig = toml::from_str("").unwrap();
        assert!(config.solver.criterion.is_none());
        assert!(config.solver.max_solutions.is_none());
        assert!(!config.output.verify);
        assert_eq!(config.criterion(None), Criterion::Changed);
        assert_eq!(config.format(None), OutputFormat::Text);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[solver]
criterion = "notuptodate"
max_solutions = 25

[output]
format = "json"
verify = true
"#;
        let config: PkgsatConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.solver.criterion, Some(Criterion::NotUpToDate));
        assert_eq!(config.solver.max_solutions, Some(25));
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(config.output.verify);
    }

    #[test]
    fn test_flags_override_file() {
        let config: PkgsatConfig =
            toml::from_str("[solver]\ncriterion = \"removed\"\nmax_solutions = 3\n").unwrap();
        assert_eq!(config.criterion(None), Criterion::Removed);
        assert_eq!(config.criterion(Some(Criterion::New)), Criterion::New);
        assert_eq!(config.max_solutions(None), Some(3));
        assert_eq!(config.max_solutions(Some(10)), Some(10));
        assert_eq!(config.format(Some(OutputFormat::Json)), OutputFormat::Json);
        assert!(config.verify(true));
    }

    #[test]
    fn test_unknown_criterion_is_rejected() {
        let result: std::result::Result<PkgsatConfig, _> =
            toml::from_str("[solver]\ncriterion = \"fastest\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_searches_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[solver]\ncriterion = \"new\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = PkgsatConfig::load(&nested).unwrap().unwrap();
        assert_eq!(config.solver.criterion, Some(Criterion::New));
    }
}
