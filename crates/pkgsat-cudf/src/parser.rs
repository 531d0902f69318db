//! Reader for the CUDF subset used by pkgsat problem files.
//!
//! A file is a sequence of stanzas separated by blank lines. Package stanzas
//! start with `package: <name>`, the request stanza with `request:`.
//! Recognized properties:
//!
//! ```text
//! package: foo
//! version: 2
//! depends: bar >= 2 | baz, qux
//! conflicts: quux < 3
//! installed: true
//!
//! request:
//! install: foo
//! remove: qux = 1
//! ```
//!
//! Unknown properties and stanzas are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ParseError;
use crate::formula::PackageFormula;
use crate::package::Package;
use crate::predicate::VersionPredicate;
use crate::problem::ProblemDescription;
use crate::request::Request;
use crate::Version;

const PACKAGE: &str = "package:";
const REQUEST: &str = "request:";
const VERSION: &str = "version:";
const DEPENDS: &str = "depends:";
const CONFLICTS: &str = "conflicts:";
const INSTALLED: &str = "installed:";
const INSTALL: &str = "install:";
const REMOVE: &str = "remove:";

/// Parse a problem description from a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<ProblemDescription, ParseError> {
    let file = File::open(path.as_ref())?;
    parse_reader(BufReader::new(file))
}

/// Parse a problem description from a string
pub fn parse_str(input: &str) -> Result<ProblemDescription, ParseError> {
    parse_reader(input.as_bytes())
}

/// Parse a problem description from any buffered reader
pub fn parse_reader(reader: impl BufRead) -> Result<ProblemDescription, ParseError> {
    let mut parser = Parser::default();
    for (idx, line) in reader.lines().enumerate() {
        parser.feed(idx + 1, &line?)?;
    }
    parser.finish()
}

#[derive(Debug)]
struct PackageStanza {
    line: usize,
    name: String,
    version: Option<Version>,
    depends: PackageFormula,
    conflicts: Vec<VersionPredicate>,
    installed: bool,
}

#[derive(Debug)]
enum Stanza {
    None,
    Package(PackageStanza),
    Request,
    /// A stanza we don't understand (preamble, ...)
    Skipped,
}

#[derive(Debug)]
struct Parser {
    stanza: Stanza,
    packages: Vec<Package>,
    request: Option<Request>,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            stanza: Stanza::None,
            packages: Vec::new(),
            request: None,
        }
    }
}

impl Parser {
    fn feed(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let line = line.trim_end();
        if line.trim().is_empty() {
            return self.close_stanza();
        }
        if line.starts_with('#') {
            return Ok(());
        }

        if let Some(name) = line.strip_prefix(PACKAGE) {
            self.close_stanza()?;
            self.stanza = Stanza::Package(PackageStanza {
                line: line_no,
                name: name.trim().to_string(),
                version: None,
                depends: PackageFormula::tautology(),
                conflicts: Vec::new(),
                installed: false,
            });
            return Ok(());
        }
        if line.starts_with(REQUEST) {
            self.close_stanza()?;
            if self.request.is_some() {
                return Err(ParseError::DuplicateRequest { line: line_no });
            }
            self.request = Some(Request::new());
            self.stanza = Stanza::Request;
            return Ok(());
        }

        if matches!(self.stanza, Stanza::None) {
            // Lines like `preamble:` open a stanza we ignore entirely
            if !is_property(line) {
                return Err(ParseError::OrphanProperty {
                    line: line_no,
                    property: line.to_string(),
                });
            }
            self.stanza = Stanza::Skipped;
            return Ok(());
        }

        match &mut self.stanza {
            Stanza::Package(pkg) => {
                if let Some(value) = line.strip_prefix(VERSION) {
                    pkg.version = Some(parse_version(line_no, value)?);
                } else if let Some(value) = line.strip_prefix(DEPENDS) {
                    pkg.depends = parse_formula(line_no, value)?;
                } else if let Some(value) = line.strip_prefix(CONFLICTS) {
                    pkg.conflicts = parse_predicate_list(line_no, value)?;
                } else if let Some(value) = line.strip_prefix(INSTALLED) {
                    pkg.installed = parse_bool(line_no, value)?;
                }
            }
            Stanza::Request => {
                // The request slot is filled when the stanza opens
                if let Some(request) = self.request.as_mut() {
                    if let Some(value) = line.strip_prefix(INSTALL) {
                        request.install = parse_predicate_list(line_no, value)?;
                    } else if let Some(value) = line.strip_prefix(REMOVE) {
                        request.remove = parse_predicate_list(line_no, value)?;
                    }
                }
            }
            Stanza::Skipped | Stanza::None => {}
        }
        Ok(())
    }

    fn close_stanza(&mut self) -> Result<(), ParseError> {
        if let Stanza::Package(pkg) = std::mem::replace(&mut self.stanza, Stanza::None) {
            let version = pkg.version.ok_or_else(|| ParseError::MissingVersion {
                line: pkg.line,
                name: pkg.name.clone(),
            })?;
            let mut package = Package::new(pkg.name, version)
                .with_depends(pkg.depends)
                .with_conflicts(pkg.conflicts);
            package.installed = pkg.installed;
            self.packages.push(package);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<ProblemDescription, ParseError> {
        self.close_stanza()?;
        let request = self.request.ok_or(ParseError::MissingRequest)?;
        log::debug!("Parsed {} package stanzas", self.packages.len());
        Ok(ProblemDescription::new(self.packages, request)?)
    }
}

fn is_property(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(key, _)| !key.is_empty() && !key.contains(char::is_whitespace))
}

fn parse_version(line: usize, value: &str) -> Result<Version, ParseError> {
    let value = value.trim();
    value.parse().map_err(|_| ParseError::InvalidVersion {
        line,
        value: value.to_string(),
    })
}

fn parse_bool(line: usize, value: &str) -> Result<bool, ParseError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ParseError::InvalidBool {
            line,
            value: other.to_string(),
        }),
    }
}

fn parse_predicate(line: usize, value: &str) -> Result<VersionPredicate, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidPredicate {
        line,
        value: value.trim().to_string(),
    })
}

fn parse_predicate_list(line: usize, value: &str) -> Result<Vec<VersionPredicate>, ParseError> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    value.split(',').map(|item| parse_predicate(line, item)).collect()
}

fn parse_formula(line: usize, value: &str) -> Result<PackageFormula, ParseError> {
    if value.trim().is_empty() {
        return Ok(PackageFormula::tautology());
    }
    let mut conjuncts = value
        .split(',')
        .map(|clause| parse_clause(line, clause))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if conjuncts.len() == 1 {
        conjuncts.remove(0)
    } else {
        PackageFormula::And(conjuncts)
    })
}

fn parse_clause(line: usize, value: &str) -> Result<PackageFormula, ParseError> {
    let mut disjuncts = value
        .split('|')
        .map(|atom| parse_atom(line, atom))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if disjuncts.len() == 1 {
        disjuncts.remove(0)
    } else {
        PackageFormula::Or(disjuncts)
    })
}

fn parse_atom(line: usize, value: &str) -> Result<PackageFormula, ParseError> {
    match value.trim() {
        "true!" => Ok(PackageFormula::Constant(true)),
        "false!" => Ok(PackageFormula::Constant(false)),
        other => Ok(PackageFormula::Predicate(parse_predicate(line, other)?)),
    }
}
