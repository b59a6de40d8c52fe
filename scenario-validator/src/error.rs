//! Diagnostic and error types for scenario validation.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Severity of a diagnostic. Only errors fail a run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// Fixed-width label used by the plain-text report.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// The file could not be read or parsed.
    ParseFailure,
    /// The file parsed to nothing (comments only, or not a mapping).
    EmptyDocument,
    /// One of the required fields is absent or null.
    MissingField,
    /// A step entry is not a mapping.
    MalformedStep,
    /// A step entry uses a step type outside the recognized vocabulary.
    UnknownStepType,
    /// `steps` is present but not a list (strict mode only).
    StepsNotList,
    /// No `assert_visible` / `assert_not_visible` step in the scenario.
    MissingAssertion,
    /// A `${...}` expression whose body is not `NAME` or `NAME:-default`.
    MalformedVariable,
    /// A line opens more `${` than it closes.
    UnclosedVariable,
    /// `ios_min` is not `MAJOR.MINOR[.PATCH]`.
    MalformedVersion,
    /// `tags` is not a list of strings.
    MalformedTags,
    /// `locale` is not `ll_RR`.
    MalformedLocale,
    /// A directory or path could not be traversed during discovery.
    DiscoveryFailure,
}

/// A single finding for one scenario file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// File path relative to the repository root.
    pub file: PathBuf,
    /// 1-indexed line number, for text-level findings.
    pub line: Option<usize>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn error(kind: DiagnosticKind, file: PathBuf, message: String) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            file,
            line: None,
            message,
        }
    }

    #[must_use]
    pub fn warning(kind: DiagnosticKind, file: PathBuf, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            file,
            line: None,
            message,
        }
    }

    /// Attach a 1-indexed line number.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format the diagnostic for human-readable output.
    ///
    /// `  WARN   {file}: {message}` or `  ERROR  {file}[:{line}]: {message}`
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        let file = self.file.display();
        match self.line {
            Some(line) => format!(
                "  {}  {file}:{line}: {}",
                self.severity.label(),
                self.message
            ),
            None => format!("  {}  {file}: {}", self.severity.label(), self.message),
        }
    }
}

/// Why a scenario file could not be turned into a document.
///
/// Every variant is reported as a "failed to parse" diagnostic.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file exceeds maximum size of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("file is not valid UTF-8")]
    Encoding,

    #[error("{message}")]
    Parse {
        /// 1-indexed line of the offending construct, when known.
        line: Option<usize>,
        message: String,
    },
}

impl LoadError {
    /// A parse failure at a known line; the line is also prefixed to the message.
    #[must_use]
    pub fn parse_at(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line: Some(line),
            message: format!("line {line}: {}", message.into()),
        }
    }
}

/// Fatal conditions that stop a run before any file is judged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Repository root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("No scenario files found under {}", .0.display())]
    NoScenarioFiles(PathBuf),
}

/// A discovery-level failure: a path that could not be walked or was rejected.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ScanError {
    /// The path that could not be scanned.
    pub file: PathBuf,
    /// Human-readable description of the failure.
    pub message: String,
}
