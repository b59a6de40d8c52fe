//! Validation report types.

use serde::Serialize;

use crate::error::{Diagnostic, Severity};

/// Result of a validation run.
///
/// `diagnostics` keeps per-file order and file-discovery order. Printing
/// regroups them by severity via [`ValidationReport::ordered`].
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ValidationReport {
    /// Number of scenario files discovered and checked.
    pub scanned_files: usize,
    /// Whether the run produced no errors. Warnings never affect this.
    pub ok: bool,
    /// Every diagnostic, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    #[must_use]
    pub fn new(scanned_files: usize, diagnostics: Vec<Diagnostic>) -> Self {
        let ok = !diagnostics.iter().any(Diagnostic::is_error);
        Self {
            scanned_files,
            ok,
            diagnostics,
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of_severity(Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of_severity(Severity::Error)
    }

    #[must_use]
    pub fn warnings_count(&self) -> usize {
        self.warnings().count()
    }

    /// Number of errors found.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.errors().count()
    }

    /// All warnings, then all errors, each group in discovery order.
    #[must_use]
    pub fn ordered(&self) -> Vec<&Diagnostic> {
        self.warnings().chain(self.errors()).collect()
    }

    fn of_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }
}
