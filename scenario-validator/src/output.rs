//! Shared output formatting for validation reports.
//!
//! Provides JSON and plain-text formatters for `ValidationReport`.

use std::io::Write;

use crate::report::ValidationReport;

/// Format a `ValidationReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `ValidationReport` as plain text to a writer.
///
/// Layout: file count, every warning, every error, the counts, then
/// `All checks passed.` when there are no errors.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer, "Validated {} scenario files.", report.scanned_files)?;
    writeln!(writer)?;

    for diagnostic in report.ordered() {
        writeln!(writer, "{}", diagnostic.format_human_readable())?;
    }

    let warnings = report.warnings_count();
    if warnings > 0 {
        writeln!(writer)?;
        writeln!(writer, "{warnings} warning(s)")?;
    }

    let errors = report.errors_count();
    if errors > 0 {
        writeln!(writer, "{errors} error(s)")?;
    } else {
        writeln!(writer)?;
        writeln!(writer, "All checks passed.")?;
    }

    Ok(())
}
