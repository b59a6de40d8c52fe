//! # scenario-validator
//!
//! Validator for declarative UI-automation scenario files.
//!
//! Scenario files live under `apps/`, `testing/` and `workflows/` of a
//! repository. Each one is loaded into a [`ScenarioDocument`] and checked for
//! required fields, recognized step types, `${VAR}` interpolation syntax, and
//! the `ios_min` / `tags` / `locale` metadata formats.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scenario_validator::{validate_fs, FsSourceConfig, ValidationConfig};
//!
//! let fs_config = FsSourceConfig::for_root("/path/to/scenarios-repo");
//! let report = validate_fs(&fs_config, &ValidationConfig::default()).unwrap();
//! println!("Files scanned: {}", report.scanned_files);
//! println!("Errors: {}", report.errors_count());
//! println!("OK: {}", report.ok);
//! ```

mod config;
mod error;
mod loader;
pub mod output;
mod report;
pub mod rules;
mod strategy;

use std::path::{Path, PathBuf};

pub use config::{FsSourceConfig, SCENARIO_DIRS, SCENARIO_EXTENSIONS, ValidationConfig};
pub use error::{ConfigError, Diagnostic, DiagnosticKind, LoadError, ScanError, Severity};
pub use loader::{LoaderKind, ScenarioDocument, StepEntry, StepsField, scalar_text};
pub use report::ValidationReport;
pub use strategy::fs::{Discovered, discover, read_file_bounded};

/// Validate every scenario file under `fs_config.root`.
///
/// This is the primary public API. Files are discovered, loaded and checked
/// one at a time; a malformed file never stops the run.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRoot`] if the root is not a directory, and
/// [`ConfigError::NoScenarioFiles`] if discovery yields no scenario file.
/// Discovery failures seen on the way are logged before that error returns.
/// Per-file problems are diagnostics in the report, never errors.
pub fn validate_fs(
    fs_config: &FsSourceConfig,
    validation_config: &ValidationConfig,
) -> anyhow::Result<ValidationReport> {
    if !fs_config.root.is_dir() {
        return Err(ConfigError::MissingRoot(fs_config.root.clone()).into());
    }

    tracing::debug!(
        root = %fs_config.root.display(),
        loader = %validation_config.loader,
        "starting scenario validation"
    );

    let mut diagnostics = Vec::new();
    let mut scanned_files: usize = 0;

    for item in discover(fs_config) {
        match item {
            Ok(path) => {
                scanned_files += 1;
                let relative = relative_to(&fs_config.root, &path);
                tracing::debug!(file = %relative.display(), "validating scenario");
                diagnostics.extend(validate_file(
                    &path,
                    &relative,
                    fs_config.max_file_size,
                    validation_config,
                ));
            }
            Err(scan_err) => {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::DiscoveryFailure,
                    relative_to(&fs_config.root, &scan_err.file),
                    scan_err.message,
                ));
            }
        }
    }

    if scanned_files == 0 {
        for diagnostic in &diagnostics {
            tracing::warn!(
                path = %diagnostic.file.display(),
                "{}", diagnostic.message
            );
        }
        return Err(ConfigError::NoScenarioFiles(fs_config.root.clone()).into());
    }

    let report = ValidationReport::new(scanned_files, diagnostics);
    tracing::info!(
        files = report.scanned_files,
        warnings = report.warnings_count(),
        errors = report.errors_count(),
        "scenario validation finished"
    );
    Ok(report)
}

/// Read one scenario file and run every rule on it.
///
/// `relative` is the path reported in diagnostics. A file that cannot be read
/// yields a single "failed to parse" error.
#[must_use]
pub fn validate_file(
    path: &Path,
    relative: &Path,
    max_file_size: u64,
    config: &ValidationConfig,
) -> Vec<Diagnostic> {
    match read_file_bounded(path, max_file_size) {
        Ok(content) => rules::check_scenario(relative, &content, config),
        Err(err) => {
            tracing::warn!(file = %path.display(), error = %err, "could not read scenario");
            vec![rules::load_failure(relative, &err)]
        }
    }
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
