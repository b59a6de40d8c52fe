//! Configuration types for scenario validation.
//!
//! Split into core validation config (how a loaded document is judged) and
//! source-specific config (how scenario files are discovered on disk).

use std::path::PathBuf;

use crate::loader::LoaderKind;

/// Top-level directories, relative to the repository root, that hold scenarios.
pub const SCENARIO_DIRS: &[&str] = &["apps", "testing", "workflows"];

/// File extensions treated as scenario files.
pub const SCENARIO_EXTENSIONS: &[&str] = &["yaml"];

/// Core validation config: applies regardless of where the content came from.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct ValidationConfig {
    /// Which document loader turns raw text into a `ScenarioDocument`.
    pub loader: LoaderKind,
    /// Report a present `steps` field that is not a list.
    ///
    /// Off by default: a non-list `steps` value only bypasses the step checks.
    pub strict_steps: bool,
}

/// Filesystem-specific source options.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct FsSourceConfig {
    /// Repository root. Scenario directories are resolved against it and
    /// diagnostic paths are reported relative to it.
    pub root: PathBuf,
    /// Directory names under `root` to walk. Missing ones are skipped.
    pub scenario_dirs: Vec<String>,
    /// Extensions (without the dot) that mark a scenario file.
    pub extensions: Vec<String>,
    /// Exclude patterns (glob format), matched against the full path and the file name.
    pub exclude: Vec<String>,
    /// Maximum file size in bytes (default: 10 MB).
    pub max_file_size: u64,
    /// Whether to follow symbolic links.
    ///
    /// **Defaults to `false`**: following symlinks allows escaping the repository root.
    pub follow_links: bool,
    /// Maximum directory traversal depth (default: 64).
    pub max_depth: usize,
}

impl FsSourceConfig {
    /// Config rooted at `root` with every other option at its default.
    #[must_use]
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }
}

impl Default for FsSourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            scenario_dirs: SCENARIO_DIRS.iter().map(|&d| d.to_owned()).collect(),
            extensions: SCENARIO_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            exclude: Vec::new(),
            max_file_size: 10_485_760,
            follow_links: false,
            max_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_dirs() {
        let cfg = FsSourceConfig::default();
        assert_eq!(cfg.scenario_dirs, vec!["apps", "testing", "workflows"]);
        assert!(cfg.accepts_extension("yaml"));
        assert!(!cfg.accepts_extension("yml"));
        assert!(!cfg.follow_links);
    }

    #[test]
    fn test_for_root_keeps_defaults() {
        let cfg = FsSourceConfig::for_root("/tmp/repo");
        assert_eq!(cfg.root, PathBuf::from("/tmp/repo"));
        assert_eq!(cfg.max_depth, 64);
    }
}
