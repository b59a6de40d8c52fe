//! Filesystem validation source.
//!
//! Discovers scenario files on disk and reads them safely for the validation pipeline.
//! Properties enforced here:
//! - Only the configured scenario directories under the root are walked; missing ones are skipped
//! - Within a directory, files come first in lexicographic order, then subdirectories
//! - Symlinks are not followed by default (`follow_links: false`)
//! - Resolved paths are checked to remain within the repository root
//! - Device files, pipes, and sockets are skipped
//! - Bounded reads prevent memory `DoS` on oversized files

use std::cmp::Ordering;
use std::io::Read;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::config::FsSourceConfig;
use crate::error::{LoadError, ScanError};

/// One item yielded by discovery: a scenario file, or a path that could not be walked.
pub type Discovered = Result<PathBuf, ScanError>;

/// Check if a path matches any of the exclude patterns
fn matches_exclude(path: &Path, exclude_patterns: &[Pattern]) -> bool {
    let path_str = path.to_string_lossy();
    exclude_patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}

fn compile_excludes(patterns: &[String]) -> (Vec<Pattern>, Vec<ScanError>) {
    let mut compiled = Vec::with_capacity(patterns.len());
    let mut errors = Vec::new();
    for pat_str in patterns {
        match Pattern::new(pat_str) {
            Ok(pat) => compiled.push(pat),
            Err(e) => errors.push(ScanError {
                file: PathBuf::from(pat_str),
                message: format!("invalid exclude glob pattern '{pat_str}': {e}"),
            }),
        }
    }
    (compiled, errors)
}

/// Files before directories, each group in lexicographic file-name order.
fn files_first_by_name(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_special_file(entry: &DirEntry) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if let Ok(ft) = entry.metadata().map(|m| m.file_type()) {
            return ft.is_block_device() || ft.is_char_device() || ft.is_fifo() || ft.is_socket();
        }
    }
    #[cfg(not(unix))]
    let _ = entry;
    false
}

/// Discover scenario files under the configured root.
///
/// Walks each of `config.scenario_dirs` that exists directly under `config.root`,
/// in the configured order. The returned iterator is lazy: directories are read
/// as it is advanced. Walk failures and invalid exclude patterns are yielded as
/// `Err` items and never silently discarded.
///
/// A file may be a symlink to anywhere inside `config.root`, including another
/// scenario directory; targets outside the root are reported as errors.
pub fn discover(config: &FsSourceConfig) -> Box<dyn Iterator<Item = Discovered> + '_> {
    let (exclude, pattern_errors) = compile_excludes(&config.exclude);

    // Canonicalize root once so we can enforce the boundary for every entry.
    let canonical_root = match config.root.canonicalize() {
        Ok(r) => r,
        Err(e) => {
            let root_error = ScanError {
                file: config.root.clone(),
                message: format!("failed to canonicalize root: {e}"),
            };
            return Box::new(
                pattern_errors
                    .into_iter()
                    .map(Err)
                    .chain(std::iter::once(Err(root_error))),
            );
        }
    };

    let walks = config
        .scenario_dirs
        .iter()
        .map(|name| config.root.join(name))
        .filter(|dir| {
            let present = dir.is_dir();
            if !present {
                tracing::debug!(dir = %dir.display(), "scenario directory not present, skipping");
            }
            present
        })
        .flat_map(move |dir| {
            walk_scenario_dir(config, dir, canonical_root.clone(), exclude.clone())
        });

    Box::new(pattern_errors.into_iter().map(Err).chain(walks))
}

fn walk_scenario_dir(
    config: &FsSourceConfig,
    dir: PathBuf,
    canonical_root: PathBuf,
    exclude: Vec<Pattern>,
) -> impl Iterator<Item = Discovered> + '_ {
    tracing::debug!(dir = %dir.display(), "walking scenario directory");

    let entries = WalkDir::new(&dir)
        .follow_links(config.follow_links)
        .max_depth(config.max_depth)
        .sort_by(files_first_by_name)
        .into_iter();

    entries.filter_map(move |entry_result| {
        let entry = match entry_result {
            Ok(e) => e,
            Err(walk_err) => {
                let path = walk_err
                    .path()
                    .map_or_else(|| dir.clone(), Path::to_path_buf);
                tracing::warn!(path = %path.display(), error = %walk_err, "directory traversal error");
                return Some(Err(ScanError {
                    file: path,
                    message: format!("directory traversal error: {walk_err}"),
                }));
            }
        };
        classify_entry(config, &entry, &canonical_root, &exclude)
    })
}

fn classify_entry(
    config: &FsSourceConfig,
    entry: &DirEntry,
    canonical_root: &Path,
    exclude: &[Pattern],
) -> Option<Discovered> {
    let file_path = entry.path();

    if !file_path.is_file() || is_special_file(entry) {
        return None;
    }

    let ext = file_path.extension().and_then(|e| e.to_str())?;
    if !config.accepts_extension(ext) {
        return None;
    }

    if matches_exclude(file_path, exclude) {
        tracing::debug!(file = %file_path.display(), "excluded by pattern");
        return None;
    }

    // Symlinked files may resolve outside the root even when directory
    // links are not followed.
    match file_path.canonicalize() {
        Ok(canonical) if !canonical.starts_with(canonical_root) => Some(Err(ScanError {
            file: file_path.to_path_buf(),
            message: format!(
                "path resolves outside repository root: {}",
                canonical.display()
            ),
        })),
        Ok(_) => Some(Ok(file_path.to_path_buf())),
        Err(e) => Some(Err(ScanError {
            file: file_path.to_path_buf(),
            message: format!("failed to canonicalize path: {e}"),
        })),
    }
}

/// Read a file using a bounded streaming read, enforcing `max_file_size`.
///
/// Uses `Read::take` so the size check and the read are the same operation.
///
/// # Errors
///
/// Returns a `LoadError` if the file cannot be opened or read, exceeds
/// `max_file_size`, or is not valid UTF-8.
pub fn read_file_bounded(path: &Path, max_file_size: u64) -> Result<String, LoadError> {
    let file = std::fs::File::open(path)?;

    // Read at most max_file_size + 1 bytes to detect oversized files
    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)?;

    if buffer.len() as u64 > max_file_size {
        return Err(LoadError::TooLarge {
            limit: max_file_size,
        });
    }

    String::from_utf8(buffer).map_err(|_| LoadError::Encoding)
}
