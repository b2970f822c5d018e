//! Directory traversal and candidate-file collection.
//!
//! The scanner walks input paths with `walkdir` and produces
//! [`FileEntry`] records for every accepted file. Acceptance mirrors the
//! cleanup tool's focus: regular readable files, images only by default,
//! hidden files skipped by default, optional minimum size. Traversal
//! errors are fatal; silently skipping a subtree could later make the
//! dedupe driver delete the only reachable copy of a file.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use crate::progress::Progress;

/// File extensions accepted when `all_files` is off.
const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Metadata for a discovered candidate file.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path as produced by traversal.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

impl FileEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }

    /// Filename stem: the final path component with its extension
    /// removed. Used as the deterministic keeper-preference sort key
    /// ("a" sorts before "a-1").
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Acceptance filters for traversal.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Accept every regular file, not just images.
    pub all_files: bool,
    /// Accept hidden files (names starting with `.`).
    pub hidden_files: bool,
    /// Skip files smaller than this many bytes.
    pub min_size: u64,
}

/// Errors produced while collecting files.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Traversal failed below `root`.
    #[error("error walking {root}: {source}")]
    Walk {
        /// The path passed to the scanner.
        root: PathBuf,
        /// The underlying walkdir error.
        #[source]
        source: walkdir::Error,
    },

    /// A file's metadata could not be read.
    #[error("error reading metadata for {path}: {source}")]
    Metadata {
        /// The file in question.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Candidate-file collector.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Create a scanner with the given filters.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Collect all accepted files below `root`, appending to `out`.
    ///
    /// A running "Found N files" line is emitted through `progress`
    /// every thousand files.
    ///
    /// # Errors
    ///
    /// Any traversal or metadata error aborts collection.
    pub fn scan_into(
        &self,
        root: &Path,
        progress: &Progress,
        out: &mut Vec<FileEntry>,
    ) -> Result<(), ScanError> {
        let before = out.len();

        for entry in walkdir::WalkDir::new(root) {
            let entry = entry.map_err(|source| ScanError::Walk {
                root: root.to_path_buf(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry.metadata().map_err(|source| ScanError::Walk {
                root: root.to_path_buf(),
                source,
            })?;

            let name = entry.file_name().to_string_lossy();
            if let Some(reason) = self.skip_reason(&name, metadata.len(), &metadata) {
                log::debug!("{}: skipping: {}", entry.path().display(), reason);
                continue;
            }

            let modified = metadata.modified().map_err(|source| ScanError::Metadata {
                path: entry.path().to_path_buf(),
                source,
            })?;

            out.push(FileEntry::new(
                entry.path().to_path_buf(),
                metadata.len(),
                modified,
            ));

            if (out.len() - before) % 1000 == 0 {
                progress.println(format!("Found {} files.", out.len() - before));
            }
        }

        progress.println(format!("Found {} files.", out.len() - before));
        Ok(())
    }

    /// Collect all accepted files below `root`.
    ///
    /// # Errors
    ///
    /// See [`Scanner::scan_into`].
    pub fn scan(&self, root: &Path, progress: &Progress) -> Result<Vec<FileEntry>, ScanError> {
        let mut files = Vec::new();
        self.scan_into(root, progress, &mut files)?;
        Ok(files)
    }

    /// Why a file is rejected, or `None` if it is accepted.
    fn skip_reason(
        &self,
        name: &str,
        size: u64,
        metadata: &std::fs::Metadata,
    ) -> Option<&'static str> {
        if !is_readable(metadata) {
            return Some("not readable file");
        }
        if !self.config.hidden_files && name.starts_with('.') {
            return Some("hidden file");
        }
        if !self.config.all_files && !has_accepted_extension(name) {
            return Some("not image file");
        }
        if size < self.config.min_size {
            return Some("small file");
        }
        None
    }
}

/// Whether the filename carries one of the accepted image extensions.
fn has_accepted_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Owner-readable check. Only meaningful on Unix; elsewhere every
/// regular file is considered readable and the open call will say
/// otherwise.
#[cfg(unix)]
fn is_readable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o400 == 0o400
}

#[cfg(not(unix))]
fn is_readable(_metadata: &std::fs::Metadata) -> bool {
    true
}
