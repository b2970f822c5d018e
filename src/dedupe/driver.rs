//! Deletion and reporting driver.
//!
//! Consumes the engine's classification, group by group: leaders are
//! reported as kept, followers are deleted (or rendered as `rm` lines
//! under dry-run). Deletion goes through the injected [`FsOps`]
//! capability; permission-denied failures are downgraded to warnings
//! when the tolerance flag is set, anything else aborts the run.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use bytesize::ByteSize;
use thiserror::Error;

use super::engine::{compare_group, EngineConfig, EngineError, DEFAULT_CHUNK_SIZE};
use super::groups::{group_by_size, SizeGroup};
use crate::fsops::FsOps;
use crate::progress::Progress;
use crate::scanner::FileEntry;

/// Behavior switches for one dedupe run. Built once from the CLI and
/// passed in; nothing reads process-wide state.
#[derive(Debug, Clone)]
pub struct DedupeConfig {
    /// Upper bound on the per-file chunk size.
    pub preferred_chunk_size: u64,
    /// Treat all zero-length files as identical without comparison.
    pub empty_files_are_identical: bool,
    /// Report planned deletions instead of performing them.
    pub dry_run: bool,
    /// Downgrade permission-denied deletion failures to warnings.
    pub ignore_permission_denied: bool,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            preferred_chunk_size: DEFAULT_CHUNK_SIZE,
            empty_files_are_identical: false,
            dry_run: false,
            ignore_permission_denied: false,
        }
    }
}

impl DedupeConfig {
    /// Set the preferred chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, bytes: u64) -> Self {
        self.preferred_chunk_size = bytes;
        self
    }

    /// Enable the zero-length fast path.
    #[must_use]
    pub fn with_empty_files_are_identical(mut self, enabled: bool) -> Self {
        self.empty_files_are_identical = enabled;
        self
    }

    /// Enable dry-run reporting.
    #[must_use]
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Tolerate permission-denied deletion failures.
    #[must_use]
    pub fn with_ignore_permission_denied(mut self, enabled: bool) -> Self {
        self.ignore_permission_denied = enabled;
        self
    }
}

/// Errors that abort a dedupe run.
#[derive(Debug, Error)]
pub enum DedupeError {
    /// The comparison engine failed on a group.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A follower file could not be deleted.
    #[error("error deleting {path}: {source}")]
    Delete {
        /// The file the driver tried to delete.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The run was interrupted by the user.
    #[error("dedupe interrupted")]
    Interrupted,
}

/// Summary of one dedupe run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupeStats {
    /// Candidate files considered.
    pub total_files: usize,
    /// Files processed through grouping and comparison.
    pub processed_files: usize,
    /// Files kept as match-group leaders (or unique).
    pub kept_files: usize,
    /// Follower files removed (or planned for removal under dry-run).
    pub removed_files: usize,
    /// Bytes reclaimed by removals (or reclaimable under dry-run).
    pub reclaimed_bytes: u64,
}

/// The dedupe pipeline: group → compare → delete/report.
pub struct Deduper<'a> {
    config: DedupeConfig,
    fs: &'a dyn FsOps,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<'a> Deduper<'a> {
    /// Create a driver over the given filesystem capability.
    #[must_use]
    pub fn new(config: DedupeConfig, fs: &'a dyn FsOps) -> Self {
        Self {
            config,
            fs,
            shutdown: None,
        }
    }

    /// Attach a shutdown flag, checked between groups and between
    /// chunks inside the engine.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Run deduplication over a pre-collected candidate list.
    ///
    /// `memory_budget` is the byte allowance for chunk buffers, usually
    /// [`crate::memory::usable_budget`]. Progress ticks once per file
    /// as its group completes, regardless of deletion outcomes.
    ///
    /// # Errors
    ///
    /// See [`DedupeError`]; every error aborts the run.
    pub fn run(
        &self,
        files: Vec<FileEntry>,
        memory_budget: u64,
        progress: &Progress,
    ) -> Result<DedupeStats, DedupeError> {
        let (groups, grouping) = group_by_size(files);

        let mut stats = DedupeStats {
            total_files: grouping.total_files,
            ..Default::default()
        };

        let engine_config = EngineConfig {
            preferred_chunk_size: self.config.preferred_chunk_size,
        };

        for group in groups.values() {
            if self.is_shutdown_requested() {
                return Err(DedupeError::Interrupted);
            }

            if !group.has_candidates() {
                self.report_kept(progress, group);
                stats.kept_files += group.len();
            } else if group.size == 0 {
                self.process_empty_group(group, progress, &mut stats)?;
            } else {
                let match_group = compare_group(
                    group,
                    memory_budget,
                    &engine_config,
                    self.shutdown.as_deref(),
                )
                .map_err(|e| match e {
                    EngineError::Interrupted => DedupeError::Interrupted,
                    other => DedupeError::Engine(other),
                })?;
                self.apply_classification(group, &match_group, progress, &mut stats)?;
            }

            stats.processed_files += group.len();
            progress.inc(group.len() as u64);
        }

        log::info!(
            "processed {} files: kept {}, removed {} ({} reclaimed{})",
            stats.processed_files,
            stats.kept_files,
            stats.removed_files,
            ByteSize::b(stats.reclaimed_bytes),
            if self.config.dry_run { ", dry run" } else { "" }
        );

        Ok(stats)
    }

    /// Zero-length group: either everything past the first file is a
    /// duplicate (explicit flag), or nothing is comparable and all are
    /// kept. Empty files carry no content to distinguish them, so the
    /// default refuses to guess.
    fn process_empty_group(
        &self,
        group: &SizeGroup,
        progress: &Progress,
        stats: &mut DedupeStats,
    ) -> Result<(), DedupeError> {
        if self.config.empty_files_are_identical {
            progress.println("# Group:");
            for (i, file) in group.files.iter().enumerate() {
                if i == 0 {
                    progress.println(format!("## \"{}\"", file.path.display()));
                    stats.kept_files += 1;
                } else {
                    self.delete_file(file, progress, stats)?;
                }
            }
        } else {
            self.report_kept(progress, group);
            stats.kept_files += group.len();
        }
        Ok(())
    }

    /// Render one match-group classification: leaders kept, followers
    /// deleted.
    fn apply_classification(
        &self,
        group: &SizeGroup,
        match_group: &[usize],
        progress: &Progress,
        stats: &mut DedupeStats,
    ) -> Result<(), DedupeError> {
        progress.println("# Group:");
        for (i, file) in group.files.iter().enumerate() {
            if match_group[i] == i {
                progress.println(format!("## \"{}\"", file.path.display()));
                stats.kept_files += 1;
            } else {
                self.delete_file(file, progress, stats)?;
            }
        }
        Ok(())
    }

    /// Delete one follower, honoring dry-run and the permission-denied
    /// tolerance policy.
    fn delete_file(
        &self,
        file: &FileEntry,
        progress: &Progress,
        stats: &mut DedupeStats,
    ) -> Result<(), DedupeError> {
        if self.config.dry_run {
            progress.println(format!("rm \"{}\"", file.path.display()));
            stats.removed_files += 1;
            stats.reclaimed_bytes += file.size;
            return Ok(());
        }

        match self.fs.remove_file(&file.path) {
            Ok(()) => {
                stats.removed_files += 1;
                stats.reclaimed_bytes += file.size;
                Ok(())
            }
            Err(e)
                if e.kind() == ErrorKind::PermissionDenied
                    && self.config.ignore_permission_denied =>
            {
                log::warn!("{}: {}", file.path.display(), e);
                Ok(())
            }
            Err(source) => Err(DedupeError::Delete {
                path: file.path.clone(),
                source,
            }),
        }
    }

    fn report_kept(&self, progress: &Progress, group: &SizeGroup) {
        progress.println("# Group:");
        for file in &group.files {
            progress.println(format!("## \"{}\"", file.path.display()));
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|f| f.load(std::sync::atomic::Ordering::SeqCst))
    }
}
