//! The chunk equality engine.
//!
//! Given one size group, the engine streams fixed-size chunks from
//! every member file in lockstep and incrementally partitions the
//! group into match groups of byte-identical files. No file is ever
//! loaded whole: peak memory is one chunk buffer per open file, and the
//! chunk size is derived from the memory budget.
//!
//! # Classification
//!
//! `match_group[i]` holds the index of the earliest file that file `i`
//! is still provably identical to, starting at `i` itself. Each chunk,
//! every file re-validates its candidate leader: the candidate must
//! still lead its own group (`match_group[j] == j`) and its current
//! chunk must compare equal. A failed candidate is advanced by one and
//! retried, up to `i` itself, at which point the file becomes its own
//! leader. Because equality is prefix-rooted, two files that diverge at
//! any chunk can never re-match, so once every file leads itself the
//! scan stops early.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use super::groups::SizeGroup;

/// Default preferred chunk size: 64 KiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 64 * 1024;

/// Chunk sizes are rounded down to this boundary.
pub const CHUNK_ALIGN: u64 = 4096;

/// Engine tuning knobs. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on the per-file chunk size.
    pub preferred_chunk_size: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preferred_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Errors from a single group comparison. All of them abort the
/// enclosing run; a half-compared group must never drive deletions.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A member file could not be opened.
    #[error("error opening {path}: {source}")]
    Open {
        /// The file that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A member file could not be read.
    #[error("error reading {path}: {source}")]
    Read {
        /// The file that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file ended before its recorded size was exhausted. The size
    /// metadata used for grouping was stale; continuing could classify
    /// a non-duplicate as deletable.
    #[error("{0}: unexpected end of file")]
    UnexpectedEof(PathBuf),

    /// The shutdown flag was raised between chunks.
    #[error("comparison interrupted")]
    Interrupted,
}

/// Per-file scan state: the open handle and its reusable chunk buffer.
struct FileRecord {
    path: PathBuf,
    file: File,
    buffer: Vec<u8>,
}

/// Compute the per-file chunk size for a group.
///
/// `floor(budget / file_count)` rounded down to a [`CHUNK_ALIGN`]
/// boundary; when that is zero or larger than `preferred`, fall back to
/// `preferred`. The result never exceeds `preferred`.
#[must_use]
pub fn chunk_size_for(memory_budget: u64, file_count: usize, preferred: u64) -> u64 {
    let mut chunk = memory_budget / file_count.max(1) as u64;
    chunk -= chunk % CHUNK_ALIGN;
    if chunk == 0 || chunk > preferred {
        preferred
    } else {
        chunk
    }
}

/// Classify one size group into match groups.
///
/// Returns, for each file index, the index of its match-group leader.
/// `result[i] == i` marks a survivor; any other value marks a confirmed
/// byte-identical duplicate of the file at that index.
///
/// All handles are opened up front and closed on every exit path. The
/// optional `shutdown` flag is consulted once per chunk; a raised flag
/// aborts with [`EngineError::Interrupted`] and no side effects.
///
/// # Errors
///
/// Any open or read failure, a short read against the recorded group
/// size, or interruption. See [`EngineError`].
pub fn compare_group(
    group: &SizeGroup,
    memory_budget: u64,
    config: &EngineConfig,
    shutdown: Option<&AtomicBool>,
) -> Result<Vec<usize>, EngineError> {
    let file_count = group.files.len();
    let max_chunk = chunk_size_for(memory_budget, file_count, config.preferred_chunk_size);
    log::debug!(
        "comparing {} files of {} bytes, chunk size {}",
        file_count,
        group.size,
        max_chunk
    );

    let mut records = Vec::with_capacity(file_count);
    for entry in &group.files {
        let file = File::open(&entry.path).map_err(|source| EngineError::Open {
            path: entry.path.clone(),
            source,
        })?;
        records.push(FileRecord {
            path: entry.path.clone(),
            file,
            buffer: Vec::new(),
        });
    }

    // Each file starts as its own leader.
    let mut match_group: Vec<usize> = (0..file_count).collect();

    let mut processed: u64 = 0;
    while processed < group.size {
        if shutdown.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            return Err(EngineError::Interrupted);
        }

        let chunk = (group.size - processed).min(max_chunk) as usize;

        for record in &mut records {
            record.buffer.resize(chunk, 0);
            match record.file.read_exact(&mut record.buffer) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(EngineError::UnexpectedEof(record.path.clone()));
                }
                Err(source) => {
                    return Err(EngineError::Read {
                        path: record.path.clone(),
                        source,
                    });
                }
            }
        }

        let mut all_different = true;
        for i in 0..file_count {
            while match_group[i] < i {
                let j = match_group[i];
                // A candidate only counts while it still leads its own
                // group; a demoted leader forces the chain re-walk.
                if match_group[j] == j && records[i].buffer == records[j].buffer {
                    all_different = false;
                    break;
                }
                match_group[i] += 1;
            }
        }

        processed += chunk as u64;

        if all_different {
            // Diverged files can never re-match; stop scanning.
            log::debug!(
                "group of {} bytes fully diverged after {} bytes",
                group.size,
                processed
            );
            break;
        }
    }

    Ok(match_group)
}
