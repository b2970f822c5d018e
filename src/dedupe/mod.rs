//! Duplicate removal: chunked, memory-bounded byte equality.
//!
//! # Overview
//!
//! The pipeline has three stages:
//! 1. **Size grouping** ([`groups`]): files of different lengths can
//!    never be identical, so candidates are bucketed by exact size and
//!    pre-sorted for a deterministic keeper preference.
//! 2. **Chunk comparison** ([`engine`]): each multi-file group is
//!    scanned chunk by chunk, all files in lockstep, classifying them
//!    into match groups of byte-identical files. Memory stays bounded
//!    at one chunk per open file; whole-file hashing is deliberately
//!    avoided (unbounded memory is not the issue there, collision
//!    false-positives are).
//! 3. **Deletion/reporting** ([`driver`]): match-group leaders are
//!    kept, followers are removed or rendered as a dry-run plan.
//!
//! # Example
//!
//! ```no_run
//! use photosweep::dedupe::{Deduper, DedupeConfig};
//! use photosweep::fsops::RealFs;
//! use photosweep::progress::Progress;
//! use photosweep::scanner::{ScanConfig, Scanner};
//! use std::path::Path;
//!
//! let progress = Progress::hidden(false);
//! let files = Scanner::new(ScanConfig::default())
//!     .scan(Path::new("photos"), &progress)
//!     .unwrap();
//!
//! let fs = RealFs;
//! let deduper = Deduper::new(DedupeConfig::default().with_dry_run(true), &fs);
//! let stats = deduper
//!     .run(files, photosweep::memory::usable_budget(), &progress)
//!     .unwrap();
//! println!("would remove {} files", stats.removed_files);
//! ```

pub mod driver;
pub mod engine;
pub mod groups;

pub use driver::{DedupeConfig, DedupeError, DedupeStats, Deduper};
pub use engine::{chunk_size_for, compare_group, EngineConfig, EngineError, DEFAULT_CHUNK_SIZE};
pub use groups::{group_by_size, GroupingStats, SizeGroup};
