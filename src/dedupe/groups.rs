//! Size-based grouping of candidate files.
//!
//! Grouping by exact byte length is the first elimination step: files
//! of different sizes can never be byte-identical, so only same-size
//! groups ever reach the comparison engine. Within a group the files
//! are pre-sorted by filename stem, which makes the eventual keeper
//! choice deterministic and prefers `a.jpg` over its `a-1.jpg` style
//! copies.

use std::collections::BTreeMap;

use crate::scanner::FileEntry;

/// Files sharing one exact byte length; the unit of comparison.
#[derive(Debug, Clone)]
pub struct SizeGroup {
    /// Byte length shared by every file in the group.
    pub size: u64,
    /// Member files, ordered by filename stem ascending.
    pub files: Vec<FileEntry>,
}

impl SizeGroup {
    /// Create a group from pre-collected files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileEntry>) -> Self {
        Self { size, files }
    }

    /// Number of files in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether the group can contain duplicates at all (2+ files).
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Statistics from the grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total files grouped.
    pub total_files: usize,
    /// Distinct sizes observed.
    pub unique_sizes: usize,
    /// Files in groups of 2+ (the only ones worth comparing).
    pub candidate_files: usize,
    /// Files alone at their size, classified unique without any I/O.
    pub unique_files: usize,
    /// Zero-length files observed.
    pub empty_files: usize,
}

/// Group files by exact size.
///
/// Returns a `BTreeMap` so callers iterate groups in ascending size
/// order, which keeps runs over the same file set deterministic.
/// Singleton groups are retained (the driver reports them as unique);
/// within each group files are sorted by filename stem ascending.
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (BTreeMap<u64, SizeGroup>, GroupingStats) {
    let mut buckets: BTreeMap<u64, Vec<FileEntry>> = BTreeMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        if file.size == 0 {
            stats.empty_files += 1;
        }
        buckets.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = buckets.len();

    let groups: BTreeMap<u64, SizeGroup> = buckets
        .into_iter()
        .map(|(size, mut files)| {
            files.sort_by_key(FileEntry::stem);
            if files.len() == 1 {
                stats.unique_files += 1;
            } else {
                stats.candidate_files += files.len();
                log::debug!("size group {} bytes: {} candidates", size, files.len());
            }
            (size, SizeGroup::with_files(size, files))
        })
        .collect();

    log::info!(
        "grouped {} files into {} sizes ({} candidates, {} unique)",
        stats.total_files,
        stats.unique_sizes,
        stats.candidate_files,
        stats.unique_files
    );

    (groups, stats)
}
