//! Date-based photo organizing.
//!
//! Each candidate photo gets a date from the first available source
//! (EXIF metadata, a timestamp encoded in the filename, optionally the
//! file modification time) and a destination directory rendered from
//! the user's `--dir-fmt` notation. Photos whose destination path
//! collides with an earlier photo's are marked duplicates and left in
//! place, as are photos with no determinable date. Execution never
//! overwrites: an occupied destination skips the move with a message.

pub mod timeformat;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

use crate::fsops::FsOps;
use crate::progress::Progress;
use crate::scanner::FileEntry;

/// Behavior switches for one organize run.
#[derive(Debug, Clone)]
pub struct OrganizeConfig {
    /// Destination subdirectory format, already converted to strftime
    /// notation (see [`timeformat::to_strftime`]).
    pub dir_format: String,
    /// Read the date from EXIF metadata.
    pub use_exif_time: bool,
    /// Parse a timestamp encoded in the filename
    /// (`IMG_yyyymmdd_HHMMSS.jpg`, `VID_....mp4`).
    pub use_filename_time: bool,
    /// Fall back to the file modification time.
    pub use_file_time: bool,
    /// Report planned moves instead of performing them.
    pub dry_run: bool,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            dir_format: timeformat::to_strftime("yyyy/mm"),
            use_exif_time: true,
            use_filename_time: true,
            use_file_time: false,
            dry_run: false,
        }
    }
}

/// Errors that abort an organize run. Individual move failures are
/// reported and skipped instead; only interruption aborts.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The run was interrupted by the user.
    #[error("organize interrupted")]
    Interrupted,
}

/// One file's planned outcome.
#[derive(Debug, Clone)]
pub struct Placement {
    /// The source file.
    pub entry: FileEntry,
    /// The date chosen for it, when one was found.
    pub date: Option<NaiveDateTime>,
    /// Destination directory, cleared when the file will not move.
    pub new_dir: Option<PathBuf>,
    /// Full destination path, cleared when the file will not move.
    pub new_path: Option<PathBuf>,
    /// Why the file will not move, when it will not.
    pub note: Option<String>,
}

/// Summary of one organize run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizeStats {
    /// Files considered.
    pub total_files: usize,
    /// Files moved (or planned under dry-run).
    pub moved_files: usize,
    /// Files with no determinable date.
    pub undated_files: usize,
    /// Files skipped because their destination was already claimed by
    /// an earlier file in this run.
    pub duplicate_files: usize,
    /// Files skipped because the destination already exists on disk,
    /// plus individual move failures.
    pub skipped_files: usize,
}

/// The organize pipeline: date extraction → placement → guarded moves.
pub struct Organizer<'a> {
    config: OrganizeConfig,
    fs: &'a dyn FsOps,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<'a> Organizer<'a> {
    /// Create an organizer over the given filesystem capability.
    #[must_use]
    pub fn new(config: OrganizeConfig, fs: &'a dyn FsOps) -> Self {
        Self {
            config,
            fs,
            shutdown: None,
        }
    }

    /// Attach a shutdown flag, checked between files.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Plan destinations for every file.
    ///
    /// Placements come back sorted by destination path, then date
    /// (older first), then size descending, with same-destination
    /// collisions past the first marked as duplicates. The sort order
    /// makes the oldest (and, on a tie, largest) file the one that
    /// claims the destination.
    #[must_use]
    pub fn plan(&self, files: Vec<FileEntry>, dest: &Path, progress: &Progress) -> Vec<Placement> {
        let mut placements: Vec<Placement> = files
            .into_iter()
            .map(|entry| self.evaluate(entry, dest))
            .collect();

        placements.sort_by(|a, b| {
            a.new_path
                .cmp(&b.new_path)
                .then_with(|| a.date.cmp(&b.date))
                .then_with(|| b.entry.size.cmp(&a.entry.size))
        });

        // Later files that render to an already-claimed destination are
        // duplicates of the claiming file and stay put.
        let mut claimed: Option<PathBuf> = None;
        for placement in &mut placements {
            let Some(new_path) = placement.new_path.clone() else {
                continue;
            };
            if claimed.as_deref() == Some(new_path.as_path()) {
                placement.new_dir = None;
                placement.new_path = None;
                placement.note = Some(format!(
                    "{}: duplicate: {}",
                    placement.entry.path.display(),
                    new_path.display()
                ));
                progress.println(placement.note.as_deref().unwrap_or_default());
            } else {
                claimed = Some(new_path);
            }
        }

        placements
    }

    /// Execute a plan: create destination directories and move files.
    ///
    /// Individual failures (directory creation, rename, occupied
    /// destination) are reported and skipped; the run only aborts on
    /// interruption.
    ///
    /// # Errors
    ///
    /// [`OrganizeError::Interrupted`] when the shutdown flag is raised.
    pub fn execute(
        &self,
        placements: Vec<Placement>,
        progress: &Progress,
    ) -> Result<OrganizeStats, OrganizeError> {
        let mut stats = OrganizeStats {
            total_files: placements.len(),
            ..Default::default()
        };

        for placement in placements {
            if self.is_shutdown_requested() {
                return Err(OrganizeError::Interrupted);
            }

            self.execute_one(&placement, progress, &mut stats);
            progress.inc(1);
        }

        log::info!(
            "organized {} files: {} moved, {} duplicates, {} undated, {} skipped{}",
            stats.total_files,
            stats.moved_files,
            stats.duplicate_files,
            stats.undated_files,
            stats.skipped_files,
            if self.config.dry_run { ", dry run" } else { "" }
        );

        Ok(stats)
    }

    /// Plan and execute in one call.
    ///
    /// # Errors
    ///
    /// See [`Organizer::execute`].
    pub fn run(
        &self,
        files: Vec<FileEntry>,
        dest: &Path,
        progress: &Progress,
    ) -> Result<OrganizeStats, OrganizeError> {
        let placements = self.plan(files, dest, progress);
        self.execute(placements, progress)
    }

    fn execute_one(&self, placement: &Placement, progress: &Progress, stats: &mut OrganizeStats) {
        let (Some(new_dir), Some(new_path)) = (&placement.new_dir, &placement.new_path) else {
            if placement.date.is_none() {
                stats.undated_files += 1;
            } else {
                stats.duplicate_files += 1;
            }
            return;
        };

        if *new_path == placement.entry.path {
            progress.println(format!("{}: same file", new_path.display()));
            stats.skipped_files += 1;
            return;
        }

        // Never overwrite: an occupied destination is skipped.
        if new_path.symlink_metadata().is_ok() {
            progress.println(format!("{}: already exists", new_path.display()));
            stats.skipped_files += 1;
            return;
        }

        if self.config.dry_run {
            progress.println(format!(
                "mv \"{}\" \"{}\"",
                placement.entry.path.display(),
                new_path.display()
            ));
            stats.moved_files += 1;
            return;
        }

        if let Err(e) = self.fs.create_dir_all(new_dir) {
            progress.println(format!(
                "{}: failed to create directory: {}",
                new_dir.display(),
                e
            ));
            stats.skipped_files += 1;
            return;
        }
        if let Err(e) = self.fs.rename(&placement.entry.path, new_path) {
            progress.println(format!("{}: failed to move: {}", new_path.display(), e));
            stats.skipped_files += 1;
            return;
        }

        stats.moved_files += 1;
    }

    /// Determine a file's date and destination.
    fn evaluate(&self, entry: FileEntry, dest: &Path) -> Placement {
        let date = self.extract_date(&entry);

        let Some(date) = date else {
            let note = format!("{}: could not determine date/time", entry.path.display());
            log::info!("{note}");
            return Placement {
                entry,
                date: None,
                new_dir: None,
                new_path: None,
                note: Some(note),
            };
        };

        let subdir = date.format(&self.config.dir_format).to_string();
        let new_dir = dest.join(subdir);
        let file_name = entry.path.file_name().map(PathBuf::from).unwrap_or_default();
        let new_path = new_dir.join(file_name);

        Placement {
            entry,
            date: Some(date),
            new_dir: Some(new_dir),
            new_path: Some(new_path),
            note: None,
        }
    }

    fn extract_date(&self, entry: &FileEntry) -> Option<NaiveDateTime> {
        if self.config.use_exif_time {
            if let Some(date) = exif_datetime(&entry.path) {
                return Some(date);
            }
        }
        if self.config.use_filename_time {
            let name = entry.path.file_name()?.to_string_lossy();
            if let Some(date) = filename_datetime(&name) {
                return Some(date);
            }
        }
        if self.config.use_file_time {
            return Some(DateTime::<Local>::from(entry.modified).naive_local());
        }
        None
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Read the capture date from EXIF metadata, trying DateTimeOriginal
/// first and falling back to DateTime.
#[must_use]
pub fn exif_datetime(path: &Path) -> Option<NaiveDateTime> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            log::debug!("{}: error opening file ({})", path.display(), e);
            return None;
        }
    };
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            log::debug!("{}: error reading meta data ({})", path.display(), e);
            return None;
        }
    };

    let field = exif
        .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
        .or_else(|| exif.get_field(exif::Tag::DateTime, exif::In::PRIMARY))?;
    let ascii = match &field.value {
        exif::Value::Ascii(values) => values.first()?,
        _ => return None,
    };
    let dt = exif::DateTime::from_ascii(ascii).ok()?;

    NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))?
        .and_hms_opt(
            u32::from(dt.hour),
            u32::from(dt.minute),
            u32::from(dt.second),
        )
}

static FILENAME_TIME_RE: OnceLock<Regex> = OnceLock::new();

/// Parse a timestamp encoded in a camera-style filename:
/// `IMG_20170102_030405.jpg` or `VID_20170102_030405.mp4`.
#[must_use]
pub fn filename_datetime(name: &str) -> Option<NaiveDateTime> {
    let re = FILENAME_TIME_RE.get_or_init(|| {
        Regex::new(r"^(?i:IMG|VID)_(\d{8}_\d{6})\.(?i:jpg|mp4)$")
            .expect("filename timestamp pattern is valid")
    });
    let caps = re.captures(name)?;
    NaiveDateTime::parse_from_str(&caps[1], "%Y%m%d_%H%M%S").ok()
}
