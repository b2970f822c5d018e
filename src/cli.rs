//! Command-line interface definitions for photosweep.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, dry-run, permission tolerance) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Remove duplicate photos under a directory
//! photosweep dedupe ~/Pictures
//!
//! # Preview the removals as shell commands instead
//! photosweep -n dedupe ~/Pictures
//!
//! # Sort photos into year/month folders by capture date
//! photosweep organize ~/Pictures/inbox ~/Pictures/albums
//!
//! # Verbose mode for debugging
//! photosweep -v dedupe ~/Pictures
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::dedupe::DEFAULT_CHUNK_SIZE;

/// Photo collection cleanup: duplicate removal and date-based sorting.
///
/// Photosweep compares same-sized files byte by byte in memory-bounded
/// chunks, so it never mistakes two distinct photos for duplicates, and
/// moves photos into directories derived from their capture date.
#[derive(Debug, Parser)]
#[command(name = "photosweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print planned actions as shell commands instead of performing them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Continue past files the process is not allowed to remove
    #[arg(long, global = true)]
    pub ignore_permission_denied: bool,

    /// Emit errors as JSON on stderr for scripting
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for photosweep.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove byte-identical duplicate photos
    Dedupe(DedupeArgs),
    /// Move photos into date-derived directories
    Organize(OrganizeArgs),
}

/// File acceptance filters shared by both subcommands.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Minimum file size to consider (e.g., 1KB, 1MiB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size, default_value = "0")]
    pub min_size: u64,

    /// Consider every regular file, not just jpg/jpeg images
    #[arg(long)]
    pub all_files: bool,

    /// Consider hidden files (names starting with a dot)
    #[arg(long)]
    pub hidden_files: bool,
}

/// Arguments for the dedupe subcommand.
#[derive(Debug, Args)]
pub struct DedupeArgs {
    /// Directories to scan for duplicates
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Preferred comparison chunk size (e.g., 64KiB, 1MB)
    ///
    /// Large size groups may get a smaller chunk to stay within the
    /// memory budget.
    #[arg(long, value_name = "SIZE", value_parser = parse_size,
          default_value = "64KiB")]
    pub chunk_size: u64,

    /// Treat zero-length files as duplicates of each other
    #[arg(long)]
    pub empty_files_are_identical: bool,
}

/// Arguments for the organize subcommand.
#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Directory holding the photos to sort
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Directory to sort them into
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Destination subdirectory layout (e.g., "yyyy/mm", "yyyy/mmmm/dd")
    #[arg(long, value_name = "FORMAT", default_value = "yyyy/mm")]
    pub dir_fmt: String,

    /// Read the photo date from EXIF metadata
    #[arg(long, value_name = "BOOL", default_value = "true",
          action = clap::ArgAction::Set)]
    pub use_exif_time: bool,

    /// Parse timestamps encoded in camera filenames (IMG_yyyymmdd_HHMMSS)
    #[arg(long, value_name = "BOOL", default_value = "true",
          action = clap::ArgAction::Set)]
    pub use_filename_encoded_time: bool,

    /// Fall back to the file modification time
    #[arg(long, value_name = "BOOL", default_value = "false",
          action = clap::ArgAction::Set)]
    pub use_file_time: bool,
}

impl FilterArgs {
    /// Convert to scanner filters.
    #[must_use]
    pub fn to_scan_config(&self) -> crate::scanner::ScanConfig {
        crate::scanner::ScanConfig {
            all_files: self.all_files,
            hidden_files: self.hidden_files,
            min_size: self.min_size,
        }
    }
}

impl DedupeArgs {
    /// Preferred chunk size, falling back to the built-in default when
    /// the flag parses to zero.
    #[must_use]
    pub fn preferred_chunk_size(&self) -> u64 {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB.
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use photosweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("64KiB").unwrap(), 65536);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1024B").unwrap(), 1024);
        assert_eq!(parse_size("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_size_kilobytes() {
        assert_eq!(parse_size("1KB").unwrap(), 1_000);
        assert_eq!(parse_size("1K").unwrap(), 1_000);
        assert_eq!(parse_size("1KiB").unwrap(), 1_024);
        assert_eq!(parse_size("64kib").unwrap(), 65_536); // Case insensitive
    }

    #[test]
    fn test_parse_size_megabytes() {
        assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
        assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
        assert_eq!(parse_size("10MB").unwrap(), 10_000_000);
    }

    #[test]
    fn test_parse_size_fractional() {
        assert_eq!(parse_size("1.5MB").unwrap(), 1_500_000);
        assert_eq!(parse_size("0.5GB").unwrap(), 500_000_000);
    }

    #[test]
    fn test_parse_size_with_whitespace() {
        assert_eq!(parse_size("  1024  ").unwrap(), 1024);
        assert_eq!(parse_size("1 MB").unwrap(), 1_000_000);
    }

    #[test]
    fn test_parse_size_errors() {
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("1XB").is_err());
        assert!(parse_size("-1MB").is_err());
    }

    #[test]
    fn test_cli_parse_dedupe_basic() {
        let cli = Cli::try_parse_from(["photosweep", "dedupe", "/some/path"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.dry_run);
        match cli.command {
            Commands::Dedupe(args) => {
                assert_eq!(args.paths, vec![PathBuf::from("/some/path")]);
                assert_eq!(args.chunk_size, 65_536);
                assert!(!args.empty_files_are_identical);
            }
            _ => panic!("Expected Dedupe command"),
        }
    }

    #[test]
    fn test_cli_parse_dedupe_multiple_paths() {
        let cli = Cli::try_parse_from(["photosweep", "dedupe", "/a", "/b"]).unwrap();
        match cli.command {
            Commands::Dedupe(args) => {
                assert_eq!(args.paths.len(), 2);
            }
            _ => panic!("Expected Dedupe command"),
        }
    }

    #[test]
    fn test_cli_parse_dedupe_with_options() {
        let cli = Cli::try_parse_from([
            "photosweep",
            "-v",
            "-n",
            "dedupe",
            "/path",
            "--chunk-size",
            "1MiB",
            "--min-size",
            "1KB",
            "--all-files",
            "--empty-files-are-identical",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        assert!(cli.dry_run);

        match cli.command {
            Commands::Dedupe(args) => {
                assert_eq!(args.chunk_size, 1_048_576);
                assert_eq!(args.filters.min_size, 1_000);
                assert!(args.filters.all_files);
                assert!(args.empty_files_are_identical);
            }
            _ => panic!("Expected Dedupe command"),
        }
    }

    #[test]
    fn test_cli_parse_organize_defaults() {
        let cli = Cli::try_parse_from(["photosweep", "organize", "/in", "/out"]).unwrap();
        match cli.command {
            Commands::Organize(args) => {
                assert_eq!(args.source, PathBuf::from("/in"));
                assert_eq!(args.dest, PathBuf::from("/out"));
                assert_eq!(args.dir_fmt, "yyyy/mm");
                assert!(args.use_exif_time);
                assert!(args.use_filename_encoded_time);
                assert!(!args.use_file_time);
            }
            _ => panic!("Expected Organize command"),
        }
    }

    #[test]
    fn test_cli_parse_organize_date_source_toggles() {
        let cli = Cli::try_parse_from([
            "photosweep",
            "organize",
            "/in",
            "/out",
            "--use-exif-time",
            "false",
            "--use-file-time",
            "true",
            "--dir-fmt",
            "yyyy/mmmm",
        ])
        .unwrap();
        match cli.command {
            Commands::Organize(args) => {
                assert!(!args.use_exif_time);
                assert!(args.use_file_time);
                assert_eq!(args.dir_fmt, "yyyy/mmmm");
            }
            _ => panic!("Expected Organize command"),
        }
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["photosweep", "-v", "-q", "dedupe", "/path"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_missing_path() {
        let result = Cli::try_parse_from(["photosweep", "dedupe"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_invalid_subcommand() {
        let result = Cli::try_parse_from(["photosweep", "invalid", "/path"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_version_flag() {
        let result = Cli::try_parse_from(["photosweep", "--version"]);
        assert!(result.is_err()); // clap exits on --version
    }

    #[test]
    fn test_preferred_chunk_size_zero_falls_back() {
        let cli =
            Cli::try_parse_from(["photosweep", "dedupe", "/p", "--chunk-size", "0"]).unwrap();
        match cli.command {
            Commands::Dedupe(args) => {
                assert_eq!(args.preferred_chunk_size(), DEFAULT_CHUNK_SIZE);
            }
            _ => panic!("Expected Dedupe command"),
        }
    }
}
