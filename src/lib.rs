//! Photosweep - Photo Collection Cleanup
//!
//! A Rust CLI application for removing byte-identical duplicate photos
//! and sorting photos into date-derived directories. Duplicate detection
//! compares same-sized files chunk by chunk with a bounded memory
//! budget, never by hashing, so false positives are impossible.

pub mod cli;
pub mod dedupe;
pub mod error;
pub mod fsops;
pub mod logging;
pub mod memory;
pub mod organize;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands, DedupeArgs, OrganizeArgs};
use crate::dedupe::{DedupeConfig, Deduper};
use crate::error::ExitCode;
use crate::fsops::RealFs;
use crate::organize::{timeformat, OrganizeConfig, Organizer};
use crate::progress::Progress;
use crate::scanner::{FileEntry, Scanner};

/// Run the application with parsed CLI arguments.
///
/// # Errors
///
/// Returns an error when scanning, deduplication, or organizing fails;
/// `main` maps interruption errors to exit code 130 and everything else
/// to a general error.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let shutdown = match signal::install_handler() {
        Ok(handler) => Some(handler.flag()),
        Err(e) => {
            log::warn!("could not install signal handler: {e}");
            None
        }
    };

    match &cli.command {
        Commands::Dedupe(args) => run_dedupe(&cli, args, shutdown),
        Commands::Organize(args) => run_organize(&cli, args, shutdown),
    }
}

fn run_dedupe(
    cli: &Cli,
    args: &DedupeArgs,
    shutdown: Option<Arc<AtomicBool>>,
) -> anyhow::Result<ExitCode> {
    let scanner = Scanner::new(args.filters.to_scan_config());
    let scan_progress = Progress::hidden(cli.quiet);

    let mut files: Vec<FileEntry> = Vec::new();
    for path in &args.paths {
        scanner
            .scan_into(path, &scan_progress, &mut files)
            .with_context(|| format!("scanning {}", path.display()))?;
    }

    let config = DedupeConfig::default()
        .with_chunk_size(args.preferred_chunk_size())
        .with_empty_files_are_identical(args.empty_files_are_identical)
        .with_dry_run(cli.dry_run)
        .with_ignore_permission_denied(cli.ignore_permission_denied);

    let progress = Progress::files("Processed", files.len() as u64, cli.quiet);
    let fs = RealFs;
    let mut deduper = Deduper::new(config, &fs);
    if let Some(flag) = shutdown {
        deduper = deduper.with_shutdown_flag(flag);
    }

    let stats = deduper.run(files, memory::usable_budget(), &progress)?;
    progress.finish();

    log::debug!("dedupe stats: {stats:?}");
    Ok(ExitCode::Success)
}

fn run_organize(
    cli: &Cli,
    args: &OrganizeArgs,
    shutdown: Option<Arc<AtomicBool>>,
) -> anyhow::Result<ExitCode> {
    let scanner = Scanner::new(args.filters.to_scan_config());
    let scan_progress = Progress::hidden(cli.quiet);
    let files = scanner
        .scan(&args.source, &scan_progress)
        .with_context(|| format!("scanning {}", args.source.display()))?;

    let config = OrganizeConfig {
        dir_format: timeformat::to_strftime(&args.dir_fmt),
        use_exif_time: args.use_exif_time,
        use_filename_time: args.use_filename_encoded_time,
        use_file_time: args.use_file_time,
        dry_run: cli.dry_run,
    };

    let progress = Progress::files("Moved", files.len() as u64, cli.quiet);
    let fs = RealFs;
    let mut organizer = Organizer::new(config, &fs);
    if let Some(flag) = shutdown {
        organizer = organizer.with_shutdown_flag(flag);
    }

    let stats = organizer.run(files, &args.dest, &progress)?;
    progress.finish();

    log::debug!("organize stats: {stats:?}");
    Ok(ExitCode::Success)
}
