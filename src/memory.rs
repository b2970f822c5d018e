//! Available-memory estimation.
//!
//! The comparison engine holds one chunk buffer per open file, so the
//! chunk size is derived from how much memory the system can spare.
//! Estimation never fails: when the platform reports nothing useful a
//! fixed 1 GiB fallback is assumed.

use sysinfo::System;

/// Assumed available memory when the platform reports none.
pub const FALLBACK_AVAILABLE_MEMORY: u64 = 1 << 30;

/// Fraction of available memory handed to chunk buffers, in percent.
const BUDGET_PERCENT: u64 = 90;

/// Bytes of memory currently available, or the fallback.
#[must_use]
pub fn available_memory() -> u64 {
    let mut system = System::new();
    system.refresh_memory();

    let available = system.available_memory();
    if available == 0 {
        log::warn!(
            "could not determine available memory, assuming {} bytes",
            FALLBACK_AVAILABLE_MEMORY
        );
        return FALLBACK_AVAILABLE_MEMORY;
    }
    available
}

/// The chunk-buffer byte allowance: 90% of available memory, leaving
/// headroom for the rest of the process.
#[must_use]
pub fn usable_budget() -> u64 {
    available_memory() / 100 * BUDGET_PERCENT
}
