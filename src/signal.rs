//! Ctrl+C handling for graceful shutdown.
//!
//! A shared `AtomicBool` is set when a termination signal arrives. The
//! comparison engine checks it between chunks (the only natural
//! suspension points) and the drivers check it between groups/files, so
//! an interrupted run always leaves every group fully closed with no
//! partial side effects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit code for SIGINT interruption: 128 + signal number (SIGINT = 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown flag with a convenient query API.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// New handler with shutdown not requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request shutdown (used by the signal handler and by tests).
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The underlying flag, for handing to long-running workers.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.flag.clone()
    }
}

/// Install the Ctrl+C handler and return the shared shutdown handle.
///
/// # Errors
///
/// Returns `ctrlc::Error` when the platform handler cannot be
/// installed (e.g. a handler already exists in this process).
pub fn install_handler() -> Result<ShutdownHandler, ctrlc::Error> {
    let handler = ShutdownHandler::new();
    let flag = handler.flag();

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        eprintln!("Interrupted. Cleaning up...");
    })?;

    Ok(handler)
}
