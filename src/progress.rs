//! Progress reporting using indicatif.
//!
//! Wraps a single [`ProgressBar`] so callers can tick a per-file
//! "Processed N of M files" line and print report blocks without the
//! bar clobbering them. Under `--quiet` nothing is drawn and report
//! lines are suppressed, matching the logger's quiet policy.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for file-oriented phases.
pub struct Progress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl Progress {
    /// Reporter with no bar. Report lines still print unless `quiet`.
    #[must_use]
    pub fn hidden(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    /// Reporter counting `total` files with a `verb` label, e.g.
    /// `Progress::files("Processed", 128, false)` renders
    /// "Processed 0 of 128 files".
    #[must_use]
    pub fn files(verb: &str, total: u64, quiet: bool) -> Self {
        if quiet {
            return Self::hidden(true);
        }

        let bar = ProgressBar::new(total);
        let template = format!("{verb} {{pos}} of {{len}} files");
        bar.set_style(
            ProgressStyle::with_template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self {
            bar: Some(bar),
            quiet: false,
        }
    }

    /// Advance the counter by `n` files.
    pub fn inc(&self, n: u64) {
        if let Some(ref bar) = self.bar {
            bar.inc(n);
        }
    }

    /// Print a report line above the bar (or plainly when there is no
    /// bar). Suppressed under quiet.
    pub fn println(&self, line: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.bar {
            Some(ref bar) => bar.println(line.as_ref()),
            None => println!("{}", line.as_ref()),
        }
    }

    /// Finish the bar, leaving the final count on screen.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_reporter_is_inert() {
        let p = Progress::hidden(true);
        p.inc(5);
        p.println("never shown");
        p.finish();
    }

    #[test]
    fn quiet_files_reporter_has_no_bar() {
        let p = Progress::files("Processed", 10, true);
        assert!(p.bar.is_none());
    }
}
