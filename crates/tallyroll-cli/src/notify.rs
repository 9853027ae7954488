//! Terminal progress output and exit codes
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: every requested export was written |
//! | 1 | Failure: at least one export failed, or the input could not be read |

use std::io::Write;
use std::process;
use tallyroll_core::{NotificationState, Notifier};

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    pub fn from_failure_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Terminal Notifier
// ============================================================================

/// Notifier that writes export progress to a terminal stream (stderr in `main`)
pub struct TerminalNotifier<W: Write> {
    writer: W,
    /// Only show errors
    quiet: bool,
    failures: usize,
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(writer: W, quiet: bool) -> Self {
        Self {
            writer,
            quiet,
            failures: 0,
        }
    }

    /// Number of error notifications seen so far
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn notify(&mut self, state: NotificationState, message: &str) {
        let line = match state {
            NotificationState::Pending => {
                tracing::debug!("{message}");
                format!("... {message}")
            }
            NotificationState::Success => {
                tracing::info!("{message}");
                format!("ok: {message}")
            }
            NotificationState::Error => {
                self.failures += 1;
                format!("error: {message}")
            }
        };

        if self.quiet && state != NotificationState::Error {
            return;
        }
        // Write errors are ignored
        let _ = writeln!(self.writer, "{line}");
    }
}
