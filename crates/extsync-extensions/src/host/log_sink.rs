//! Output pane that forwards to `tracing`

use std::sync::Mutex;
use tracing::{debug, info};

use super::LogSink;

/// Log sink writing completed lines through `tracing::info!`.
///
/// Text logged without a newline is held until the line is finished, so
/// "  Verifying... " followed by "OK" comes out as a single line.
#[derive(Debug, Default)]
pub struct TracingLogSink {
    pending: Mutex<String>,
}

impl TracingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit any partial line still buffered
    pub fn flush(&self) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !pending.is_empty() {
            info!("{}", pending.trim_end());
            pending.clear();
        }
    }
}

impl LogSink for TracingLogSink {
    fn log(&self, message: &str, add_newline: bool) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.push_str(message);

        if add_newline {
            for line in pending.lines() {
                if !line.trim().is_empty() {
                    info!("{}", line.trim_end());
                }
            }
            pending.clear();
        }
    }

    fn show_pane(&self) {
        debug!("Output pane requested");
    }
}

impl Drop for TracingLogSink {
    fn drop(&mut self) {
        self.flush();
    }
}
