//! Default diagnostic sink: renders loop diagnostics as `tracing` events.
//!
//! Output format (text or JSON lines, file or stderr) belongs to whatever
//! subscriber the binary installs.

use lift_traits::{Diagnostic, DiagnosticSink};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, event: &Diagnostic) {
        match *event {
            Diagnostic::Break { position } => {
                tracing::warn!(position, "beam break, car stopped");
            }
            Diagnostic::Resumed => {
                tracing::info!("resumed after acknowledgment");
            }
            Diagnostic::Snapshot {
                raw,
                filtered,
                period_ms,
                paused,
                steps,
            } => {
                tracing::info!(
                    raw,
                    filtered,
                    period_ms,
                    steps_per_sec = crate::util::steps_per_sec(period_ms),
                    paused,
                    steps,
                    "status"
                );
            }
        }
    }
}
