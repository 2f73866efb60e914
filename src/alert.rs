//! Audible alert capability.
//!
//! The watch loop rings an alert sink for every person detection. The sink
//! is best-effort and fire-and-forget: `ring` cannot fail, and environments
//! without the capability get a no-op sink instead of a runtime branch on
//! platform identity.

use std::io::{IsTerminal, Write};

/// Fire-and-forget alert side effect.
pub trait AlertSink: Send + Sync {
    fn ring(&self);
}

/// Rings the terminal bell on stderr.
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn ring(&self) {
        let mut stderr = std::io::stderr();
        // IO errors are swallowed: the alert is best-effort.
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

/// No-op sink for environments without an audible capability.
pub struct SilentAlert;

impl AlertSink for SilentAlert {
    fn ring(&self) {}
}

/// Capability check: a terminal bell when stderr is a terminal, otherwise
/// silence.
pub fn default_alert_sink() -> Box<dyn AlertSink> {
    if std::io::stderr().is_terminal() {
        Box::new(TerminalBell)
    } else {
        Box::new(SilentAlert)
    }
}
