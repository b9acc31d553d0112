//! Diagnostic text output
//!
//! The stack reports through whatever console the host provides; there is no
//! global print machinery in these crates. Verbose per-packet tracing goes
//! through the feature-gated debug macros instead, never this trait.

use core::fmt;

/// Diagnostic text sink
pub trait Console {
    /// Write one formatted line
    fn write_line(&mut self, args: fmt::Arguments<'_>);
}
