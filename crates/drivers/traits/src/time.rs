//! Millisecond delay

/// Millisecond delay source
pub trait Delay {
    /// Block the calling context for at least `ms` milliseconds
    fn delay_ms(&self, ms: u64);
}
