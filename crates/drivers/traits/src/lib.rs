//! Hardware collaborator traits for the lark network subsystem
//!
//! The network core talks to the rest of the kernel exclusively through the
//! interfaces defined here. PCI discovery, DMA memory, millisecond delay, and
//! diagnostic output are supplied by the host; the NIC driver is consumed by
//! the protocol stack through [`nic::NicDevice`]. Nothing in this crate (or
//! its dependents) reaches for global state.
//!
//! # Debug Features
//!
//! Enable debug output for specific subsystems at compile time:
//! ```toml
//! lark-driver-traits = { path = "...", features = ["debug-network"] }
//! ```
//!
//! Available features:
//! - `debug-all`: Enable all debug output
//! - `debug-network`: NIC driver and protocol stack tracing
//! - `debug-bus`: Bus probing

#![no_std]

// Re-export all trait modules
pub mod bus;
pub mod diag;
pub mod mem;
pub mod nic;
pub mod time;
mod debug;

pub use bus::*;
pub use diag::*;
pub use mem::*;
pub use nic::*;
pub use time::*;
pub use debug::*;

use core::fmt;

/// Common error type for network driver and stack operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    /// No matching device on the bus
    DeviceNotFound,
    /// BAR0 absent, zero, or not a memory window
    MappingFailed,
    /// Register probe read back all-ones
    DeviceUnresponsive,
    /// Software reset did not complete within the bounded wait
    ResetTimeout,
    /// No free transmit descriptor; caller decides retry or drop
    TransmitBusy,
    /// Frame exceeds the transmit slot capacity
    FrameTooLarge,
    /// Destination hardware address unknown; a resolution request was sent,
    /// the payload was not queued
    ResolutionPending,
    /// Field validation failed on a received packet
    MalformedPacket,
}

pub type NetResult<T> = Result<T, NetError>;

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            NetError::DeviceNotFound => "device not found",
            NetError::MappingFailed => "register window mapping failed",
            NetError::DeviceUnresponsive => "device not responding",
            NetError::ResetTimeout => "device reset timed out",
            NetError::TransmitBusy => "transmit ring busy",
            NetError::FrameTooLarge => "frame too large",
            NetError::ResolutionPending => "address resolution pending",
            NetError::MalformedPacket => "malformed packet",
        };
        f.write_str(msg)
    }
}
