//! Network Interface Card Trait
//!
//! Implemented by NIC drivers (e1000 today).
//! Consumed by the protocol stack, which is generic over it.

use core::fmt;

use crate::NetResult;

/// MAC address in wire byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Link-layer broadcast address
    pub const BROADCAST: MacAddr = MacAddr([0xFF; 6]);
    /// All-zero placeholder address
    pub const ZERO: MacAddr = MacAddr([0; 6]);

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Copies an address out of the leading six bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than six bytes.
    pub fn from_slice(bytes: &[u8]) -> MacAddr {
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&bytes[..6]);
        MacAddr(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Network interface card trait
pub trait NicDevice {
    /// MAC address of this interface
    fn mac_address(&self) -> MacAddr;

    /// Send a raw Ethernet frame (header included)
    fn send_frame(&mut self, frame: &[u8]) -> NetResult<()>;

    /// Receive a raw Ethernet frame (non-blocking)
    ///
    /// # Returns
    /// * `Ok(Some(len))` - Frame received, len bytes written to buf
    /// * `Ok(None)` - No frame available
    fn receive_frame(&mut self, buf: &mut [u8]) -> NetResult<Option<usize>>;

    /// Check if the link is up
    fn link_up(&self) -> bool;

    /// PCI interrupt line, for the host to wire its receive vector
    fn interrupt_line(&self) -> u8;

    /// Acknowledge a pending interrupt cause, if the device latches one
    fn ack_interrupt(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_display() {
        extern crate std;
        use std::string::ToString;

        let mac = MacAddr([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);
        assert_eq!(mac.to_string(), "52:54:00:12:34:56");
    }

    #[test]
    fn test_mac_constants() {
        assert_eq!(MacAddr::BROADCAST.octets(), [0xFF; 6]);
        assert_eq!(MacAddr::ZERO.octets(), [0; 6]);
        assert_ne!(MacAddr::BROADCAST, MacAddr::ZERO);
    }
}
