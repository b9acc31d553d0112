//! Protocol address types.

use core::fmt;

/// IPv4 address in wire byte order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ipv4Addr(pub [u8; 4]);

impl Ipv4Addr {
    /// The unspecified address, `0.0.0.0`
    pub const UNSPECIFIED: Ipv4Addr = Ipv4Addr([0; 4]);

    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
        Ipv4Addr([a, b, c, d])
    }

    pub const fn octets(&self) -> [u8; 4] {
        self.0
    }

    /// Copies an address out of the leading four bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than four bytes.
    pub fn from_slice(bytes: &[u8]) -> Ipv4Addr {
        let mut octets = [0u8; 4];
        octets.copy_from_slice(&bytes[..4]);
        Ipv4Addr(octets)
    }

    pub fn is_unspecified(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Parses a dotted-quad address such as `192.168.1.1`.
    pub fn parse(text: &str) -> Option<Ipv4Addr> {
        let mut octets = [0u8; 4];
        let mut parts = text.split('.');
        for octet in octets.iter_mut() {
            *octet = parts.next()?.parse().ok()?;
        }
        if parts.next().is_some() {
            return None;
        }
        Some(Ipv4Addr(octets))
    }
}

impl fmt::Display for Ipv4Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}
