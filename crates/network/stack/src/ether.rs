//! Ethernet II framing and the EtherType dispatch table.

use lark_driver_traits::MacAddr;

/// EtherType carrying IPv4 datagrams
pub const ETHERTYPE_IPV4: u16 = 0x0800;
/// EtherType carrying ARP packets
pub const ETHERTYPE_ARP: u16 = 0x0806;

/// Octets in an Ethernet II header
pub const HEADER_LEN: usize = 14;
/// Largest frame the stack builds or accepts, header included
pub const MAX_FRAME: usize = 1518;

/// Decoded Ethernet II header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub dest: MacAddr,
    pub source: MacAddr,
    pub ethertype: u16,
}

/// Writes a header for `ethertype` into the front of `frame`.
pub fn encode_header(frame: &mut [u8], dest: MacAddr, source: MacAddr, ethertype: u16) {
    frame[0..6].copy_from_slice(&dest.octets());
    frame[6..12].copy_from_slice(&source.octets());
    frame[12..14].copy_from_slice(&ethertype.to_be_bytes());
}

/// Splits a received frame into its header and payload.
pub fn parse(frame: &[u8]) -> Option<(FrameHeader, &[u8])> {
    if frame.len() < HEADER_LEN {
        return None;
    }
    let header = FrameHeader {
        dest: MacAddr::from_slice(&frame[0..6]),
        source: MacAddr::from_slice(&frame[6..12]),
        ethertype: u16::from_be_bytes([frame[12], frame[13]]),
    };
    Some((header, &frame[HEADER_LEN..]))
}

/// Where the receive path routes a frame after header parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSink {
    /// Hand the payload to the ARP resolver.
    Resolver,
    /// Hand the payload to the IPv4 datagram layer.
    Datagram,
}

const DISPATCH_SLOTS: usize = 4;

/// EtherType to sink bindings consulted for every received frame.
///
/// Frames whose EtherType has no binding are dropped silently.
pub struct EtherDispatch {
    slots: [Option<(u16, FrameSink)>; DISPATCH_SLOTS],
}

impl EtherDispatch {
    pub const fn new() -> EtherDispatch {
        EtherDispatch {
            slots: [None; DISPATCH_SLOTS],
        }
    }

    /// Binds `ethertype` to `sink`, replacing an existing binding for
    /// the same EtherType. Returns false when the table is full.
    pub fn register(&mut self, ethertype: u16, sink: FrameSink) -> bool {
        for slot in self.slots.iter_mut() {
            if let Some((bound, existing)) = slot {
                if *bound == ethertype {
                    *existing = sink;
                    return true;
                }
            }
        }
        for slot in self.slots.iter_mut() {
            if slot.is_none() {
                *slot = Some((ethertype, sink));
                return true;
            }
        }
        false
    }

    pub fn lookup(&self, ethertype: u16) -> Option<FrameSink> {
        self.slots
            .iter()
            .flatten()
            .find(|(bound, _)| *bound == ethertype)
            .map(|(_, sink)| *sink)
    }
}
