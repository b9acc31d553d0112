//! ARP for IPv4 over Ethernet, plus the neighbour cache.

use lark_driver_traits::MacAddr;

use crate::ether::ETHERTYPE_IPV4;
use crate::types::Ipv4Addr;

pub const OP_REQUEST: u16 = 1;
pub const OP_REPLY: u16 = 2;

/// Octets in an IPv4-over-Ethernet ARP packet
pub const PACKET_LEN: usize = 28;

const HTYPE_ETHERNET: u16 = 1;
const HLEN_ETHERNET: u8 = 6;
const PLEN_IPV4: u8 = 4;

/// Decoded ARP packet.
///
/// Only the operation and the two address pairs vary; the hardware
/// and protocol type fields are fixed by this stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    pub oper: u16,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl ArpPacket {
    /// A who-has request for `target_ip`. The target hardware address
    /// is zeroed per convention.
    pub fn request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> ArpPacket {
        ArpPacket {
            oper: OP_REQUEST,
            sender_mac,
            sender_ip,
            target_mac: MacAddr::ZERO,
            target_ip,
        }
    }

    /// An is-at reply answering `target_mac`/`target_ip`.
    pub fn reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> ArpPacket {
        ArpPacket {
            oper: OP_REPLY,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        }
    }

    /// Serializes into the leading [`PACKET_LEN`] bytes of `buf`.
    pub fn encode(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&HTYPE_ETHERNET.to_be_bytes());
        buf[2..4].copy_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
        buf[4] = HLEN_ETHERNET;
        buf[5] = PLEN_IPV4;
        buf[6..8].copy_from_slice(&self.oper.to_be_bytes());
        buf[8..14].copy_from_slice(&self.sender_mac.octets());
        buf[14..18].copy_from_slice(&self.sender_ip.octets());
        buf[18..24].copy_from_slice(&self.target_mac.octets());
        buf[24..28].copy_from_slice(&self.target_ip.octets());
    }

    /// Decodes an IPv4-over-Ethernet ARP packet.
    ///
    /// Packets for other hardware or protocol types are rejected.
    /// Trailing bytes beyond [`PACKET_LEN`] are ignored, since
    /// minimum-size frames arrive padded.
    pub fn parse(bytes: &[u8]) -> Option<ArpPacket> {
        if bytes.len() < PACKET_LEN {
            return None;
        }
        if u16::from_be_bytes([bytes[0], bytes[1]]) != HTYPE_ETHERNET {
            return None;
        }
        if u16::from_be_bytes([bytes[2], bytes[3]]) != ETHERTYPE_IPV4 {
            return None;
        }
        if bytes[4] != HLEN_ETHERNET || bytes[5] != PLEN_IPV4 {
            return None;
        }
        Some(ArpPacket {
            oper: u16::from_be_bytes([bytes[6], bytes[7]]),
            sender_mac: MacAddr::from_slice(&bytes[8..14]),
            sender_ip: Ipv4Addr::from_slice(&bytes[14..18]),
            target_mac: MacAddr::from_slice(&bytes[18..24]),
            target_ip: Ipv4Addr::from_slice(&bytes[24..28]),
        })
    }
}

const CACHE_SLOTS: usize = 16;

#[derive(Clone, Copy)]
struct Slot {
    ip: Ipv4Addr,
    mac: MacAddr,
    age: u32,
    valid: bool,
}

impl Slot {
    const EMPTY: Slot = Slot {
        ip: Ipv4Addr::UNSPECIFIED,
        mac: MacAddr::ZERO,
        age: 0,
        valid: false,
    };
}

/// A valid mapping reported by [`ArpCache::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    pub age: u32,
}

/// Fixed-capacity IPv4 to MAC neighbour cache.
///
/// Mappings are learned from every ARP packet seen and never expire;
/// the age counter is reset on refresh but nothing consults it. With
/// all slots taken, unseen addresses are dropped rather than evicting
/// an older mapping.
pub struct ArpCache {
    slots: [Slot; CACHE_SLOTS],
}

impl ArpCache {
    pub const fn new() -> ArpCache {
        ArpCache {
            slots: [Slot::EMPTY; CACHE_SLOTS],
        }
    }

    /// Hardware address for `ip`, if a valid mapping exists.
    pub fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.slots
            .iter()
            .find(|slot| slot.valid && slot.ip == ip)
            .map(|slot| slot.mac)
    }

    /// Records `ip` as reachable at `mac`.
    ///
    /// An existing mapping for `ip` is refreshed in place, so each IP
    /// holds at most one slot.
    pub fn learn(&mut self, ip: Ipv4Addr, mac: MacAddr) {
        let mut free = None;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.valid && slot.ip == ip {
                slot.mac = mac;
                slot.age = 0;
                return;
            }
            if !slot.valid && free.is_none() {
                free = Some(index);
            }
        }
        if let Some(index) = free {
            self.slots[index] = Slot {
                ip,
                mac,
                age: 0,
                valid: true,
            };
        }
    }

    /// Iterates the valid mappings in slot order.
    pub fn entries(&self) -> impl Iterator<Item = CacheEntry> + '_ {
        self.slots.iter().filter(|slot| slot.valid).map(|slot| CacheEntry {
            ip: slot.ip,
            mac: slot.mac,
            age: slot.age,
        })
    }
}
