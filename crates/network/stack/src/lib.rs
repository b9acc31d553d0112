//! Layered network data path over a [`NicDevice`].
//!
//! Ethernet II framing, ARP resolution with a small neighbour cache,
//! options-free IPv4 datagrams, and ICMP echo. Each interface is one
//! owned [`NetStack`]; hosts that service the stack from a device
//! interrupt wrap it in a [`SharedStack`].
//!
//! The split mirrors the wire: [`ether`] frames and dispatches,
//! [`arp`] resolves, [`ipv4`] carries, [`icmp`] answers pings.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod arp;
pub mod checksum;
pub mod ether;
pub mod icmp;
pub mod ipv4;
pub mod shared;
pub mod stack;
pub mod types;

#[cfg(test)]
mod testutil;

pub use lark_driver_traits::{Console, Delay, MacAddr, NetError, NetResult, NicDevice};

pub use arp::CacheEntry;
pub use shared::SharedStack;
pub use stack::{NetStack, StackConfig};
pub use types::Ipv4Addr;
