//! Interface state and the transmit/receive paths tying the layers
//! together.

use lark_driver_traits::{Console, Delay, MacAddr, NetError, NetResult, NicDevice};

use crate::arp::{self, ArpCache, ArpPacket, CacheEntry};
use crate::ether::{
    self, EtherDispatch, FrameSink, ETHERTYPE_ARP, ETHERTYPE_IPV4,
    HEADER_LEN as ETHER_HEADER_LEN, MAX_FRAME,
};
use crate::icmp;
use crate::ipv4::{self, ProtoSink, ProtoTable, HEADER_LEN as IPV4_HEADER_LEN, PROTO_ICMP};
use crate::types::Ipv4Addr;

/// Echo requests sent per [`NetStack::ping`] call
const PING_COUNT: u16 = 4;

/// Interface configuration applied at attach time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackConfig {
    /// Local IPv4 address. Stays unspecified until assigned; there is
    /// no dynamic configuration.
    pub local_ip: Ipv4Addr,
}

/// One network interface and its protocol state.
///
/// Owns the device. Hosts that share a stack with an interrupt
/// handler wrap it in [`crate::SharedStack`].
pub struct NetStack<D: NicDevice> {
    dev: D,
    mac: MacAddr,
    local_ip: Ipv4Addr,
    dispatch: EtherDispatch,
    protocols: ProtoTable,
    cache: ArpCache,
    next_ident: u16,
}

impl<D: NicDevice> NetStack<D> {
    /// Takes ownership of an initialized device and binds the ARP and
    /// IPv4 sinks.
    pub fn attach(dev: D, config: StackConfig, con: &mut dyn Console) -> NetStack<D> {
        let mac = dev.mac_address();
        let mut stack = NetStack {
            dev,
            mac,
            local_ip: config.local_ip,
            dispatch: EtherDispatch::new(),
            protocols: ProtoTable::new(),
            cache: ArpCache::new(),
            next_ident: 0,
        };
        stack.dispatch.register(ETHERTYPE_ARP, FrameSink::Resolver);
        stack.dispatch.register(ETHERTYPE_IPV4, FrameSink::Datagram);
        stack.protocols.register(PROTO_ICMP, ProtoSink::Echo);
        con.write_line(format_args!("MAC Address: {}", stack.mac));
        stack
    }

    /// Releases the device for teardown or reattachment.
    pub fn detach(self) -> D {
        self.dev
    }

    pub fn mac_address(&self) -> MacAddr {
        self.mac
    }

    pub fn local_ip(&self) -> Ipv4Addr {
        self.local_ip
    }

    pub fn set_local_ip(&mut self, ip: Ipv4Addr) {
        self.local_ip = ip;
    }

    pub fn link_up(&self) -> bool {
        self.dev.link_up()
    }

    /// Interrupt line the host should wire [`NetStack::service`] to.
    pub fn interrupt_line(&self) -> u8 {
        self.dev.interrupt_line()
    }

    pub fn device(&self) -> &D {
        &self.dev
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.dev
    }

    /// Current resolver cache contents, for diagnostics.
    pub fn arp_entries(&self) -> impl Iterator<Item = CacheEntry> + '_ {
        self.cache.entries()
    }

    /// Broadcasts a resolution request for `target_ip`.
    pub fn arp_request(&mut self, target_ip: Ipv4Addr) -> NetResult<()> {
        let packet = ArpPacket::request(self.mac, self.local_ip, target_ip);
        let mut payload = [0u8; arp::PACKET_LEN];
        packet.encode(&mut payload);
        self.send_frame(MacAddr::BROADCAST, ETHERTYPE_ARP, &payload)
    }

    /// Sends `payload` to `dest_ip` as a single IPv4 datagram.
    ///
    /// On a resolver miss the datagram is dropped after one broadcast
    /// resolution request goes out, and the caller gets
    /// [`NetError::ResolutionPending`]; retry policy stays with the
    /// caller. The identification counter advances on every attempt,
    /// resolved or not.
    pub fn send_datagram(
        &mut self,
        dest_ip: Ipv4Addr,
        protocol: u8,
        payload: &[u8],
    ) -> NetResult<()> {
        let mut datagram = [0u8; MAX_FRAME - ETHER_HEADER_LEN];
        if IPV4_HEADER_LEN + payload.len() > datagram.len() {
            return Err(NetError::FrameTooLarge);
        }
        let ident = self.next_ident;
        self.next_ident = self.next_ident.wrapping_add(1);
        let total = ipv4::encode_header(
            &mut datagram,
            ident,
            protocol,
            payload.len(),
            self.local_ip,
            dest_ip,
        );
        datagram[IPV4_HEADER_LEN..total].copy_from_slice(payload);

        let dest_mac = match self.cache.lookup(dest_ip) {
            Some(mac) => mac,
            None => {
                self.arp_request(dest_ip)?;
                return Err(NetError::ResolutionPending);
            }
        };
        self.send_frame(dest_mac, ETHERTYPE_IPV4, &datagram[..total])
    }

    /// Sends one echo request carrying the test payload.
    pub fn send_echo_request(&mut self, dest_ip: Ipv4Addr, seq: u16) -> NetResult<()> {
        let mut message = [0u8; icmp::HEADER_LEN + icmp::ECHO_PAYLOAD_LEN];
        let len = icmp::encode_echo_request(&mut message, seq);
        self.send_datagram(dest_ip, PROTO_ICMP, &message[..len])
    }

    /// Pings `dest_ip` a few times, reporting each attempt on `con`.
    ///
    /// The first attempt against an unseen address fails while the
    /// resolver learns the target; replies are printed by
    /// [`NetStack::service`] when they arrive.
    pub fn ping(&mut self, dest_ip: Ipv4Addr, con: &mut dyn Console, delay: &dyn Delay) {
        con.write_line(format_args!("Pinging {}...", dest_ip));
        for seq in 0..PING_COUNT {
            match self.send_echo_request(dest_ip, seq) {
                Ok(()) => con.write_line(format_args!("Ping sent.")),
                Err(_) => con.write_line(format_args!("Failed to send ping.")),
            }
            delay.delay_ms(1000);
        }
    }

    /// Acknowledges the device interrupt, then drains and dispatches
    /// every completed receive slot.
    ///
    /// This is the interrupt service path; polling hosts may call it
    /// freely as well.
    pub fn service(&mut self, con: &mut dyn Console) {
        self.dev.ack_interrupt();
        let mut frame = [0u8; MAX_FRAME];
        while let Ok(Some(len)) = self.dev.receive_frame(&mut frame) {
            self.handle_frame(&frame[..len], con);
        }
    }

    fn send_frame(&mut self, dest: MacAddr, ethertype: u16, payload: &[u8]) -> NetResult<()> {
        if ETHER_HEADER_LEN + payload.len() > MAX_FRAME {
            return Err(NetError::FrameTooLarge);
        }
        let mut frame = [0u8; MAX_FRAME];
        ether::encode_header(&mut frame, dest, self.mac, ethertype);
        frame[ETHER_HEADER_LEN..ETHER_HEADER_LEN + payload.len()].copy_from_slice(payload);
        self.dev.send_frame(&frame[..ETHER_HEADER_LEN + payload.len()])
    }

    fn handle_frame(&mut self, frame: &[u8], con: &mut dyn Console) {
        let (header, payload) = match ether::parse(frame) {
            Some(parts) => parts,
            None => return,
        };
        match self.dispatch.lookup(header.ethertype) {
            Some(FrameSink::Resolver) => self.handle_arp(payload),
            Some(FrameSink::Datagram) => self.handle_datagram(payload, con),
            None => {}
        }
    }

    fn handle_arp(&mut self, payload: &[u8]) {
        let packet = match ArpPacket::parse(payload) {
            Some(packet) => packet,
            None => return,
        };
        // Learn from every valid packet, solicited or not.
        self.cache.learn(packet.sender_ip, packet.sender_mac);
        if packet.oper == arp::OP_REQUEST && packet.target_ip == self.local_ip {
            let reply = ArpPacket::reply(self.mac, self.local_ip, packet.sender_mac, packet.sender_ip);
            let mut bytes = [0u8; arp::PACKET_LEN];
            reply.encode(&mut bytes);
            // Unicast straight back to the requester.
            let _ = self.send_frame(packet.sender_mac, ETHERTYPE_ARP, &bytes);
        }
    }

    fn handle_datagram(&mut self, payload: &[u8], con: &mut dyn Console) {
        let (header, body) = match ipv4::parse(payload) {
            Some(parts) => parts,
            None => return,
        };
        if header.dest != self.local_ip {
            return;
        }
        match self.protocols.lookup(header.protocol) {
            Some(ProtoSink::Echo) => self.handle_echo(header.source, body, con),
            None => {}
        }
    }

    fn handle_echo(&mut self, source: Ipv4Addr, message: &[u8], con: &mut dyn Console) {
        let (header, _) = match icmp::parse(message) {
            Some(parts) => parts,
            None => return,
        };
        match header.msg_type {
            icmp::TYPE_ECHO_REQUEST => {
                let mut reply = [0u8; MAX_FRAME - ETHER_HEADER_LEN - IPV4_HEADER_LEN];
                if let Some(len) = icmp::make_reply(message, &mut reply) {
                    let _ = self.send_datagram(source, PROTO_ICMP, &reply[..len]);
                }
            }
            icmp::TYPE_ECHO_REPLY => {
                con.write_line(format_args!("Ping reply from {}: seq={}", source, header.seq));
            }
            _ => {}
        }
    }
}
