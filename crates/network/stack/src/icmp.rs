//! ICMP echo messages.

use crate::checksum;

/// Message type for an echo reply
pub const TYPE_ECHO_REPLY: u8 = 0;
/// Message type for an echo request
pub const TYPE_ECHO_REQUEST: u8 = 8;

/// Octets in an echo message header
pub const HEADER_LEN: usize = 8;

/// Identifier stamped into locally generated echo requests
pub const ECHO_IDENT: u16 = 0x1234;

/// Payload length of locally generated echo requests
pub const ECHO_PAYLOAD_LEN: usize = 56;

/// Decoded echo message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoHeader {
    pub msg_type: u8,
    pub code: u8,
    pub ident: u16,
    pub seq: u16,
}

/// Builds an echo request with the incrementing-byte test payload
/// into `buf` and returns the message length.
pub fn encode_echo_request(buf: &mut [u8], seq: u16) -> usize {
    let len = HEADER_LEN + ECHO_PAYLOAD_LEN;
    buf[0] = TYPE_ECHO_REQUEST;
    buf[1] = 0;
    buf[2..4].copy_from_slice(&[0, 0]);
    buf[4..6].copy_from_slice(&ECHO_IDENT.to_be_bytes());
    buf[6..8].copy_from_slice(&seq.to_be_bytes());
    for (offset, byte) in buf[HEADER_LEN..len].iter_mut().enumerate() {
        *byte = offset as u8;
    }
    let sum = checksum::compute(&buf[..len]);
    buf[2..4].copy_from_slice(&sum.to_be_bytes());
    len
}

/// Splits an echo message into header and payload.
///
/// The checksum is not inspected here; the datagram layer already
/// validated its own header and the legacy path trusts the rest.
pub fn parse(bytes: &[u8]) -> Option<(EchoHeader, &[u8])> {
    if bytes.len() < HEADER_LEN {
        return None;
    }
    let header = EchoHeader {
        msg_type: bytes[0],
        code: bytes[1],
        ident: u16::from_be_bytes([bytes[4], bytes[5]]),
        seq: u16::from_be_bytes([bytes[6], bytes[7]]),
    };
    Some((header, &bytes[HEADER_LEN..]))
}

/// Turns a received echo request into its reply in `out` and returns
/// the message length.
///
/// The request is copied verbatim with only the type rewritten and
/// the checksum recomputed, so payloads of any length echo back
/// unchanged.
pub fn make_reply(message: &[u8], out: &mut [u8]) -> Option<usize> {
    if message.len() < HEADER_LEN || out.len() < message.len() {
        return None;
    }
    let len = message.len();
    out[..len].copy_from_slice(message);
    out[0] = TYPE_ECHO_REPLY;
    out[2] = 0;
    out[3] = 0;
    let sum = checksum::compute(&out[..len]);
    out[2..4].copy_from_slice(&sum.to_be_bytes());
    Some(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout() {
        let mut buf = [0u8; HEADER_LEN + ECHO_PAYLOAD_LEN];
        let len = encode_echo_request(&mut buf, 5);
        assert_eq!(len, 64);

        let (header, payload) = parse(&buf[..len]).unwrap();
        assert_eq!(header.msg_type, TYPE_ECHO_REQUEST);
        assert_eq!(header.code, 0);
        assert_eq!(header.ident, ECHO_IDENT);
        assert_eq!(header.seq, 5);
        assert_eq!(payload.len(), ECHO_PAYLOAD_LEN);
        assert!(payload.iter().enumerate().all(|(i, b)| *b == i as u8));
        assert!(checksum::verify(&buf[..len]));
    }

    #[test]
    fn test_parse_rejects_short_message() {
        assert!(parse(&[0u8; HEADER_LEN - 1]).is_none());
    }

    #[test]
    fn test_reply_preserves_request_verbatim() {
        let mut request = [0u8; HEADER_LEN + 11];
        request[0] = TYPE_ECHO_REQUEST;
        request[4..6].copy_from_slice(&0xBEEFu16.to_be_bytes());
        request[6..8].copy_from_slice(&42u16.to_be_bytes());
        request[HEADER_LEN..].copy_from_slice(b"odd payload");
        let sum = checksum::compute(&request);
        request[2..4].copy_from_slice(&sum.to_be_bytes());

        let mut out = [0u8; 64];
        let len = make_reply(&request, &mut out).unwrap();
        assert_eq!(len, request.len());

        let (header, payload) = parse(&out[..len]).unwrap();
        assert_eq!(header.msg_type, TYPE_ECHO_REPLY);
        assert_eq!(header.ident, 0xBEEF);
        assert_eq!(header.seq, 42);
        assert_eq!(payload, b"odd payload");
        assert!(checksum::verify(&out[..len]));
    }

    #[test]
    fn test_reply_needs_room_and_header() {
        let mut out = [0u8; 4];
        assert!(make_reply(&[0u8; 16], &mut out).is_none());
        let mut out = [0u8; 64];
        assert!(make_reply(&[0u8; HEADER_LEN - 1], &mut out).is_none());
    }

    #[test]
    fn test_encoded_request_matches_reference_parser() {
        use smoltcp::wire::{Icmpv4Message, Icmpv4Packet};

        let mut buf = [0u8; HEADER_LEN + ECHO_PAYLOAD_LEN];
        let len = encode_echo_request(&mut buf, 9);

        let parsed = Icmpv4Packet::new_checked(&buf[..len]).unwrap();
        assert!(parsed.verify_checksum());
        assert_eq!(parsed.msg_type(), Icmpv4Message::EchoRequest);
        assert_eq!(parsed.msg_code(), 0);
        assert_eq!(parsed.echo_ident(), ECHO_IDENT);
        assert_eq!(parsed.echo_seq_no(), 9);
    }
}
