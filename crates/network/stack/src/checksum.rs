//! Internet checksum (RFC 1071).
//!
//! Used by the datagram layer over its header and by ICMP over whole
//! messages.

/// Computes the ones'-complement checksum of `data`.
///
/// 16-bit words are summed in big-endian order with end-around carry
/// folding; an odd trailing byte is treated as the high half of a
/// final word.
pub fn compute(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);
    for word in words.by_ref() {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
    }
    if let Some(&last) = words.remainder().first() {
        sum += u32::from(last) << 8;
    }
    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

/// True when `data`, including its embedded checksum field, sums to
/// zero.
pub fn verify(data: &[u8]) -> bool {
    compute(data) == 0
}
