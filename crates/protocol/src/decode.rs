//! HEP3 frame decoder
//!
//! Walks the TLV chunk sequence after validating the magic and the declared
//! total length. Unknown chunk types are skipped; recognised chunks with a
//! body shorter than their fixed width are rejected as overflow rather than
//! read out of bounds.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::{
    chunk, DecodeError, HepPacket, Result, CHUNK_HEADER_LEN, HEADER_LEN, HEP3_MAGIC,
};

/// Decode one HEP3 frame into a packet
///
/// # Errors
///
/// - [`DecodeError::Magic`] when the frame does not open with `"HEP3"`
/// - [`DecodeError::Length`] when the declared total length disagrees with
///   the frame length
/// - [`DecodeError::ChunkOverflow`] when a chunk claims more bytes than
///   remain, declares a length shorter than its own header, or carries a
///   body shorter than its type requires
pub fn decode(packet: &[u8]) -> Result<HepPacket> {
    if packet.len() < 4 || packet[..4] != HEP3_MAGIC {
        return Err(DecodeError::Magic);
    }
    if packet.len() < HEADER_LEN {
        return Err(DecodeError::Length {
            declared: HEADER_LEN,
            actual: packet.len(),
        });
    }

    let declared = u16::from_be_bytes([packet[4], packet[5]]) as usize;
    if declared != packet.len() {
        return Err(DecodeError::Length {
            declared,
            actual: packet.len(),
        });
    }

    let mut hep = HepPacket::default();
    let mut cursor = HEADER_LEN;

    while cursor < packet.len() {
        let remaining = &packet[cursor..];
        if remaining.len() < CHUNK_HEADER_LEN {
            return Err(DecodeError::overflow(CHUNK_HEADER_LEN, remaining.len()));
        }

        // Bytes 0..2 are the vendor id, ignored on decode
        let chunk_type = u16::from_be_bytes([remaining[2], remaining[3]]);
        let chunk_len = u16::from_be_bytes([remaining[4], remaining[5]]) as usize;

        // A length below the chunk header would loop forever; above the
        // remaining bytes it would read past the frame.
        if chunk_len < CHUNK_HEADER_LEN || chunk_len > remaining.len() {
            return Err(DecodeError::overflow(chunk_len, remaining.len()));
        }

        let body = &remaining[CHUNK_HEADER_LEN..chunk_len];

        match chunk_type {
            chunk::VERSION => hep.version = read_u8(body)?,
            chunk::PROTOCOL => hep.protocol = read_u8(body)?,
            chunk::IP4_SRC => {
                hep.src_ip = IpAddr::V4(Ipv4Addr::from(read_array::<4>(body)?));
                hep.src_ip_str = hep.src_ip.to_string();
            }
            chunk::IP4_DST => {
                hep.dst_ip = IpAddr::V4(Ipv4Addr::from(read_array::<4>(body)?));
                hep.dst_ip_str = hep.dst_ip.to_string();
            }
            chunk::IP6_SRC => {
                hep.src_ip = IpAddr::V6(Ipv6Addr::from(read_array::<16>(body)?));
                hep.src_ip_str = hep.src_ip.to_string();
            }
            chunk::IP6_DST => {
                hep.dst_ip = IpAddr::V6(Ipv6Addr::from(read_array::<16>(body)?));
                hep.dst_ip_str = hep.dst_ip.to_string();
            }
            chunk::SRC_PORT => hep.src_port = read_u16(body)?,
            chunk::DST_PORT => hep.dst_port = read_u16(body)?,
            chunk::TSEC => hep.tsec = read_u32(body)?,
            chunk::TMSEC => hep.tmsec = read_u32(body)?,
            chunk::PROTO_TYPE => hep.proto_type = read_u8(body)?,
            chunk::NODE_ID => hep.node_id = read_u32(body)?,
            chunk::KEEP_ALIVE_TIMER => hep.keep_alive_timer = read_u16(body)?,
            chunk::NODE_PW => hep.node_pw = String::from_utf8_lossy(body).into_owned(),
            chunk::PAYLOAD => hep.payload = sanitize_utf8(body),
            chunk::COMPRESSED_PAYLOAD => hep.compressed_payload = body.to_vec(),
            chunk::CORRELATION_ID => {
                hep.correlation_id = String::from_utf8_lossy(body).into_owned()
            }
            chunk::VLAN => hep.vlan = read_u16(body)?,
            // Unknown vendor or future chunk types are tolerated
            _ => {}
        }

        cursor += chunk_len;
    }

    hep.timestamp = crate::timestamp_from(hep.tsec, hep.tmsec);

    Ok(hep)
}

#[inline]
fn read_u8(body: &[u8]) -> Result<u8> {
    match body.first() {
        Some(&b) => Ok(b),
        None => Err(DecodeError::overflow(1, 0)),
    }
}

#[inline]
fn read_u16(body: &[u8]) -> Result<u16> {
    Ok(u16::from_be_bytes(read_array::<2>(body)?))
}

#[inline]
fn read_u32(body: &[u8]) -> Result<u32> {
    Ok(u32::from_be_bytes(read_array::<4>(body)?))
}

#[inline]
fn read_array<const N: usize>(body: &[u8]) -> Result<[u8; N]> {
    match body.get(..N) {
        Some(slice) => {
            let mut out = [0u8; N];
            out.copy_from_slice(slice);
            Ok(out)
        }
        None => Err(DecodeError::overflow(N, body.len())),
    }
}

/// Reduce arbitrary bytes to valid UTF-8 text
///
/// Invalid byte runs are elided entirely. Valid scalar values, including a
/// literal U+FFFD that arrives well-encoded, are preserved.
pub(crate) fn sanitize_utf8(body: &[u8]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(err) => {
                let (valid, invalid) = rest.split_at(err.valid_up_to());
                if let Ok(s) = std::str::from_utf8(valid) {
                    out.push_str(s);
                }
                let skip = err.error_len().unwrap_or(invalid.len());
                rest = &invalid[skip..];
            }
        }
    }
    out
}
