//! HEP3 frame encoder
//!
//! Emits chunks in a fixed order: version, protocol, addresses (per IP
//! family), ports, capture time, payload type, node id, node password,
//! payload, and the correlation id when present. The total-length field is
//! fixed up once all chunks are written.
//!
//! KeepAliveTimer, CompressedPayload and Vlan are reserved and not emitted.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{chunk, HepPacket, CHUNK_HEADER_LEN, FAMILY_IPV4, FAMILY_IPV6, HEP3_MAGIC};
use std::net::IpAddr;

/// Encode a packet into a HEP3 frame ready for the wire
pub fn encode(hep: &HepPacket) -> Bytes {
    let mut buf = BytesMut::with_capacity(
        128 + hep.node_pw.len() + hep.payload.len() + hep.correlation_id.len(),
    );

    buf.put_slice(&HEP3_MAGIC);
    // Total length placeholder, fixed up below
    buf.put_u16(0);

    put_chunk(&mut buf, chunk::VERSION, &[hep.version]);
    put_chunk(&mut buf, chunk::PROTOCOL, &[hep.protocol]);

    match (hep.version, hep.src_ip, hep.dst_ip) {
        (FAMILY_IPV4, IpAddr::V4(src), IpAddr::V4(dst)) => {
            put_chunk(&mut buf, chunk::IP4_SRC, &src.octets());
            put_chunk(&mut buf, chunk::IP4_DST, &dst.octets());
        }
        (FAMILY_IPV6, IpAddr::V6(src), IpAddr::V6(dst)) => {
            put_chunk(&mut buf, chunk::IP6_SRC, &src.octets());
            put_chunk(&mut buf, chunk::IP6_DST, &dst.octets());
        }
        _ => {}
    }

    put_chunk(&mut buf, chunk::SRC_PORT, &hep.src_port.to_be_bytes());
    put_chunk(&mut buf, chunk::DST_PORT, &hep.dst_port.to_be_bytes());
    put_chunk(&mut buf, chunk::TSEC, &hep.tsec.to_be_bytes());
    put_chunk(&mut buf, chunk::TMSEC, &hep.tmsec.to_be_bytes());
    put_chunk(&mut buf, chunk::PROTO_TYPE, &[hep.proto_type]);
    put_chunk(&mut buf, chunk::NODE_ID, &hep.node_id.to_be_bytes());
    put_chunk(&mut buf, chunk::NODE_PW, hep.node_pw.as_bytes());
    put_chunk(&mut buf, chunk::PAYLOAD, hep.payload.as_bytes());

    if !hep.correlation_id.is_empty() {
        put_chunk(&mut buf, chunk::CORRELATION_ID, hep.correlation_id.as_bytes());
    }

    let total = buf.len() as u16;
    buf[4..6].copy_from_slice(&total.to_be_bytes());

    buf.freeze()
}

/// Write one TLV chunk with a zero vendor id
#[inline]
fn put_chunk(buf: &mut BytesMut, chunk_type: u16, body: &[u8]) {
    buf.put_u16(0);
    buf.put_u16(chunk_type);
    buf.put_u16((CHUNK_HEADER_LEN + body.len()) as u16);
    buf.put_slice(body);
}
