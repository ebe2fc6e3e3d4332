//! HEP3 wire protocol - packet model and TLV codec
//!
//! This crate provides the types that flow through the capture pipeline:
//! - `HepPacket` - one decoded capture observation
//! - `decode` / `encode` - the HEP3 TLV framing codec
//! - `chunk` - chunk type and payload type identifiers
//!
//! # Wire Format
//!
//! A HEP3 message is a fixed 6-byte header followed by TLV chunks:
//!
//! ```text
//! [4 bytes: "HEP3"][2 bytes: total length BE]
//!   [chunk][chunk][chunk]...
//!
//! chunk = [2 bytes: vendor id][2 bytes: type BE][2 bytes: length BE][body]
//! ```
//!
//! The chunk length includes the 6-byte chunk header. Unknown chunk types
//! are skipped on decode for forward compatibility.
//!
//! # Safety
//!
//! All decoding is bounds checked. Malformed frames return typed errors
//! rather than panicking or reading out of bounds.

pub mod chunk;
mod decode;
mod encode;
mod error;
mod packet;

pub use decode::decode;
pub use encode::encode;
pub use error::DecodeError;
pub use packet::{timestamp_from, HepPacket};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// The four magic bytes opening every HEP3 message
pub const HEP3_MAGIC: [u8; 4] = *b"HEP3";

/// Fixed message header length (magic + total length)
pub const HEADER_LEN: usize = 6;

/// Fixed chunk header length (vendor + type + length)
pub const CHUNK_HEADER_LEN: usize = 6;

/// Maximum accepted HEP3 message size in bytes
pub const MAX_PACKET_SIZE: usize = 8192;

/// IP family byte for IPv4 packets
pub const FAMILY_IPV4: u8 = 0x02;

/// IP family byte for IPv6 packets
pub const FAMILY_IPV6: u8 = 0x0a;
