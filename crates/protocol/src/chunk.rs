//! HEP3 chunk type and payload type identifiers

/// Chunk 0x0001 - IP protocol family (0x02 = IPv4, 0x0a = IPv6)
pub const VERSION: u16 = 0x0001;
/// Chunk 0x0002 - IP protocol ID (0x06 = TCP, 0x11 = UDP)
pub const PROTOCOL: u16 = 0x0002;
/// Chunk 0x0003 - IPv4 source address
pub const IP4_SRC: u16 = 0x0003;
/// Chunk 0x0004 - IPv4 destination address
pub const IP4_DST: u16 = 0x0004;
/// Chunk 0x0005 - IPv6 source address
pub const IP6_SRC: u16 = 0x0005;
/// Chunk 0x0006 - IPv6 destination address
pub const IP6_DST: u16 = 0x0006;
/// Chunk 0x0007 - protocol source port
pub const SRC_PORT: u16 = 0x0007;
/// Chunk 0x0008 - protocol destination port
pub const DST_PORT: u16 = 0x0008;
/// Chunk 0x0009 - unix timestamp, seconds
pub const TSEC: u16 = 0x0009;
/// Chunk 0x000a - unix timestamp, microseconds offset
pub const TMSEC: u16 = 0x000a;
/// Chunk 0x000b - payload protocol type (SIP, RTCP, LOG, ...)
pub const PROTO_TYPE: u16 = 0x000b;
/// Chunk 0x000c - capture agent ID
pub const NODE_ID: u16 = 0x000c;
/// Chunk 0x000d - keep alive timer
pub const KEEP_ALIVE_TIMER: u16 = 0x000d;
/// Chunk 0x000e - authentication key
pub const NODE_PW: u16 = 0x000e;
/// Chunk 0x000f - captured packet payload
pub const PAYLOAD: u16 = 0x000f;
/// Chunk 0x0010 - captured compressed payload (gzip/inflate)
pub const COMPRESSED_PAYLOAD: u16 = 0x0010;
/// Chunk 0x0011 - correlation ID
pub const CORRELATION_ID: u16 = 0x0011;
/// Chunk 0x0012 - VLAN tag
pub const VLAN: u16 = 0x0012;

/// Payload protocol types carried in the `ProtoType` chunk
pub mod proto {
    /// Session Initiation Protocol
    pub const SIP: u8 = 1;
    /// RTP Control Protocol
    pub const RTCP: u8 = 5;
    /// RTCP Extended Reports
    pub const RTCP_XR: u8 = 35;
    /// DNS queries and answers
    pub const DNS: u8 = 53;
    /// Free-form log lines
    pub const LOG: u8 = 100;
}
