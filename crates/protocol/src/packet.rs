//! Decoded HEP packet model

use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Utc};
use hepflow_sip::SipMsg;

/// One decoded HEP capture observation
///
/// Constructed by [`crate::decode`], optionally enriched with a parsed SIP
/// message by the ingest pipeline, then shared read-only across sinks
/// (wrapped in `Arc` for fan-out).
#[derive(Debug, Clone, PartialEq)]
pub struct HepPacket {
    /// IP protocol family (0x02 = IPv4, 0x0a = IPv6)
    pub version: u8,

    /// L4 protocol ID (0x06 = TCP, 0x11 = UDP)
    pub protocol: u8,

    /// Capture source address
    pub src_ip: IpAddr,

    /// Capture destination address
    pub dst_ip: IpAddr,

    /// Cached textual form of `src_ip`
    pub src_ip_str: String,

    /// Cached textual form of `dst_ip`
    pub dst_ip_str: String,

    /// Capture source port
    pub src_port: u16,

    /// Capture destination port
    pub dst_port: u16,

    /// Capture time, seconds since the Unix epoch
    pub tsec: u32,

    /// Microseconds offset within `tsec`
    pub tmsec: u32,

    /// Wall-clock instant derived from `(tsec, tmsec)`
    pub timestamp: DateTime<Utc>,

    /// Payload protocol type (see [`crate::chunk::proto`])
    pub proto_type: u8,

    /// Capture agent identifier
    pub node_id: u32,

    /// Keep alive timer
    pub keep_alive_timer: u16,

    /// Authentication key declared by the capture agent
    pub node_pw: String,

    /// Captured application payload as sanitised text
    pub payload: String,

    /// Captured compressed payload (gzip/inflate, not decompressed here)
    pub compressed_payload: Vec<u8>,

    /// Optional cross-flow correlation ID
    pub correlation_id: String,

    /// VLAN tag
    pub vlan: u16,

    /// Parsed SIP message, present only when the payload is SIP-typed and
    /// enrichment succeeded
    pub sip: Option<SipMsg>,
}

impl Default for HepPacket {
    fn default() -> Self {
        Self {
            version: 0,
            protocol: 0,
            src_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            dst_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            src_ip_str: String::new(),
            dst_ip_str: String::new(),
            src_port: 0,
            dst_port: 0,
            tsec: 0,
            tmsec: 0,
            timestamp: DateTime::<Utc>::default(),
            proto_type: 0,
            node_id: 0,
            keep_alive_timer: 0,
            node_pw: String::new(),
            payload: String::new(),
            compressed_payload: Vec::new(),
            correlation_id: String::new(),
            vlan: 0,
            sip: None,
        }
    }
}

impl HepPacket {
    /// Check whether the payload is SIP-typed
    #[inline]
    pub fn is_sip(&self) -> bool {
        self.proto_type == crate::chunk::proto::SIP
    }

    /// Set the capture time fields and the derived wall-clock instant
    pub fn set_capture_time(&mut self, tsec: u32, tmsec: u32) {
        self.tsec = tsec;
        self.tmsec = tmsec;
        self.timestamp = timestamp_from(tsec, tmsec);
    }
}

/// Project `(tsec, tmsec)` onto a wall-clock instant
///
/// This is the unique monotonic mapping of the two capture-time chunks.
pub fn timestamp_from(tsec: u32, tmsec: u32) -> DateTime<Utc> {
    let micros = i64::from(tsec) * 1_000_000 + i64::from(tmsec);
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}
