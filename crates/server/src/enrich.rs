//! SIP enrichment
//!
//! Runs the SIP scanner over SIP-typed payloads and validates the result
//! before it is attached to the packet. Downstream consumers index into
//! the start line unconditionally, so absent structures are replaced with
//! empty ones here, and a response's status code is copied into `method`
//! to unify request method and response class under one field.

use hepflow_protocol::HepPacket;
use hepflow_sip::{SipParseError, Uri};
use thiserror::Error;

/// Payloads this short are never SIP messages worth scanning
pub const MIN_SIP_PAYLOAD: usize = 64;

/// Errors that fail SIP enrichment
///
/// An enrichment failure counts against `err_count` and drops the packet;
/// no other field of the packet is touched on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichError {
    /// The scanner reported a hard parse failure
    #[error("SIP parse failed: {0}")]
    SipParse(#[from] SipParseError),

    /// No usable CSeq method in the message
    #[error("could not find a valid CSeq in packet")]
    NoCSeq,

    /// No usable Call-ID in the message
    #[error("could not find a valid Call-ID in packet")]
    NoCallId,
}

/// Check whether a packet qualifies for SIP enrichment
#[inline]
pub fn wants_enrichment(packet: &HepPacket) -> bool {
    packet.is_sip() && packet.payload.len() > MIN_SIP_PAYLOAD
}

/// Parse the packet's payload as SIP and attach the result
///
/// On success `packet.sip` is populated; on failure the packet is left
/// exactly as it was.
pub fn enrich(packet: &mut HepPacket) -> Result<(), EnrichError> {
    let mut msg = hepflow_sip::parse(&packet.payload);

    // Total field access downstream: install empty structures where the
    // scanner found none, and unify response class with request method.
    let mut start_line = msg.start_line.take().unwrap_or_default();
    if start_line.uri.is_none() {
        start_line.uri = Some(Uri::default());
    }
    if start_line.method.is_empty() {
        start_line.method = start_line.resp.clone();
    }
    msg.start_line = Some(start_line);

    if let Some(err) = msg.error.take() {
        return Err(EnrichError::SipParse(err));
    }
    if !msg.cseq.as_ref().is_some_and(|c| c.method.len() >= 3) {
        return Err(EnrichError::NoCSeq);
    }
    if msg.call_id.len() < 3 {
        return Err(EnrichError::NoCallId);
    }

    packet.sip = Some(msg);
    Ok(())
}

/// Convenience accessor for the unified method of an enriched packet
pub fn sip_method(packet: &HepPacket) -> Option<&str> {
    packet
        .sip
        .as_ref()
        .and_then(|m| m.start_line.as_ref())
        .map(|s| s.method.as_str())
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod enrich_test;
