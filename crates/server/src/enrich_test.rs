//! Tests for SIP enrichment

use hepflow_protocol::{chunk, HepPacket};

use crate::enrich::{enrich, sip_method, wants_enrichment, EnrichError, MIN_SIP_PAYLOAD};

const INVITE: &str = "INVITE sip:bob@biloxi.example.com SIP/2.0\r\n\
Via: SIP/2.0/UDP pc33.atlanta.example.com;branch=z9hG4bK776asdhds\r\n\
Call-ID: a84b4c76e66710@pc33.atlanta.example.com\r\n\
CSeq: 314159 INVITE\r\n\
\r\n";

const RESPONSE: &str = "SIP/2.0 486 Busy Here\r\n\
Via: SIP/2.0/UDP pc33.atlanta.example.com;branch=z9hG4bK776asdhds\r\n\
Call-ID: a84b4c76e66710@pc33.atlanta.example.com\r\n\
CSeq: 314159 INVITE\r\n\
\r\n";

fn sip_packet(payload: &str) -> HepPacket {
    HepPacket {
        proto_type: chunk::proto::SIP,
        payload: payload.into(),
        ..Default::default()
    }
}

#[test]
fn test_wants_enrichment_gate() {
    assert!(wants_enrichment(&sip_packet(INVITE)));

    // Short SIP-typed payloads are not scanned
    let short = sip_packet("OPTIONS ping");
    assert!(short.payload.len() <= MIN_SIP_PAYLOAD);
    assert!(!wants_enrichment(&short));

    // Non-SIP payloads are never scanned, whatever their length
    let log = HepPacket {
        proto_type: chunk::proto::LOG,
        payload: INVITE.into(),
        ..Default::default()
    };
    assert!(!wants_enrichment(&log));
}

#[test]
fn test_enrich_invite() {
    let mut packet = sip_packet(INVITE);
    enrich(&mut packet).unwrap();

    assert_eq!(sip_method(&packet), Some("INVITE"));

    let sip = packet.sip.unwrap();
    let start = sip.start_line.unwrap();
    assert_eq!(start.uri.unwrap().host, "biloxi.example.com");
    assert_eq!(sip.call_id, "a84b4c76e66710@pc33.atlanta.example.com");
}

#[test]
fn test_enrich_response_unifies_method() {
    let mut packet = sip_packet(RESPONSE);
    enrich(&mut packet).unwrap();

    // Responses have no method; the status code fills the field
    assert_eq!(sip_method(&packet), Some("486"));

    // And the URI is installed empty rather than left absent
    let start = packet.sip.unwrap().start_line.unwrap();
    assert_eq!(start.uri.unwrap().raw, "");
}

#[test]
fn test_enrich_rejects_garbage() {
    let payload = "x".repeat(100);
    let mut packet = sip_packet(&payload);
    assert!(matches!(
        enrich(&mut packet),
        Err(EnrichError::SipParse(_))
    ));
    assert!(packet.sip.is_none());
}

#[test]
fn test_enrich_requires_cseq() {
    let no_cseq = "INVITE sip:bob@biloxi.example.com SIP/2.0\r\n\
Call-ID: a84b4c76e66710@pc33.atlanta.example.com\r\n\
\r\n";
    let mut packet = sip_packet(no_cseq);
    assert_eq!(enrich(&mut packet), Err(EnrichError::NoCSeq));
}

#[test]
fn test_enrich_requires_call_id() {
    let no_call_id = "INVITE sip:bob@biloxi.example.com SIP/2.0\r\n\
Via: SIP/2.0/UDP pc33.atlanta.example.com;branch=z9hG4bK776asdhds\r\n\
CSeq: 314159 INVITE\r\n\
\r\n";
    let mut packet = sip_packet(no_call_id);
    assert_eq!(enrich(&mut packet), Err(EnrichError::NoCallId));
}

#[test]
fn test_enrich_failure_leaves_packet_untouched() {
    let payload = "y".repeat(80);
    let mut packet = sip_packet(&payload);
    packet.node_id = 9;
    let before = packet.clone();

    assert!(enrich(&mut packet).is_err());
    assert_eq!(packet, before);
}
