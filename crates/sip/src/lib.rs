//! Minimal SIP message scanner
//!
//! Extracts the handful of fields the capture pipeline needs from a SIP
//! payload: the start line (request method and URI, or response code), the
//! CSeq method and the Call-ID. Everything else in the message is ignored.
//!
//! Parsing is best-effort: [`parse`] always returns a [`SipMsg`], recording
//! hard failures in its `error` field so the caller decides how strict to
//! be. Absent structures stay `None` rather than defaulting, which lets the
//! caller distinguish "not present" from "present but empty".

mod error;
mod parser;

pub use error::SipParseError;
pub use parser::parse;

/// Parsed SIP message, reduced to the fields the pipeline consumes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SipMsg {
    /// Request or response start line, when one was found
    pub start_line: Option<StartLine>,

    /// CSeq header, when one was found
    pub cseq: Option<Cseq>,

    /// Call-ID header value (empty when absent)
    pub call_id: String,

    /// Hard parse failure, when the message was not SIP-shaped at all
    pub error: Option<SipParseError>,
}

/// First line of a SIP message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartLine {
    /// Request method (INVITE, BYE, ...); empty for responses
    pub method: String,

    /// Response status code token ("200", "404", ...); empty for requests
    pub resp: String,

    /// Request URI; absent for responses
    pub uri: Option<Uri>,
}

/// Request URI broken into its addressing parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uri {
    /// The URI as it appeared on the wire
    pub raw: String,

    /// URI scheme ("sip", "sips", "tel")
    pub scheme: String,

    /// User part before the `@`, when present
    pub user: String,

    /// Host (and optional port) part
    pub host: String,
}

/// CSeq header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cseq {
    /// Sequence number
    pub seq: u32,

    /// Method the sequence number applies to
    pub method: String,
}
