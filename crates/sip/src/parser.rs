//! Best-effort SIP message scanning

use crate::{Cseq, SipMsg, SipParseError, StartLine, Uri};

/// SIP protocol version token opening every status line
const SIP_VERSION: &str = "SIP/";

/// Scan a SIP payload for the fields the pipeline consumes
///
/// Lines are split on LF with optional CR, which accepts both strict CRLF
/// messages and the bare-LF output of lenient capture agents. Scanning
/// stops at the blank line separating headers from the body.
pub fn parse(input: &str) -> SipMsg {
    let mut msg = SipMsg::default();

    let mut lines = input.lines();

    // Skip leading blank lines (keep-alive CRLFs are common on the wire)
    let start = lines.by_ref().find(|l| !l.trim().is_empty());

    let Some(start) = start else {
        msg.error = Some(SipParseError::Empty);
        return msg;
    };

    match parse_start_line(start) {
        Ok(line) => msg.start_line = Some(line),
        Err(e) => msg.error = Some(e),
    }

    for line in lines {
        if line.trim().is_empty() {
            // End of headers; the body is not scanned
            break;
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        // Header names are case-insensitive; Call-ID has the compact form "i"
        if name.eq_ignore_ascii_case("call-id") || name.eq_ignore_ascii_case("i") {
            msg.call_id = value.to_owned();
        } else if name.eq_ignore_ascii_case("cseq") {
            msg.cseq = Some(parse_cseq(value));
        }
    }

    msg
}

/// Parse the first line as either a request line or a status line
fn parse_start_line(line: &str) -> Result<StartLine, SipParseError> {
    if let Some(rest) = line.strip_prefix(SIP_VERSION) {
        // Status line: "SIP/2.0 200 OK"
        let mut parts = rest.splitn(3, ' ');
        let _version = parts.next();
        let code = parts.next().unwrap_or_default().trim();
        if code.is_empty() {
            return Err(SipParseError::StartLine(line.to_owned()));
        }
        return Ok(StartLine {
            method: String::new(),
            resp: code.to_owned(),
            uri: None,
        });
    }

    // Request line: "INVITE sip:bob@example.com SIP/2.0"
    let mut parts = line.splitn(3, ' ');
    let method = parts.next().unwrap_or_default();
    let uri = parts.next().unwrap_or_default();
    let version = parts.next().unwrap_or_default();

    if method.is_empty() || uri.is_empty() || !version.starts_with(SIP_VERSION) {
        return Err(SipParseError::StartLine(line.to_owned()));
    }

    Ok(StartLine {
        method: method.to_owned(),
        resp: String::new(),
        uri: Some(parse_uri(uri)),
    })
}

/// Break a request URI into scheme, user and host parts
fn parse_uri(raw: &str) -> Uri {
    let mut uri = Uri {
        raw: raw.to_owned(),
        ..Default::default()
    };

    let rest = match raw.split_once(':') {
        Some((scheme, rest)) => {
            uri.scheme = scheme.to_ascii_lowercase();
            rest
        }
        None => raw,
    };

    // Drop URI parameters and headers before splitting the address
    let addr = match rest.find([';', '?']) {
        Some(idx) => &rest[..idx],
        None => rest,
    };

    match addr.split_once('@') {
        Some((user, host)) => {
            uri.user = user.to_owned();
            uri.host = host.to_owned();
        }
        None => uri.host = addr.to_owned(),
    }

    uri
}

/// Parse a CSeq header value: "314159 INVITE"
fn parse_cseq(value: &str) -> Cseq {
    let mut parts = value.split_ascii_whitespace();
    let seq = parts
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    let method = parts.next().unwrap_or_default().to_owned();
    Cseq { seq, method }
}
