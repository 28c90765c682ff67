//! Upgrade policy checks shared by transports.
//!
//! Only the parts a server must decide from its configuration live here:
//! origin restriction and sub-protocol selection. Validating the handshake
//! itself and computing the accept key belong to the transport.

use http::{HeaderMap, header};

use crate::error::{Error, Result};

/// The request's Origin header, if present and readable.
pub fn request_origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ORIGIN).and_then(|value| value.to_str().ok())
}

/// Sub-protocols requested by the client, in preference order.
///
/// Values from repeated `Sec-WebSocket-Protocol` headers are concatenated.
pub fn requested_protocols(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SEC_WEBSOCKET_PROTOCOL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Validate the Origin header against the configured origin.
///
/// An empty `allowed` accepts any origin, including none. Comparison ignores
/// ASCII case.
///
/// # Errors
///
/// Returns [`Error::OriginNotAllowed`] if `allowed` is set and `origin` is
/// missing or different.
pub fn validate_origin(origin: Option<&str>, allowed: &str) -> Result<()> {
    if allowed.is_empty() {
        return Ok(());
    }

    match origin {
        Some(o) if o.eq_ignore_ascii_case(allowed) => Ok(()),
        Some(o) => Err(Error::OriginNotAllowed {
            origin: o.to_string(),
        }),
        None => Err(Error::OriginNotAllowed {
            origin: "(none)".to_string(),
        }),
    }
}

/// Pick the sub-protocol to answer with.
///
/// The first client-requested protocol found in `supported` wins. When none
/// matches, an empty entry in `supported` lets the upgrade continue without a
/// protocol (`Ok(None)`).
///
/// # Errors
///
/// Returns [`Error::ProtocolNotSupported`] if nothing matches and `supported`
/// has no empty entry.
pub fn negotiate_protocol(requested: &[String], supported: &[String]) -> Result<Option<String>> {
    let selected = requested
        .iter()
        .find(|candidate| supported.iter().any(|s| !s.is_empty() && s == *candidate));

    if let Some(protocol) = selected {
        return Ok(Some(protocol.clone()));
    }

    if supported.is_empty() || supported.iter().any(String::is_empty) {
        return Ok(None);
    }

    let offered = if requested.is_empty() {
        "(none)".to_string()
    } else {
        requested.join(", ")
    };
    Err(Error::ProtocolNotSupported(offered))
}
