//! Client IP normalization and whitelist matching
//!
//! Every IP that is stored in a whitelist or compared against one passes
//! through [`normalize_ip`] first, so membership is a plain string comparison.
//! IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) collapse to their IPv4 form.

use std::net::{IpAddr, SocketAddr};

/// Canonical textual form of an IP address, or `None` if `raw` is not one
///
/// Accepts bare addresses, bracketed IPv6 (`[::1]`) and `address:port` pairs.
pub fn normalize_ip(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    let ip = raw
        .parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
        .or_else(|| {
            raw.strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .and_then(|inner| inner.parse::<IpAddr>().ok())
        })?;

    Some(canonical(ip).to_string())
}

/// Collapse IPv4-mapped IPv6 into IPv4
pub fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

/// First hop of an `X-Forwarded-For` value
pub fn first_forwarded_hop(header: &str) -> Option<&str> {
    header
        .split(',')
        .next()
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
}

/// Resolve the caller's IP
///
/// The forwarded-for first hop wins when trusted and parseable; otherwise the
/// transport peer address is used.
pub fn resolve_client_ip(
    forwarded_for: Option<&str>,
    peer: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> Option<String> {
    let forwarded = if trust_forwarded_for {
        forwarded_for
            .and_then(first_forwarded_hop)
            .and_then(normalize_ip)
    } else {
        None
    };

    forwarded.or_else(|| peer.map(|ip| canonical(ip).to_string()))
}

/// Exact membership on normalized forms; an empty whitelist admits nobody
pub fn is_whitelisted(whitelist: &[String], normalized_ip: &str) -> bool {
    whitelist.iter().any(|entry| entry == normalized_ip)
}
