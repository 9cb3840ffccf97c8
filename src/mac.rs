//! Hardware address parsing and formatting.

use macaddr::MacAddr6;

use crate::error::{Error, Result};

/// Format raw hardware address bytes as lowercase colon-separated hex.
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Parse a hardware address string.
///
/// Accepts the usual forms in either case: `aa:bb:cc:dd:ee:ff`,
/// `AA-BB-CC-DD-EE-FF`, `aabb.ccdd.eeff`.
pub fn parse_mac(addr: &str) -> Result<MacAddr6> {
    addr.parse::<MacAddr6>().map_err(|source| Error::InvalidMac {
        addr: addr.to_string(),
        source,
    })
}
