//! BPF filter expressions for the two capture modes.
//!
//! A button broadcasts from an unset source IP when pressed: older hardware
//! sends an ARP probe, newer hardware a DHCPREQUEST.

/// Filter matching ARP probes only.
pub fn arp_probe_filter() -> &'static str {
    "arp src host 0.0.0.0"
}

/// Filter matching everything a pressed button broadcasts.
///
/// The `udp[247:4]` comparison matches the tail of the BOOTP magic cookie
/// (0x63) followed by option 53, length 1, value 3 (DHCPREQUEST) at the
/// fixed offset buttons place it.
pub fn press_filter() -> &'static str {
    "(arp or (udp and src port 68 and dst port 67 and udp[247:4] == 0x63350103)) and src host 0.0.0.0"
}
