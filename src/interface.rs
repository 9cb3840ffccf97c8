//! Network interface selection.

use pnet::datalink;

/// Name of the first interface that is up, not a loopback, and has an
/// address. `None` when no such interface exists.
pub fn default_interface() -> Option<String> {
    datalink::interfaces()
        .into_iter()
        .find(|iface| iface.is_up() && !iface.is_loopback() && !iface.ips.is_empty())
        .map(|iface| iface.name)
}

/// Whether an interface with this name exists on the host.
pub fn interface_exists(name: &str) -> bool {
    datalink::interfaces()
        .into_iter()
        .any(|iface| iface.name == name)
}
