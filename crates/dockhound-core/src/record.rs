//! The host record type shared by every reader of the Host Store.

use std::net::Ipv4Addr;

/// Opaque, store-unique identifier for a host record.
///
/// Constructed by the Container Ingestor as `"<containerId>_<networkId>"`;
/// the store itself treats it as an opaque string.
pub type HostId = String;

/// A single container/network attachment: one IPv4 address and the names
/// that resolve to it.
///
/// Host records are immutable once stored — a changed address is modeled as
/// a remove followed by an add with a new id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// Store key, unique within the Host Store.
    pub id: HostId,
    /// The container's address on this network.
    pub address: Ipv4Addr,
    /// Primary domain name, without a trailing dot.
    pub name: String,
    /// Additional names for the same address, in derivation order.
    pub aliases: Vec<String>,
}

/// `Ipv4Addr::is_global` is unstable; this mirrors the stable subset the Go
/// source relied on (`net.IP.IsGlobalUnicast`): not unspecified, not
/// loopback, not link-local, not broadcast, and not in the multicast range.
#[must_use]
pub fn is_global_unicast(addr: Ipv4Addr) -> bool {
    !addr.is_unspecified()
        && !addr.is_loopback()
        && !addr.is_link_local()
        && !addr.is_broadcast()
        && !addr.is_multicast()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_ranges_are_global_unicast() {
        assert!(is_global_unicast(Ipv4Addr::new(10, 0, 0, 5)));
        assert!(is_global_unicast(Ipv4Addr::new(172, 17, 0, 2)));
        assert!(is_global_unicast(Ipv4Addr::new(192, 168, 1, 1)));
    }

    #[test]
    fn special_ranges_are_suppressed() {
        assert!(!is_global_unicast(Ipv4Addr::UNSPECIFIED));
        assert!(!is_global_unicast(Ipv4Addr::LOCALHOST));
        assert!(!is_global_unicast(Ipv4Addr::new(169, 254, 1, 1)));
        assert!(!is_global_unicast(Ipv4Addr::BROADCAST));
        assert!(!is_global_unicast(Ipv4Addr::new(224, 0, 0, 1)));
    }

    #[test]
    fn test_net_ranges_are_global_unicast() {
        // Go's net.IP.IsGlobalUnicast has no TEST-NET exclusion; this must
        // not either, or the façade would suppress addresses the original
        // resolver would have answered for.
        assert!(is_global_unicast(Ipv4Addr::new(192, 0, 2, 1)));
        assert!(is_global_unicast(Ipv4Addr::new(198, 51, 100, 1)));
        assert!(is_global_unicast(Ipv4Addr::new(203, 0, 113, 1)));
    }
}
