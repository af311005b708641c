//! JSON shapes exposed by the façade. Kept separate from
//! [`dockhound_core::Host`] so the wire format can evolve independently of
//! the internal record type, the same separation `handlesHost.go` draws
//! between `dnsStorage.Host` and its own `httpServer.Host`.

use std::net::Ipv4Addr;

use dockhound_core::Host;
use serde::Serialize;

/// The public view of a single host record.
#[derive(Debug, Clone, Serialize)]
pub struct HostView {
    /// Primary DNS name.
    pub name: String,
    /// IPv4 address.
    pub address: Ipv4Addr,
    /// Additional names that also resolve to `address`.
    pub aliases: Vec<String>,
}

impl From<&Host> for HostView {
    fn from(host: &Host) -> Self {
        Self { name: host.name.clone(), address: host.address, aliases: host.aliases.clone() }
    }
}
