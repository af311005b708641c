//! Writes the dnsmasq forwarder file so the host's resolver delegates
//! `*.docker` and the private `172.16.0.0/12` reverse range to us.
//!
//! One-shot and overwrite, exactly like `dnsdock`'s `writeDnsmasqd`: no
//! watching, no cleanup on exit.

use std::net::Ipv4Addr;
use std::path::Path;

use dockhound_common::{DockhoundError, DockhoundResult};

const FORWARDER_PATH: &str = "/etc/dnsmasq.d/dnsdock";

/// The first non-loopback, non-multicast IPv4 address found on a local
/// interface.
pub fn local_address() -> DockhoundResult<Ipv4Addr> {
    let interfaces = if_addrs::get_if_addrs().map_err(DockhoundError::Io)?;
    interfaces
        .into_iter()
        .filter(|iface| !iface.is_loopback())
        .find_map(|iface| match iface.ip() {
            std::net::IpAddr::V4(addr) if !addr.is_multicast() => Some(addr),
            _ => None,
        })
        .ok_or_else(|| DockhoundError::Internal { message: "no local IPv4 address found".to_owned() })
}

/// Render and write the forwarder file at `path`.
///
/// # Errors
///
/// Returns [`DockhoundError::Io`] if the file cannot be written.
pub fn write(address: Ipv4Addr, path: &Path) -> DockhoundResult<()> {
    let mut lines = Vec::with_capacity(17);
    lines.push(format!("server=/docker/{address}"));
    for octet in 16..32 {
        lines.push(format!("server=/{octet}.172.in-addr.arpa/{address}"));
    }
    lines.push(String::new());
    std::fs::write(path, lines.join("\n")).map_err(DockhoundError::Io)
}

/// Discover the local address and write the forwarder file at its default
/// location.
///
/// # Errors
///
/// Returns an error if no local address can be found, or if writing fails.
pub fn write_default() -> DockhoundResult<()> {
    let address = local_address()?;
    tracing::info!(%address, "writing dnsmasq forwarder configuration");
    write(address, Path::new(FORWARDER_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_forward_and_reverse_lines() {
        let dir = std::env::temp_dir().join("dockhound-dnsmasq-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dnsdock");

        write(Ipv4Addr::new(192, 168, 1, 10), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();

        assert!(contents.starts_with("server=/docker/192.168.1.10\n"));
        assert!(contents.contains("server=/16.172.in-addr.arpa/192.168.1.10\n"));
        assert!(contents.contains("server=/31.172.in-addr.arpa/192.168.1.10\n"));
        assert!(!contents.contains("32.172.in-addr.arpa"));

        std::fs::remove_file(&path).unwrap();
    }
}
