//! Pure domain-name derivation for a container/network attachment.
//!
//! Given a container's identity and the network it is attached to, derives
//! the host id used as the Host Store key plus the primary domain name and
//! its aliases. Contains no I/O and is deterministic: equal inputs always
//! produce equal outputs.

/// Input to the naming derivation.
#[derive(Debug, Clone, Copy)]
pub struct NamingInput<'a> {
    /// Docker container id (hex, at least 12 characters).
    pub container_id: &'a str,
    /// Docker container name, as reported by the API (may start with `/`).
    pub container_name: &'a str,
    /// Docker network id/name this attachment belongs to.
    pub network_id: &'a str,
    /// Whether this is the first network processed for this container.
    pub first_network: bool,
}

/// Result of [`derive`]: the store key plus the primary name and aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedName {
    /// Unique key for the Host Store: `<containerId>_<networkId>`.
    pub host_id: String,
    /// Primary domain name (no trailing dot).
    pub primary: String,
    /// Additional names for the same address, in derivation order.
    pub aliases: Vec<String>,
}

/// Derive the host id, primary domain and aliases for one container/network
/// attachment.
///
/// See spec §4.3 for the full algorithm; the two docker-compose naming
/// variants (index-only and index+slug) are evaluated against the token list
/// produced in step 2, not against each other's rewritten state, matching
/// the source this was ported from.
#[must_use]
pub fn derive(input: NamingInput<'_>) -> DerivedName {
    let host_id = format!("{}_{}", input.container_id, input.network_id);

    let trimmed_name = input.container_name.trim_matches(|c| c == '/' || c == '_');
    let raw = format!("{}_{}", input.network_id, trimmed_name);

    let mut accepted: Vec<&str> = Vec::new();
    for token in raw.split('_') {
        if token == "default" || token == "bridge" {
            continue;
        }
        if accepted.last().copied() == Some(token) {
            continue;
        }
        accepted.push(token);
    }

    let mut parts: Vec<String> = accepted.into_iter().rev().map(str::to_owned).collect();
    parts.push("docker".to_owned());

    let mut primary = parts.join(".");
    let mut aliases = Vec::new();

    // Docker-compose variant B: "<project>_<service>_<index>" (no slug).
    if parts.first().is_some_and(|p| p == "1") {
        aliases.push(primary.clone());
        primary = parts[1..].join(".");
    }

    // Docker-compose variant A: "<project>_<service>_<index>_<slug>".
    // The condition is evaluated against `parts` as built above, not the
    // possibly-rewritten `primary`; only the alias values use the current
    // `primary`.
    if parts.get(1).is_some_and(|p| p == "1") && parts.first().is_some_and(|p| is_hex_slug(p)) {
        aliases.push(primary.clone());
        aliases.push(parts[1..].join("."));
        primary = parts[2..].join(".");
    }

    if input.first_network {
        let prefix = &input.container_id[..input.container_id.len().min(12)];
        aliases.push(format!("{prefix}.docker"));
    }

    DerivedName {
        host_id,
        primary,
        aliases,
    }
}

/// Matches the source's `^[0-9a-f]{2,}$`: two or more lowercase hex digits.
fn is_hex_slug(s: &str) -> bool {
    s.len() >= 2 && s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
