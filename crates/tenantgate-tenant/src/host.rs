//! Subdomain extraction from request hosts.

use tenantgate_core::error::{GateError, GateResult};

/// Return the tenant label of a `Host` value.
///
/// A trailing `:port` is ignored. The tenant label is the first label in
/// front of a parent domain: `acme.example.com` and `acme.localhost` yield
/// `acme`. Hosts without such a label (`example.com`, `.example.com`,
/// `localhost`, bare IPv4 addresses) are [`GateError::Malformed`]. The
/// label is returned as given; lookups lower-case it.
pub fn subdomain_of(host: &str) -> GateResult<&str> {
    let trimmed = host.trim();
    let name = match trimmed.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => trimmed,
    };
    let malformed = || GateError::Malformed {
        host: host.to_string(),
    };

    let labels: Vec<&str> = name.split('.').collect();
    let first = labels[0];
    if first.is_empty() || labels.len() < 2 {
        return Err(malformed());
    }
    if labels
        .iter()
        .all(|l| !l.is_empty() && l.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(malformed());
    }

    // `acme.localhost` is the only two-label form with a subdomain.
    let parent_labels = labels.len() - 1;
    let parent_is_localhost = parent_labels == 1 && labels[1].eq_ignore_ascii_case("localhost");
    if parent_labels < 2 && !parent_is_localhost {
        return Err(malformed());
    }

    Ok(first)
}
