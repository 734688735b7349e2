//! Zone name arithmetic.
//!
//! Zone names are lowercase and carry no trailing dot; the root zone is `.`.

pub const ROOT_ZONE: &str = ".";

/// Lowercases a DNS name and strips its trailing dot. The empty name and `.`
/// both become the root zone.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.is_empty() {
        ROOT_ZONE.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Zones from the root down to `domain`, one label at a time.
///
/// `tools.apathy.ca` gives `[".", "ca", "apathy.ca", "tools.apathy.ca"]`.
pub fn zone_chain(domain: &str) -> Vec<String> {
    let domain = normalize_name(domain);
    let mut chain = vec![ROOT_ZONE.to_string()];
    if domain == ROOT_ZONE {
        return chain;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    for start in (0..labels.len()).rev() {
        chain.push(labels[start..].join("."));
    }
    chain
}

/// Number of labels in a zone name; the root has none.
pub fn label_count(zone: &str) -> usize {
    if zone == ROOT_ZONE {
        0
    } else {
        zone.split('.').count()
    }
}

/// True when `name` is `zone` itself or lies below it.
pub fn is_in_zone(name: &str, zone: &str) -> bool {
    if zone == ROOT_ZONE {
        return true;
    }
    name == zone
        || name
            .strip_suffix(zone)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Name to put on the wire for a zone (fully qualified).
pub fn to_fqdn(zone: &str) -> String {
    if zone == ROOT_ZONE {
        ROOT_ZONE.to_string()
    } else {
        format!("{}.", zone)
    }
}
