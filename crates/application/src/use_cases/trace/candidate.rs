use dns_by_eye_domain::RootHint;
use std::net::IpAddr;

/// A nameserver the next level will be asked about, with whatever addresses
/// are already known for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub addrs: Vec<IpAddr>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, addrs: Vec<IpAddr>) -> Self {
        Self {
            name: name.into(),
            addrs,
        }
    }

    pub fn from_root_hints(hints: &[RootHint], ipv6: bool) -> Vec<Candidate> {
        hints
            .iter()
            .map(|hint| Candidate::new(hint.name.clone(), hint.addresses(ipv6)))
            .collect()
    }

    /// Addresses worth querying: IPv4 always, IPv6 only when enabled.
    pub fn usable_addrs(&self, ipv6: bool) -> impl Iterator<Item = IpAddr> + '_ {
        self.addrs.iter().copied().filter(move |a| ipv6 || a.is_ipv4())
    }

    pub fn needs_glue(&self, ipv6: bool) -> bool {
        self.usable_addrs(ipv6).next().is_none()
    }
}
