use serde::Serialize;
use std::net::IpAddr;

/// An NS record: `zone` is delegated to (or served by) `host`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NsRecord {
    pub zone: String,
    pub host: String,
}

/// An address record, from the answer or additional section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostAddress {
    pub host: String,
    pub addr: IpAddr,
}

/// The parts of a NOERROR response the tracer looks at. Names are normalized
/// (lowercase, no trailing dot, root as `.`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsAnswer {
    /// AA bit.
    pub authoritative: bool,
    pub answer_ns: Vec<NsRecord>,
    pub authority_ns: Vec<NsRecord>,
    /// SOA present in the authority section (negative answer marker).
    pub authority_soa: bool,
    pub addresses: Vec<HostAddress>,
    pub glue: Vec<HostAddress>,
}

impl DnsAnswer {
    /// NS hosts for `zone`, answer section first, in record order, deduplicated.
    pub fn ns_hosts_for(&self, zone: &str) -> Vec<String> {
        let mut hosts: Vec<String> = Vec::new();
        for record in self.answer_ns.iter().chain(self.authority_ns.iter()) {
            if record.zone == zone && !hosts.contains(&record.host) {
                hosts.push(record.host.clone());
            }
        }
        hosts
    }

    /// Owner of the first authority-section NS record, if any.
    pub fn referral_zone(&self) -> Option<&str> {
        self.authority_ns.first().map(|r| r.zone.as_str())
    }

    /// Glue addresses offered for `host`.
    pub fn glue_for(&self, host: &str) -> Vec<IpAddr> {
        self.glue
            .iter()
            .filter(|g| g.host == host)
            .map(|g| g.addr)
            .collect()
    }
}

/// Result of exactly one query to one server. Every failure mode is a variant;
/// nothing about a single query is reported through `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answered { records: DnsAnswer, elapsed_ms: u64 },
    Timeout,
    Refused,
    /// NXDOMAIN
    NameError,
    ServerFailure,
    Malformed,
}

impl QueryOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, QueryOutcome::Answered { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueryOutcome::Answered { .. } => "ANSWERED",
            QueryOutcome::Timeout => "TIMEOUT",
            QueryOutcome::Refused => "REFUSED",
            QueryOutcome::NameError => "NXDOMAIN",
            QueryOutcome::ServerFailure => "SERVFAIL",
            QueryOutcome::Malformed => "MALFORMED",
        }
    }
}
