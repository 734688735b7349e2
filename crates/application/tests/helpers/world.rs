use super::mock_nameservers::MockNameservers;
use dns_by_eye_domain::{
    DnsAnswer, HostAddress, NsRecord, QueryOutcome, RecordType, RootHint, TracerConfig,
};

pub const ROOT_ADDR: &str = "10.0.0.1";
pub const GLUE_RESOLVER: &str = "10.9.9.9";

/// Tracer settings pointing at the scripted world: one root server, one glue
/// resolver, short budgets.
pub fn tracer_config() -> TracerConfig {
    TracerConfig {
        query_timeout_ms: 200,
        lifetime_ms: 3_000,
        slow_threshold_ms: 150,
        glue_timeout_ms: 200,
        ipv6: false,
        max_candidates: 16,
        glue_resolvers: vec![GLUE_RESOLVER.to_string()],
        root_hints: vec![RootHint {
            name: "a.root.test".to_string(),
            ipv4: ROOT_ADDR.parse().unwrap(),
            ipv6: None,
        }],
    }
}

fn ns_records(zone: &str, servers: &[(&str, &str)]) -> Vec<NsRecord> {
    servers
        .iter()
        .map(|(host, _)| NsRecord {
            zone: zone.to_string(),
            host: host.to_string(),
        })
        .collect()
}

fn glue(servers: &[(&str, &str)]) -> Vec<HostAddress> {
    servers
        .iter()
        .map(|(host, addr)| HostAddress {
            host: host.to_string(),
            addr: addr.parse().unwrap(),
        })
        .collect()
}

fn answered(records: DnsAnswer) -> QueryOutcome {
    QueryOutcome::Answered {
        records,
        elapsed_ms: 10,
    }
}

/// Non-authoritative referral to `zone` with glue for every server.
pub fn referral(zone: &str, servers: &[(&str, &str)]) -> QueryOutcome {
    answered(DnsAnswer {
        authority_ns: ns_records(zone, servers),
        glue: glue(servers),
        ..Default::default()
    })
}

pub fn referral_without_glue(zone: &str, servers: &[(&str, &str)]) -> QueryOutcome {
    answered(DnsAnswer {
        authority_ns: ns_records(zone, servers),
        ..Default::default()
    })
}

/// Authoritative NS answer for the zone's apex.
pub fn authoritative_ns(zone: &str, servers: &[(&str, &str)]) -> QueryOutcome {
    answered(DnsAnswer {
        authoritative: true,
        answer_ns: ns_records(zone, servers),
        glue: glue(servers),
        ..Default::default()
    })
}

/// Authoritative NODATA: the name exists but is not a zone cut.
pub fn no_cut() -> QueryOutcome {
    answered(DnsAnswer {
        authoritative: true,
        authority_soa: true,
        ..Default::default()
    })
}

pub fn address(host: &str, addr: &str) -> QueryOutcome {
    answered(DnsAnswer {
        addresses: glue(&[(host, addr)]),
        ..Default::default()
    })
}

/// A healthy hierarchy: `.` -> `ca` -> `apathy.ca`, each zone with two
/// nameservers and full glue.
pub struct World {
    pub servers: MockNameservers,
}

impl World {
    pub const CA: [(&'static str, &'static str); 2] =
        [("ns1.ca-servers.test", "10.0.1.1"), ("ns2.ca-servers.test", "10.0.1.2")];
    pub const APATHY: [(&'static str, &'static str); 2] =
        [("ns1.apathy.ca", "10.0.2.1"), ("ns2.apathy.ca", "10.0.2.2")];

    pub fn healthy() -> Self {
        let servers = MockNameservers::new();
        servers.reply(
            ROOT_ADDR,
            ".",
            RecordType::NS,
            authoritative_ns(".", &[("a.root.test", ROOT_ADDR)]),
        );
        servers.reply(ROOT_ADDR, "ca", RecordType::NS, referral("ca", &Self::CA));
        for (_, addr) in Self::CA {
            servers.reply(addr, "apathy.ca", RecordType::NS, referral("apathy.ca", &Self::APATHY));
        }
        for (_, addr) in Self::APATHY {
            servers.reply(
                addr,
                "apathy.ca",
                RecordType::NS,
                authoritative_ns("apathy.ca", &Self::APATHY),
            );
            servers.reply(addr, "tools.apathy.ca", RecordType::NS, no_cut());
        }
        Self { servers }
    }

    pub fn resolvable(&self, host: &str, addr: &str) {
        self.servers
            .reply(GLUE_RESOLVER, host, RecordType::A, address(host, addr));
    }
}
