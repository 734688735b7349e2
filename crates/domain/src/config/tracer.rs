use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// A root server the walk starts from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RootHint {
    pub name: String,
    pub ipv4: IpAddr,
    #[serde(default)]
    pub ipv6: Option<IpAddr>,
}

impl RootHint {
    fn new(name: &str, ipv4: &str, ipv6: &str) -> Self {
        // Literals below are checked by `test_default_root_hints_parse`.
        Self {
            name: name.to_string(),
            ipv4: ipv4.parse().unwrap_or(IpAddr::from([0, 0, 0, 0])),
            ipv6: ipv6.parse().ok(),
        }
    }

    /// Addresses to query, IPv4 first.
    pub fn addresses(&self, ipv6: bool) -> Vec<IpAddr> {
        let mut addrs = vec![self.ipv4];
        if ipv6 {
            addrs.extend(self.ipv6);
        }
        addrs
    }
}

/// Budgets and starting points for one delegation walk.
///
/// Read once at startup and handed to the walker by value; nothing mutates it
/// while a trace is running.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TracerConfig {
    /// Upper bound for a single query to a single server.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Upper bound for the whole walk, root to leaf.
    #[serde(default = "default_lifetime_ms")]
    pub lifetime_ms: u64,

    /// Levels answering slower than this are flagged `is_slow`.
    #[serde(default = "default_slow_threshold_ms")]
    pub slow_threshold_ms: u64,

    /// Upper bound for one glue (A/AAAA) sub-query.
    #[serde(default = "default_glue_timeout_ms")]
    pub glue_timeout_ms: u64,

    #[serde(default)]
    pub ipv6: bool,

    /// Maximum number of server addresses queried concurrently per level.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Recursive resolvers used to find addresses of nameservers that came
    /// without glue.
    #[serde(default = "default_glue_resolvers")]
    pub glue_resolvers: Vec<String>,

    #[serde(default = "default_root_hints")]
    pub root_hints: Vec<RootHint>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
            lifetime_ms: default_lifetime_ms(),
            slow_threshold_ms: default_slow_threshold_ms(),
            glue_timeout_ms: default_glue_timeout_ms(),
            ipv6: false,
            max_candidates: default_max_candidates(),
            glue_resolvers: default_glue_resolvers(),
            root_hints: default_root_hints(),
        }
    }
}

impl TracerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    pub fn glue_timeout(&self) -> Duration {
        Duration::from_millis(self.glue_timeout_ms)
    }

    /// Glue resolver addresses; entries without a port get port 53.
    pub fn glue_resolver_addrs(&self) -> Result<Vec<SocketAddr>, String> {
        self.glue_resolvers
            .iter()
            .map(|server| parse_server_addr(server))
            .collect()
    }
}

/// Parses `1.1.1.1`, `1.1.1.1:53`, `2606:4700::1111` or `[2606:4700::1111]:53`.
pub fn parse_server_addr(server: &str) -> Result<SocketAddr, String> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    server
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, 53))
        .map_err(|_| format!("invalid server address '{}'", server))
}

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_lifetime_ms() -> u64 {
    15_000
}

fn default_slow_threshold_ms() -> u64 {
    2000
}

fn default_glue_timeout_ms() -> u64 {
    2000
}

fn default_max_candidates() -> usize {
    16
}

fn default_glue_resolvers() -> Vec<String> {
    vec!["1.1.1.1:53".to_string(), "8.8.8.8:53".to_string()]
}

fn default_root_hints() -> Vec<RootHint> {
    vec![
        RootHint::new("a.root-servers.net", "198.41.0.4", "2001:503:ba3e::2:30"),
        RootHint::new("b.root-servers.net", "170.247.170.2", "2801:1b8:10::b"),
        RootHint::new("c.root-servers.net", "192.33.4.12", "2001:500:2::c"),
        RootHint::new("d.root-servers.net", "199.7.91.13", "2001:500:2d::d"),
        RootHint::new("e.root-servers.net", "192.203.230.10", "2001:500:a8::e"),
        RootHint::new("f.root-servers.net", "192.5.5.241", "2001:500:2f::f"),
        RootHint::new("g.root-servers.net", "192.112.36.4", "2001:500:12::d0d"),
        RootHint::new("h.root-servers.net", "198.97.190.53", "2001:500:1::53"),
        RootHint::new("i.root-servers.net", "192.36.148.17", "2001:7fe::53"),
        RootHint::new("j.root-servers.net", "192.58.128.30", "2001:503:c27::2:30"),
        RootHint::new("k.root-servers.net", "193.0.14.129", "2001:7fd::1"),
        RootHint::new("l.root-servers.net", "199.7.83.42", "2001:500:9f::42"),
        RootHint::new("m.root-servers.net", "202.12.27.33", "2001:dc3::35"),
    ]
}
