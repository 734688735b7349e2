#![allow(dead_code)]
use chrono::Utc;
use dns_by_eye_domain::{ErrorKind, GlueRecord, ServerObservation, ServerStatus, TraceNode};

pub struct TraceNodeBuilder {
    zone: String,
    nameservers: Vec<String>,
    response_time_ms: u64,
    error_type: Option<ErrorKind>,
    is_slow: bool,
    servers: Vec<ServerObservation>,
    authority: Vec<ServerObservation>,
    glue: Vec<GlueRecord>,
}

impl TraceNodeBuilder {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: zone.to_string(),
            nameservers: vec![],
            response_time_ms: 15,
            error_type: None,
            is_slow: false,
            servers: vec![],
            authority: vec![],
            glue: vec![],
        }
    }

    pub fn nameservers(mut self, nameservers: &[&str]) -> Self {
        self.nameservers = nameservers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn response_time_ms(mut self, ms: u64) -> Self {
        self.response_time_ms = ms;
        self
    }

    pub fn error(mut self, kind: ErrorKind) -> Self {
        self.error_type = Some(kind);
        self
    }

    pub fn slow(mut self) -> Self {
        self.is_slow = true;
        self
    }

    pub fn server(mut self, nameserver: &str, address: &str, status: ServerStatus) -> Self {
        let observation = self.observation(nameserver, address, status);
        self.servers.push(observation);
        self
    }

    /// Answer of one of the zone's own nameservers.
    pub fn authority(mut self, nameserver: &str, address: &str, status: ServerStatus) -> Self {
        let observation = self.observation(nameserver, address, status);
        self.authority.push(observation);
        self
    }

    fn observation(&self, nameserver: &str, address: &str, status: ServerStatus) -> ServerObservation {
        ServerObservation {
            nameserver: nameserver.to_string(),
            address: Some(address.parse().unwrap()),
            status,
            elapsed_ms: self.response_time_ms,
        }
    }

    pub fn glue(mut self, glue: Vec<GlueRecord>) -> Self {
        self.glue = glue;
        self
    }

    pub fn build(self) -> TraceNode {
        TraceNode {
            zone: self.zone,
            nameservers: self.nameservers,
            response_time_ms: self.response_time_ms,
            error_type: self.error_type,
            is_slow: self.is_slow,
            queried_at: Utc::now(),
            servers: self.servers,
            authority: self.authority,
            glue: self.glue,
        }
    }
}
