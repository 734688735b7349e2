use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;

use super::error_kind::ErrorKind;
use super::glue::GlueRecord;

/// How one queried server address behaved at a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerStatus {
    Answered,
    /// Replied, but neither authoritatively nor with a referral for the zone.
    Lame,
    /// Referred back to a zone already walked through.
    Loop,
    Timeout,
    Refused,
    NameError,
    ServerFailure,
    Malformed,
    /// Still in flight when the walk budget ran out.
    Cancelled,
    /// Never queried: over the per-level candidate cap.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerObservation {
    pub nameserver: String,
    /// `None` when the nameserver's address could not be found.
    pub address: Option<IpAddr>,
    pub status: ServerStatus,
    pub elapsed_ms: u64,
}

/// One visited zone level.
#[derive(Debug, Clone, Serialize)]
pub struct TraceNode {
    pub zone: String,
    /// Authoritative NS hosts, unique, in the order of the first answer used.
    pub nameservers: Vec<String>,
    pub response_time_ms: u64,
    pub error_type: Option<ErrorKind>,
    pub is_slow: bool,
    pub queried_at: DateTime<Utc>,
    /// Per-address results of the parent's servers, in candidate order,
    /// followed by nameservers that were never queried.
    pub servers: Vec<ServerObservation>,
    /// Answers of the zone's own nameservers about the zone. Only filled for
    /// the queried domain when it is a zone cut.
    pub authority: Vec<ServerObservation>,
    /// Glue offered by the parent for this zone's nameservers.
    pub glue: Vec<GlueRecord>,
}

impl TraceNode {
    pub fn is_terminal(&self) -> bool {
        self.error_type.is_some_and(|kind| kind.is_terminal())
    }

    pub fn has_error(&self) -> bool {
        self.error_type.is_some()
    }

    /// False when the zone's own nameservers were asked and none of them
    /// answered authoritatively.
    pub fn authority_confirmed(&self) -> bool {
        self.authority.is_empty()
            || self
                .authority
                .iter()
                .any(|s| s.status == ServerStatus::Answered)
    }

    pub fn answered_servers(&self) -> usize {
        self.servers
            .iter()
            .filter(|s| s.status == ServerStatus::Answered)
            .count()
    }
}
