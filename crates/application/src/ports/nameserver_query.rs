use async_trait::async_trait;
use dns_by_eye_domain::{QueryOutcome, RecordType};
use std::net::SocketAddr;
use std::time::Duration;

/// Whether the server is asked to recurse on our behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// RD clear: ask an authoritative server what it knows itself.
    Iterative,
    /// RD set: ask a recursive resolver (glue lookups only).
    Recursive,
}

/// Sends exactly one query to one server and reports what happened.
///
/// Implementations never retry and never return an error: every failure is a
/// `QueryOutcome` variant. `timeout` bounds the whole exchange.
#[async_trait]
pub trait NameserverQuery: Send + Sync {
    async fn query(
        &self,
        server: SocketAddr,
        name: &str,
        record_type: RecordType,
        mode: QueryMode,
        timeout: Duration,
    ) -> QueryOutcome;
}
