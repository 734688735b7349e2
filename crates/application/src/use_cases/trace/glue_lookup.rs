use crate::ports::{NameserverQuery, QueryMode};
use dns_by_eye_domain::{QueryOutcome, RecordType, ServerStatus};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Resolves nameserver host names through recursive resolvers.
///
/// Resolvers are tried in order until one returns addresses; a NXDOMAIN stops
/// the search since another resolver would say the same.
pub struct GlueLookup {
    query: Arc<dyn NameserverQuery>,
    resolvers: Vec<SocketAddr>,
    timeout: Duration,
    ipv6: bool,
}

impl GlueLookup {
    pub fn new(
        query: Arc<dyn NameserverQuery>,
        resolvers: Vec<SocketAddr>,
        timeout: Duration,
        ipv6: bool,
    ) -> Self {
        Self {
            query,
            resolvers,
            timeout,
            ipv6,
        }
    }

    /// Addresses for `host`, or the status explaining why there are none.
    ///
    /// A host that exists but has no address, or does not exist at all, makes
    /// the delegation pointing at it lame.
    pub async fn resolve(&self, host: &str, deadline: Instant) -> Result<Vec<IpAddr>, ServerStatus> {
        let mut last_failure = ServerStatus::Timeout;

        for resolver in &self.resolvers {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ServerStatus::Cancelled);
            }
            let timeout = self.timeout.min(remaining);

            let v4 = self
                .query
                .query(*resolver, host, RecordType::A, QueryMode::Recursive, timeout);
            let outcomes = if self.ipv6 {
                let v6 = self
                    .query
                    .query(*resolver, host, RecordType::AAAA, QueryMode::Recursive, timeout);
                let (a, aaaa) = futures::join!(v4, v6);
                vec![a, aaaa]
            } else {
                vec![v4.await]
            };

            let mut addrs: Vec<IpAddr> = Vec::new();
            let mut status = ServerStatus::Lame;
            for outcome in outcomes {
                match outcome {
                    QueryOutcome::Answered { records, .. } => {
                        for address in records.addresses {
                            if !addrs.contains(&address.addr) {
                                addrs.push(address.addr);
                            }
                        }
                    }
                    QueryOutcome::NameError => status = ServerStatus::NameError,
                    other if status != ServerStatus::NameError => status = failure_status(&other),
                    _ => {}
                }
            }

            if !addrs.is_empty() {
                debug!(host = %host, resolver = %resolver, addresses = addrs.len(), "Glue resolved");
                return Ok(addrs);
            }

            debug!(host = %host, resolver = %resolver, status = ?status, "Glue lookup failed");
            match status {
                // No such host, or a host without addresses: the answer is final.
                ServerStatus::NameError | ServerStatus::Lame => return Err(ServerStatus::Lame),
                other => last_failure = other,
            }
        }

        Err(last_failure)
    }
}

/// Status recorded for a query that did not produce an answer.
pub(super) fn failure_status(outcome: &QueryOutcome) -> ServerStatus {
    match outcome {
        QueryOutcome::Answered { .. } => ServerStatus::Answered,
        QueryOutcome::Timeout => ServerStatus::Timeout,
        QueryOutcome::Refused => ServerStatus::Refused,
        QueryOutcome::NameError => ServerStatus::NameError,
        QueryOutcome::ServerFailure => ServerStatus::ServerFailure,
        QueryOutcome::Malformed => ServerStatus::Malformed,
    }
}
