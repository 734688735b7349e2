use super::forwarding::{DnsResponse, MessageBuilder, ResponseParser};
use super::transport::Transport;
use async_trait::async_trait;
use dns_by_eye_application::ports::{NameserverQuery, QueryMode};
use dns_by_eye_domain::{DomainError, QueryOutcome, RecordType};
use hickory_proto::op::ResponseCode;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Queries nameservers over the wire: UDP first, TCP when the UDP reply is
/// truncated, both within the single timeout given by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpNameserverQuery;

impl UdpNameserverQuery {
    pub fn new() -> Self {
        Self
    }

    async fn exchange(
        &self,
        server: SocketAddr,
        message: &[u8],
        timeout: Duration,
    ) -> Result<DnsResponse, DomainError> {
        let deadline = Instant::now() + timeout;

        let udp = Transport::udp(server).send(message, timeout).await?;
        let response = ResponseParser::parse(&udp.bytes)?;
        if !response.truncated {
            return Ok(response);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(DomainError::TransportTimeout {
                server: server.to_string(),
            });
        }

        debug!(server = %server, "Truncated UDP response, retrying over TCP");
        let tcp = Transport::tcp(server).send(message, remaining).await?;
        ResponseParser::parse(&tcp.bytes)
    }
}

#[async_trait]
impl NameserverQuery for UdpNameserverQuery {
    async fn query(
        &self,
        server: SocketAddr,
        name: &str,
        record_type: RecordType,
        mode: QueryMode,
        timeout: Duration,
    ) -> QueryOutcome {
        let started = Instant::now();

        let (id, message) = match MessageBuilder::build_query_with_id(
            name,
            &record_type,
            mode == QueryMode::Recursive,
        ) {
            Ok(built) => built,
            Err(e) => {
                warn!(name = %name, error = %e, "Could not build query");
                return QueryOutcome::Malformed;
            }
        };

        let response = match self.exchange(server, &message, timeout).await {
            Ok(response) => response,
            Err(e) => {
                debug!(server = %server, name = %name, error = %e, "Query failed");
                return outcome_for_error(&e);
            }
        };

        if response.id != id {
            warn!(server = %server, expected = id, received = response.id, "Response ID mismatch");
            return QueryOutcome::Malformed;
        }

        debug!(
            server = %server,
            name = %name,
            record_type = %record_type,
            rcode = ResponseParser::rcode_to_status(response.rcode),
            "Query answered"
        );

        match response.rcode {
            ResponseCode::NoError => QueryOutcome::Answered {
                records: response.answer,
                elapsed_ms: started.elapsed().as_millis() as u64,
            },
            ResponseCode::NXDomain => QueryOutcome::NameError,
            ResponseCode::ServFail | ResponseCode::NotImp => QueryOutcome::ServerFailure,
            ResponseCode::Refused => QueryOutcome::Refused,
            _ => QueryOutcome::Malformed,
        }
    }
}

fn outcome_for_error(error: &DomainError) -> QueryOutcome {
    match error {
        DomainError::TransportTimeout { .. } => QueryOutcome::Timeout,
        DomainError::TransportConnectionRefused { .. } => QueryOutcome::Refused,
        DomainError::InvalidDnsResponse(_) => QueryOutcome::Malformed,
        _ => QueryOutcome::ServerFailure,
    }
}
