//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). Datagrams whose ID differs from the
//! query's are dropped and the read continues until the timeout. If the
//! response has the TC (truncated) bit set, the caller retries over TCP.

use super::{io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dns_by_eye_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Largest datagram accepted
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| io_error(self.server_addr, "bind UDP socket for", e))?;

        // Connected so that only the queried server's datagrams are read and
        // ICMP port-unreachable surfaces as a refusal.
        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| io_error(self.server_addr, "connect UDP socket to", e))?;

        let bytes_sent = socket
            .send(message_bytes)
            .await
            .map_err(|e| io_error(self.server_addr, "send UDP query to", e))?;

        debug!(server = %self.server_addr, bytes_sent = bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let bytes_received = socket
                .recv(&mut recv_buf)
                .await
                .map_err(|e| io_error(self.server_addr, "receive UDP response from", e))?;

            // Late replies to an earlier query on a reused port carry another ID.
            if recv_buf[..bytes_received].get(..2) != message_bytes.get(..2) {
                debug!(server = %self.server_addr, bytes_received, "Discarding UDP datagram with unexpected ID");
                continue;
            }

            debug!(server = %self.server_addr, bytes_received, "UDP response received");
            recv_buf.truncate(bytes_received);
            return Ok(recv_buf);
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })??;

        Ok(TransportResponse { bytes })
    }
}
