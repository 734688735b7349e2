#![allow(dead_code)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

const TYPE_A: u16 = 1;
const TYPE_NS: u16 = 2;
const TYPE_SOA: u16 = 6;

const FLAG_QR: u8 = 0x80;
const FLAG_AA: u8 = 0x04;
const FLAG_TC: u8 = 0x02;
const FLAG_RD: u8 = 0x01;

/// What the mock server answers to every query it receives.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Non-authoritative referral: NS in authority, glue in additional.
    Referral {
        zone: String,
        servers: Vec<(String, Ipv4Addr)>,
    },
    /// Authoritative NS answer for the zone apex.
    AuthoritativeNs {
        zone: String,
        servers: Vec<(String, Ipv4Addr)>,
    },
    /// Recursive-style A answer.
    Address { host: String, addr: Ipv4Addr },
    /// Authoritative NOERROR with only an SOA in authority.
    NoData { zone: String },
    /// Empty response carrying this RCODE.
    Rcode(u8),
    /// Reads queries and never answers.
    Silent,
    /// Valid referral under a different transaction ID.
    WrongId { zone: String },
    /// Over UDP: empty with TC set. Over TCP: the wrapped reply.
    Truncated(Box<MockReply>),
    /// Over UDP: the wrapped reply under a different ID, then the reply itself.
    AfterStray(Box<MockReply>),
}

/// Scripted nameserver listening on loopback UDP and TCP (same port).
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<Mutex<Vec<Vec<u8>>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl MockDnsServer {
    pub async fn start(reply: MockReply) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;
        let queries = Arc::new(Mutex::new(Vec::new()));

        let udp_reply = reply.clone();
        let udp_queries = Arc::clone(&queries);
        let udp_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                udp_queries.lock().unwrap().push(buf[..len].to_vec());
                let (stray, reply) = match &udp_reply {
                    MockReply::AfterStray(inner) => (true, inner.as_ref()),
                    other => (false, other),
                };
                if let Some(response) = build_response(&buf[..len], reply, false) {
                    if stray {
                        let mut other_id = response.clone();
                        other_id[0] ^= 0xff;
                        let _ = socket.send_to(&other_id, peer).await;
                    }
                    let _ = socket.send_to(&response, peer).await;
                }
            }
        });

        let tcp_queries = Arc::clone(&queries);
        let tcp_task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut len_buf = [0u8; 2];
                if stream.read_exact(&mut len_buf).await.is_err() {
                    continue;
                }
                let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                if stream.read_exact(&mut query).await.is_err() {
                    continue;
                }
                tcp_queries.lock().unwrap().push(query.clone());
                if let Some(response) = build_response(&query, &reply, true) {
                    let _ = stream
                        .write_all(&(response.len() as u16).to_be_bytes())
                        .await;
                    let _ = stream.write_all(&response).await;
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            tasks: vec![udp_task, tcp_task],
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> Vec<Vec<u8>> {
        self.queries.lock().unwrap().clone()
    }

    /// RD bit of the last query received.
    pub fn last_query_recursion_desired(&self) -> Option<bool> {
        self.queries()
            .last()
            .map(|query| query[2] & FLAG_RD == FLAG_RD)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.trim_end_matches('.').split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

fn record(owner: &str, rtype: u16, rdata: &[u8]) -> Vec<u8> {
    let mut out = encode_name(owner);
    out.extend_from_slice(&rtype.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&3600u32.to_be_bytes());
    out.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    out.extend_from_slice(rdata);
    out
}

fn soa_rdata(zone: &str) -> Vec<u8> {
    let mut out = encode_name(&format!("ns1.{}", zone));
    out.extend(encode_name(&format!("hostmaster.{}", zone)));
    for value in [1u32, 7200, 3600, 1_209_600, 300] {
        out.extend_from_slice(&value.to_be_bytes());
    }
    out
}

struct Sections {
    flags: u8,
    rcode: u8,
    answer: Vec<Vec<u8>>,
    authority: Vec<Vec<u8>>,
    additional: Vec<Vec<u8>>,
}

impl Sections {
    fn empty(flags: u8, rcode: u8) -> Self {
        Self {
            flags,
            rcode,
            answer: vec![],
            authority: vec![],
            additional: vec![],
        }
    }
}

fn ns_and_glue(zone: &str, servers: &[(String, Ipv4Addr)]) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let ns = servers
        .iter()
        .map(|(host, _)| record(zone, TYPE_NS, &encode_name(host)))
        .collect();
    let glue = servers
        .iter()
        .map(|(host, addr)| record(host, TYPE_A, &addr.octets()))
        .collect();
    (ns, glue)
}

pub fn build_response(query: &[u8], reply: &MockReply, over_tcp: bool) -> Option<Vec<u8>> {
    if query.len() < 12 {
        return None;
    }

    let mut id = [query[0], query[1]];
    let sections = match reply {
        MockReply::Silent => return None,
        MockReply::Truncated(inner) if over_tcp => return build_response(query, inner, true),
        MockReply::Truncated(_) => Sections::empty(FLAG_TC, 0),
        MockReply::AfterStray(inner) => return build_response(query, inner, over_tcp),
        MockReply::Rcode(rcode) => Sections::empty(0, *rcode),
        MockReply::Referral { zone, servers } => {
            let (ns, glue) = ns_and_glue(zone, servers);
            Sections {
                authority: ns,
                additional: glue,
                ..Sections::empty(0, 0)
            }
        }
        MockReply::WrongId { zone } => {
            id = [query[0] ^ 0xff, query[1]];
            let (ns, glue) = ns_and_glue(zone, &[(format!("ns1.{}", zone), Ipv4Addr::new(192, 0, 2, 1))]);
            Sections {
                authority: ns,
                additional: glue,
                ..Sections::empty(0, 0)
            }
        }
        MockReply::AuthoritativeNs { zone, servers } => {
            let (ns, glue) = ns_and_glue(zone, servers);
            Sections {
                answer: ns,
                additional: glue,
                ..Sections::empty(FLAG_AA, 0)
            }
        }
        MockReply::Address { host, addr } => Sections {
            answer: vec![record(host, TYPE_A, &addr.octets())],
            ..Sections::empty(0, 0)
        },
        MockReply::NoData { zone } => Sections {
            authority: vec![record(zone, TYPE_SOA, &soa_rdata(zone))],
            ..Sections::empty(FLAG_AA, 0)
        },
    };

    let mut response = Vec::with_capacity(512);
    response.extend_from_slice(&id);
    response.push(FLAG_QR | sections.flags | (query[2] & FLAG_RD));
    response.push(sections.rcode & 0x0f);
    response.extend_from_slice(&1u16.to_be_bytes());
    response.extend_from_slice(&(sections.answer.len() as u16).to_be_bytes());
    response.extend_from_slice(&(sections.authority.len() as u16).to_be_bytes());
    response.extend_from_slice(&(sections.additional.len() as u16).to_be_bytes());
    response.extend_from_slice(&query[12..]);
    for rr in sections
        .answer
        .iter()
        .chain(sections.authority.iter())
        .chain(sections.additional.iter())
    {
        response.extend_from_slice(rr);
    }

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_name() {
        assert_eq!(encode_name("."), vec![0]);
        assert_eq!(encode_name("ca."), vec![2, b'c', b'a', 0]);
    }

    #[test]
    fn test_response_echoes_id_and_question() {
        let mut query = vec![0xab, 0xcd, 0x00, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
        query.extend(encode_name("ca"));
        query.extend_from_slice(&[0, 2, 0, 1]);

        let response = build_response(&query, &MockReply::Rcode(3), false).unwrap();

        assert_eq!(response[0..2], query[0..2]);
        assert_eq!(response[2] & FLAG_QR, FLAG_QR);
        assert_eq!(response[3] & 0x0f, 3);
        assert_eq!(response[12..], query[12..]);
    }
}
