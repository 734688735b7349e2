use dns_by_eye_domain::{normalize_name, DnsAnswer, DomainError, HostAddress, NsRecord};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, Record};
use std::net::IpAddr;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    pub rcode: ResponseCode,

    pub truncated: bool,

    pub answer: DnsAnswer,
}

pub struct ResponseParser;

impl ResponseParser {
    /// Parses a response into the sections the tracer reads: NS records from
    /// the answer and authority sections, addresses from the answer section,
    /// glue from the additional section.
    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        let mut answer = DnsAnswer {
            authoritative: message.authoritative(),
            ..Default::default()
        };

        for record in message.answers() {
            if let Some(ns) = ns_record(record) {
                answer.answer_ns.push(ns);
            } else if let Some(address) = host_address(record) {
                answer.addresses.push(address);
            }
        }

        for record in message.name_servers() {
            match record.data() {
                RData::SOA(_) => answer.authority_soa = true,
                _ => answer.authority_ns.extend(ns_record(record)),
            }
        }

        answer
            .glue
            .extend(message.additionals().iter().filter_map(host_address));

        debug!(
            rcode = ?message.response_code(),
            aa = answer.authoritative,
            answer_ns = answer.answer_ns.len(),
            authority_ns = answer.authority_ns.len(),
            glue = answer.glue.len(),
            truncated = message.truncated(),
            "DNS response parsed"
        );

        Ok(DnsResponse {
            id: message.id(),
            rcode: message.response_code(),
            truncated: message.truncated(),
            answer,
        })
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            _ => "UNKNOWN",
        }
    }
}

fn ns_record(record: &Record) -> Option<NsRecord> {
    match record.data() {
        RData::NS(ns) => Some(NsRecord {
            zone: normalize_name(&record.name().to_utf8()),
            host: normalize_name(&ns.0.to_utf8()),
        }),
        _ => None,
    }
}

fn host_address(record: &Record) -> Option<HostAddress> {
    let addr = match record.data() {
        RData::A(a) => IpAddr::V4(a.0),
        RData::AAAA(aaaa) => IpAddr::V6(aaaa.0),
        _ => return None,
    };
    Some(HostAddress {
        host: normalize_name(&record.name().to_utf8()),
        addr,
    })
}
