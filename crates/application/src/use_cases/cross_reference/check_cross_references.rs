use crate::ports::{NameserverQuery, QueryMode};
use crate::use_cases::trace::GlueLookup;
use dns_by_eye_domain::{
    link_mutual_references, normalize_name, CrossReference, DomainError, QueryOutcome, RecordType,
    TracerConfig,
};
use futures::future::join_all;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const DNS_PORT: u16 = 53;

/// Asks each nameserver of the last traced level which nameservers it lists
/// for the domain, and relates the answers to each other.
pub struct CrossReferenceUseCase {
    query: Arc<dyn NameserverQuery>,
    glue: GlueLookup,
    query_timeout: Duration,
    lifetime: Duration,
}

impl CrossReferenceUseCase {
    pub fn new(query: Arc<dyn NameserverQuery>, config: &TracerConfig) -> Result<Self, DomainError> {
        let resolvers = config
            .glue_resolver_addrs()
            .map_err(DomainError::ConfigError)?;
        Ok(Self {
            glue: GlueLookup::new(Arc::clone(&query), resolvers, config.glue_timeout(), config.ipv6),
            query,
            query_timeout: config.query_timeout(),
            lifetime: config.lifetime(),
        })
    }

    pub async fn execute(&self, domain: &str, nameservers: &[String]) -> Vec<CrossReference> {
        let domain = normalize_name(domain);
        let deadline = Instant::now() + self.lifetime;

        let mut results = join_all(
            nameservers
                .iter()
                .map(|ns| self.check_one(&domain, ns, deadline)),
        )
        .await;

        link_mutual_references(&mut results);
        results
    }

    async fn check_one(&self, domain: &str, nameserver: &str, deadline: Instant) -> CrossReference {
        let addrs = match self.glue.resolve(nameserver, deadline).await {
            Ok(addrs) => addrs,
            Err(status) => {
                debug!(nameserver = %nameserver, status = ?status, "Nameserver address unknown");
                return CrossReference::failed(
                    nameserver.to_string(),
                    "could not resolve nameserver address".to_string(),
                );
            }
        };

        let Some(addr) = addrs.first() else {
            return CrossReference::failed(nameserver.to_string(), "no usable address".to_string());
        };

        let timeout = self
            .query_timeout
            .min(deadline.saturating_duration_since(Instant::now()));
        let outcome = self
            .query
            .query(
                SocketAddr::new(*addr, DNS_PORT),
                domain,
                RecordType::NS,
                QueryMode::Iterative,
                timeout,
            )
            .await;

        match outcome {
            QueryOutcome::Answered { records, .. } => {
                let references = records.ns_hosts_for(domain);
                if references.is_empty() {
                    CrossReference::failed(nameserver.to_string(), "no NS records returned".to_string())
                } else {
                    debug!(nameserver = %nameserver, references = references.len(), "Nameserver answered");
                    CrossReference::answered(nameserver.to_string(), references)
                }
            }
            other => CrossReference::failed(nameserver.to_string(), other.label().to_string()),
        }
    }
}
