use async_trait::async_trait;
use dns_by_eye_application::ports::{NameserverQuery, QueryMode};
use dns_by_eye_domain::{QueryOutcome, RecordType};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// How a scripted server reacts to one (name, type) question.
#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(QueryOutcome),
    /// Replies after `delay`, or times out if the caller's timeout is shorter.
    Delayed(Duration, QueryOutcome),
    /// Never replies within any timeout.
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub server: SocketAddr,
    pub name: String,
    pub record_type: RecordType,
    pub mode: QueryMode,
}

/// In-memory nameservers keyed by server address, query name and type.
/// Unscripted questions are refused.
#[derive(Clone, Default)]
pub struct MockNameservers {
    behaviors: Arc<RwLock<HashMap<(IpAddr, String, RecordType), Behavior>>>,
    calls: Arc<RwLock<Vec<RecordedQuery>>>,
}

impl MockNameservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, server: &str, name: &str, record_type: RecordType, behavior: Behavior) {
        self.behaviors.write().unwrap().insert(
            (server.parse().unwrap(), name.to_string(), record_type),
            behavior,
        );
    }

    pub fn reply(&self, server: &str, name: &str, record_type: RecordType, outcome: QueryOutcome) {
        self.on(server, name, record_type, Behavior::Reply(outcome));
    }

    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.read().unwrap().clone()
    }

    pub fn calls_to(&self, server: &str) -> Vec<RecordedQuery> {
        let addr: IpAddr = server.parse().unwrap();
        self.calls()
            .into_iter()
            .filter(|c| c.server.ip() == addr)
            .collect()
    }
}

#[async_trait]
impl NameserverQuery for MockNameservers {
    async fn query(
        &self,
        server: SocketAddr,
        name: &str,
        record_type: RecordType,
        mode: QueryMode,
        timeout: Duration,
    ) -> QueryOutcome {
        self.calls.write().unwrap().push(RecordedQuery {
            server,
            name: name.to_string(),
            record_type,
            mode,
        });

        let behavior = self
            .behaviors
            .read()
            .unwrap()
            .get(&(server.ip(), name.to_string(), record_type))
            .cloned();

        match behavior {
            None => QueryOutcome::Refused,
            Some(Behavior::Reply(outcome)) => outcome,
            Some(Behavior::Delayed(delay, outcome)) => {
                if delay > timeout {
                    tokio::time::sleep(timeout).await;
                    QueryOutcome::Timeout
                } else {
                    tokio::time::sleep(delay).await;
                    outcome
                }
            }
            Some(Behavior::Silent) => {
                tokio::time::sleep(timeout).await;
                QueryOutcome::Timeout
            }
        }
    }
}
