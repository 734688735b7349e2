use serde::Serialize;

use super::chain::build_chain;
use super::error_kind::ErrorKind;
use super::node::TraceNode;
use super::timing::TimingSummary;

/// Everything one trace produced. The chain and timing are derived from the
/// trace when the report is built and cannot be changed independently.
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport {
    domain: String,
    trace: Vec<TraceNode>,
    chain: Vec<String>,
    timing: TimingSummary,
}

impl TraceReport {
    pub fn new(domain: String, trace: Vec<TraceNode>, total_ms: u64, with_levels: bool) -> Self {
        let chain = build_chain(&trace);
        let timing = TimingSummary::from_trace(&trace, total_ms, with_levels);
        Self {
            domain,
            trace,
            chain,
            timing,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn trace(&self) -> &[TraceNode] {
        &self.trace
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn timing(&self) -> &TimingSummary {
        &self.timing
    }

    /// True when the walk reached the queried domain and at least one of its
    /// nameservers answered for it.
    pub fn is_complete(&self) -> bool {
        let Some(last) = self.trace.last() else {
            return false;
        };
        last.zone == self.domain
            && last.authority_confirmed()
            && !last.error_type.is_some_and(|kind| !kind.is_recoverable())
    }

    /// Error carried by the last level, if the walk stopped on one.
    pub fn terminal_error(&self) -> Option<ErrorKind> {
        self.trace.last().and_then(|node| node.error_type)
    }

    /// Nameservers of the deepest level reached.
    pub fn last_nameservers(&self) -> &[String] {
        self.trace
            .last()
            .map(|node| node.nameservers.as_slice())
            .unwrap_or(&[])
    }

    pub fn into_parts(self) -> (Vec<TraceNode>, Vec<String>, TimingSummary) {
        (self.trace, self.chain, self.timing)
    }
}
