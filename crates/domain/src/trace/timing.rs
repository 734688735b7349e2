use serde::Serialize;

use super::error_kind::ErrorKind;
use super::node::TraceNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelTiming {
    pub zone: String,
    pub response_time_ms: u64,
    pub is_slow: bool,
    pub error_type: Option<ErrorKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingSummary {
    /// Wall-clock time of the whole walk.
    pub total_ms: u64,
    pub levels: usize,
    pub error_levels: usize,
    pub slow_levels: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_level: Option<Vec<LevelTiming>>,
}

impl TimingSummary {
    pub fn from_trace(trace: &[TraceNode], total_ms: u64, with_levels: bool) -> Self {
        let per_level = with_levels.then(|| {
            trace
                .iter()
                .map(|node| LevelTiming {
                    zone: node.zone.clone(),
                    response_time_ms: node.response_time_ms,
                    is_slow: node.is_slow,
                    error_type: node.error_type,
                })
                .collect()
        });

        Self {
            total_ms,
            levels: trace.len(),
            error_levels: trace.iter().filter(|n| n.has_error()).count(),
            slow_levels: trace.iter().filter(|n| n.is_slow).count(),
            per_level,
        }
    }
}
