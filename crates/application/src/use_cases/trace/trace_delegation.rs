use super::candidate::Candidate;
use super::level_resolver::LevelResolver;
use crate::ports::NameserverQuery;
use chrono::Utc;
use dns_by_eye_domain::{
    validate_domain, zone_chain, DomainError, ErrorKind, TraceNode, TraceReport, TracerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Diagnostic switches. They change what gets logged and whether per-level
/// timings are attached, never the trace itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceOptions {
    pub verbose: bool,
    pub debug: bool,
}

enum WalkState {
    Start,
    Descending {
        level: usize,
        candidates: Vec<Candidate>,
    },
    Done,
    Failed(Option<ErrorKind>),
}

/// Walks the delegation chain of a domain from the root zone down.
pub struct TraceDelegationUseCase {
    resolver: LevelResolver,
    root: Vec<Candidate>,
    lifetime: Duration,
}

impl TraceDelegationUseCase {
    pub fn new(query: Arc<dyn NameserverQuery>, config: &TracerConfig) -> Result<Self, DomainError> {
        Ok(Self {
            resolver: LevelResolver::new(query, config)?,
            root: Candidate::from_root_hints(&config.root_hints, config.ipv6),
            lifetime: config.lifetime(),
        })
    }

    /// Traces `domain` and returns one node per visited zone.
    ///
    /// Only a domain that fails syntax validation is an `Err`; every network
    /// failure ends up on the node of the level where it happened.
    pub async fn execute(&self, domain: &str, options: TraceOptions) -> Result<TraceReport, DomainError> {
        let started = Instant::now();
        let deadline = started + self.lifetime;

        let mut domain_name = String::new();
        let mut zones: Vec<String> = Vec::new();
        let mut trace: Vec<TraceNode> = Vec::new();
        let mut state = WalkState::Start;

        loop {
            state = match state {
                WalkState::Start => {
                    domain_name = validate_domain(domain)?;
                    zones = zone_chain(&domain_name);
                    announce(options, &format!("Tracing delegation for {}", domain_name));
                    WalkState::Descending {
                        level: 0,
                        candidates: self.root.clone(),
                    }
                }

                WalkState::Descending { level, candidates } => {
                    let zone = &zones[level];
                    let visited = &zones[..level];

                    if Instant::now() >= deadline {
                        warn!(zone = %zone, "Trace budget exhausted before level started");
                        trace.push(empty_node(zone, ErrorKind::Timeout));
                        WalkState::Failed(Some(ErrorKind::Timeout))
                    } else {
                        let mut resolution = self
                            .resolver
                            .resolve(zone, &candidates, visited, deadline)
                            .await;
                        if level + 1 == zones.len() && resolution.cut && !resolution.node.is_terminal() {
                            resolution = self.resolver.confirm_authority(resolution, deadline).await;
                        }
                        let node = resolution.node;

                        announce(
                            options,
                            &format!(
                                "{} -> [{}] in {}ms{}",
                                node.zone,
                                node.nameservers.join(", "),
                                node.response_time_ms,
                                node.error_type
                                    .map(|kind| format!(" ({})", kind))
                                    .unwrap_or_default()
                            ),
                        );

                        let halted = node.is_terminal();
                        let error_type = node.error_type;
                        trace.push(node);

                        match resolution.next {
                            _ if halted => WalkState::Failed(error_type),
                            None => WalkState::Failed(error_type),
                            Some(_) if level + 1 == zones.len() => WalkState::Done,
                            Some(next) if next.is_empty() => WalkState::Failed(error_type),
                            Some(next) => WalkState::Descending {
                                level: level + 1,
                                candidates: next,
                            },
                        }
                    }
                }

                WalkState::Done => {
                    debug!(domain = %domain_name, levels = trace.len(), "Delegation chain complete");
                    break;
                }

                WalkState::Failed(error_type) => {
                    debug!(domain = %domain_name, levels = trace.len(), error = ?error_type, "Delegation walk halted");
                    break;
                }
            };
        }

        let total_ms = started.elapsed().as_millis() as u64;
        let report = TraceReport::new(domain_name, trace, total_ms, options.debug);

        if options.verbose || options.debug {
            info!(
                domain = %report.domain(),
                chain = %report.chain().join(" -> "),
                total_ms,
                complete = report.is_complete(),
                "Trace finished"
            );
        }

        Ok(report)
    }
}

fn empty_node(zone: &str, error_type: ErrorKind) -> TraceNode {
    TraceNode {
        zone: zone.to_string(),
        nameservers: vec![],
        response_time_ms: 0,
        error_type: Some(error_type),
        is_slow: false,
        queried_at: Utc::now(),
        servers: vec![],
        authority: vec![],
        glue: vec![],
    }
}

fn announce(options: TraceOptions, message: &str) {
    if options.verbose || options.debug {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}
