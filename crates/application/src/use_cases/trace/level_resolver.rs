use super::candidate::Candidate;
use super::classifier::{classify_level, Consensus};
use super::glue_lookup::{failure_status, GlueLookup};
use crate::ports::{NameserverQuery, QueryMode};
use chrono::{DateTime, Utc};
use dns_by_eye_domain::{
    DomainError, ErrorKind, GlueRecord, HostAddress, QueryOutcome, RecordType, ServerObservation,
    ServerStatus, TraceNode, TracerConfig, ROOT_ZONE,
};
use futures::future::join_all;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace, warn};

const DNS_PORT: u16 = 53;

/// Outcome of resolving one zone level.
#[derive(Debug, Clone)]
pub struct LevelResolution {
    pub node: TraceNode,
    /// Servers to ask about the next zone; `None` when there is no working
    /// nameserver set to continue with.
    pub next: Option<Vec<Candidate>>,
    /// The NS set came from a referral: `zone` is a zone cut.
    pub cut: bool,
}

/// What one server's reply means for the zone being resolved.
#[derive(Debug)]
enum Reply {
    /// NS set for the zone, with the glue that came with it.
    Delegation {
        hosts: Vec<String>,
        glue: Vec<HostAddress>,
    },
    /// Authoritative answer without NS: the name is served by the parent.
    NoCut,
    Failed(ServerStatus),
}

struct Arrival {
    index: usize,
    outcome: QueryOutcome,
    elapsed_ms: u64,
}

/// Finds the authoritative nameservers for one zone by asking every candidate
/// server of the parent zone concurrently.
pub struct LevelResolver {
    query: Arc<dyn NameserverQuery>,
    glue: GlueLookup,
    query_timeout: Duration,
    slow_threshold_ms: u64,
    max_candidates: usize,
    ipv6: bool,
}

impl LevelResolver {
    pub fn new(query: Arc<dyn NameserverQuery>, config: &TracerConfig) -> Result<Self, DomainError> {
        let resolvers = config
            .glue_resolver_addrs()
            .map_err(DomainError::ConfigError)?;
        let glue = GlueLookup::new(
            Arc::clone(&query),
            resolvers,
            config.glue_timeout(),
            config.ipv6,
        );

        Ok(Self {
            query,
            glue,
            query_timeout: config.query_timeout(),
            slow_threshold_ms: config.slow_threshold_ms,
            max_candidates: config.max_candidates,
            ipv6: config.ipv6,
        })
    }

    /// Resolves `zone` through `candidates`, never running past `deadline`.
    ///
    /// `visited` lists the zones already resolved above this one; referrals
    /// back into them are loops.
    pub async fn resolve(
        &self,
        zone: &str,
        candidates: &[Candidate],
        visited: &[String],
        deadline: Instant,
    ) -> LevelResolution {
        let queried_at = Utc::now();
        let started = Instant::now();

        let (candidates, unqueried) = self.fill_missing_glue(candidates, deadline).await;
        let (targets, skipped) = self.targets(&candidates);

        if targets.is_empty() || Instant::now() >= deadline {
            let mut servers: Vec<ServerObservation> = targets
                .iter()
                .map(|(name, addr)| observation(name, Some(*addr), ServerStatus::Cancelled, 0))
                .collect();
            servers.extend(unqueried);
            servers.extend(skipped);
            let error_type = classify_level(&statuses_of(&servers), None);
            debug!(zone = %zone, error = ?error_type, "No nameserver could be queried");
            return LevelResolution {
                node: self.node(zone, vec![], elapsed_ms(started), error_type, queried_at, servers, vec![]),
                next: None,
                cut: false,
            };
        }

        let (arrivals, timed_out) = self.fan_out(zone, &targets, deadline).await;

        let mut replies: Vec<(usize, ServerStatus, u64)> = Vec::with_capacity(arrivals.len());
        let mut delegations: Vec<(Vec<String>, Vec<HostAddress>)> = Vec::new();
        let mut no_cut_servers: Vec<String> = Vec::new();
        let mut usable_elapsed: Vec<u64> = Vec::new();

        for arrival in arrivals {
            let (name, addr) = &targets[arrival.index];
            let status = match interpret(zone, visited, arrival.outcome) {
                Reply::Delegation { hosts, glue } => {
                    delegations.push((hosts, glue));
                    usable_elapsed.push(arrival.elapsed_ms);
                    ServerStatus::Answered
                }
                Reply::NoCut => {
                    if !no_cut_servers.contains(name) {
                        no_cut_servers.push(name.clone());
                    }
                    usable_elapsed.push(arrival.elapsed_ms);
                    ServerStatus::Answered
                }
                Reply::Failed(status) => status,
            };
            trace!(zone = %zone, nameserver = %name, address = %addr, status = ?status, elapsed_ms = arrival.elapsed_ms, "Server replied");
            replies.push((arrival.index, status, arrival.elapsed_ms));
        }

        let level_ms = elapsed_ms(started);
        let mut servers = observe(&targets, replies, timed_out, level_ms);
        servers.extend(unqueried);
        servers.extend(skipped);
        let statuses = statuses_of(&servers);

        let response_time_ms = usable_elapsed.iter().copied().min().unwrap_or(level_ms);

        if !delegations.is_empty() {
            let hosts: Vec<Vec<String>> = delegations.iter().map(|(h, _)| h.clone()).collect();
            let (mut consensus, working) = agree(&hosts);
            // Servers that disagree on whether the cut exists at all.
            if !no_cut_servers.is_empty() {
                consensus = Consensus::Split;
            }

            let mut offered: Vec<HostAddress> = Vec::new();
            for (_, glue) in &delegations {
                for record in glue {
                    if !offered.contains(record) {
                        offered.push(record.clone());
                    }
                }
            }

            let next: Vec<Candidate> = working
                .iter()
                .map(|host| {
                    let addrs = offered
                        .iter()
                        .filter(|g| &g.host == host)
                        .map(|g| g.addr)
                        .collect();
                    Candidate::new(host.clone(), addrs)
                })
                .collect();

            let mut glue = if zone == ROOT_ZONE {
                vec![]
            } else {
                GlueRecord::analyze(zone, &working, &offered)
            };
            self.compare_glue(&mut glue, deadline).await;

            let error_type = classify_level(&statuses, Some(consensus));
            return LevelResolution {
                node: self.node(zone, working, response_time_ms, error_type, queried_at, servers, glue),
                next: Some(next),
                cut: true,
            };
        }

        if !no_cut_servers.is_empty() {
            let next: Vec<Candidate> = no_cut_servers
                .iter()
                .filter_map(|name| candidates.iter().find(|c| &c.name == name).cloned())
                .collect();
            let error_type = classify_level(&statuses, Some(Consensus::Unanimous));
            debug!(zone = %zone, servers = no_cut_servers.len(), "Name is served by the parent zone");
            return LevelResolution {
                node: self.node(zone, no_cut_servers, response_time_ms, error_type, queried_at, servers, vec![]),
                next: Some(next),
                cut: false,
            };
        }

        let error_type = classify_level(&statuses, None);
        LevelResolution {
            node: self.node(zone, vec![], level_ms, error_type, queried_at, servers, vec![]),
            next: None,
            cut: false,
        }
    }

    /// Asks the nameservers a zone was delegated to about the zone itself.
    ///
    /// Each must answer authoritatively with the apex NS set; any other reply
    /// makes it lame. An apex NS set that differs from the referral is an
    /// inconsistency. When none of them answers, the level has no working
    /// nameserver set and `next` becomes `None`.
    pub async fn confirm_authority(&self, resolution: LevelResolution, deadline: Instant) -> LevelResolution {
        let LevelResolution { mut node, next, cut } = resolution;
        let candidates = match next {
            Some(candidates) if cut && !candidates.is_empty() => candidates,
            next => return LevelResolution { node, next, cut },
        };

        let zone = node.zone.clone();
        let started = Instant::now();
        let (candidates, unqueried) = self.fill_missing_glue(&candidates, deadline).await;
        let (targets, skipped) = self.targets(&candidates);

        let (arrivals, timed_out) = if targets.is_empty() || Instant::now() >= deadline {
            (vec![], true)
        } else {
            self.fan_out(&zone, &targets, deadline).await
        };

        let mut apex_sets: Vec<Vec<String>> = Vec::new();
        let mut replies: Vec<(usize, ServerStatus, u64)> = Vec::with_capacity(arrivals.len());
        for arrival in arrivals {
            let status = match authoritative_hosts(&zone, arrival.outcome) {
                Ok(hosts) => {
                    apex_sets.push(hosts);
                    ServerStatus::Answered
                }
                Err(status) => status,
            };
            trace!(zone = %zone, nameserver = %targets[arrival.index].0, status = ?status, "Delegated server replied");
            replies.push((arrival.index, status, arrival.elapsed_ms));
        }

        let mut authority = observe(&targets, replies, timed_out, elapsed_ms(started));
        authority.extend(unqueried);
        authority.extend(skipped);
        let statuses = statuses_of(&authority);

        let confirmed = !apex_sets.is_empty();
        if confirmed {
            let (mut consensus, apex) = agree(&apex_sets);
            if consensus == Consensus::Unanimous && !same_hosts(&apex, &node.nameservers) {
                debug!(zone = %zone, referral = ?node.nameservers, apex = ?apex, "Apex NS set differs from referral");
                consensus = Consensus::Split;
            }
            let found = classify_level(&statuses, Some(consensus));
            node.error_type = match found {
                Some(ErrorKind::LameDelegation) => found,
                _ => node.error_type.or(found),
            };
        } else {
            node.error_type = classify_level(&statuses, None);
            warn!(zone = %zone, error = ?node.error_type, "No delegated nameserver answered authoritatively");
        }
        node.authority = authority;

        LevelResolution {
            node,
            next: confirmed.then_some(candidates),
            cut,
        }
    }

    /// Resolves addresses for candidates that arrived without usable glue.
    /// Returns the candidates that can be queried, and an observation for
    /// every nameserver whose address could not be found or was not looked up.
    async fn fill_missing_glue(
        &self,
        candidates: &[Candidate],
        deadline: Instant,
    ) -> (Vec<Candidate>, Vec<ServerObservation>) {
        let missing: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.needs_glue(self.ipv6))
            .take(self.max_candidates)
            .collect();

        if missing.is_empty() {
            return (candidates.to_vec(), vec![]);
        }

        let started = Instant::now();
        let lookups = join_all(missing.iter().map(|c| self.glue.resolve(&c.name, deadline))).await;
        let lookup_ms = elapsed_ms(started);

        let mut resolved: Vec<Candidate> = Vec::with_capacity(candidates.len());
        let mut unqueried = Vec::new();
        let mut lookups = missing.iter().zip(lookups);

        for candidate in candidates {
            if !candidate.needs_glue(self.ipv6) {
                resolved.push(candidate.clone());
                continue;
            }
            let Some((_, lookup)) = lookups.next() else {
                debug!(nameserver = %candidate.name, "Over the candidate cap, address not looked up");
                unqueried.push(observation(&candidate.name, None, ServerStatus::Skipped, 0));
                continue;
            };
            match lookup {
                Ok(addrs) => resolved.push(Candidate::new(candidate.name.clone(), addrs)),
                Err(status) => {
                    warn!(nameserver = %candidate.name, status = ?status, "Could not resolve nameserver address");
                    unqueried.push(observation(&candidate.name, None, status, lookup_ms));
                }
            }
        }

        (resolved, unqueried)
    }

    /// Addresses to query, in candidate order, capped at `max_candidates`.
    /// Addresses past the cap come back as skipped observations.
    fn targets(&self, candidates: &[Candidate]) -> (Vec<(String, IpAddr)>, Vec<ServerObservation>) {
        let mut targets: Vec<(String, IpAddr)> = candidates
            .iter()
            .flat_map(|c| c.usable_addrs(self.ipv6).map(move |addr| (c.name.clone(), addr)))
            .collect();
        let skipped = targets
            .split_off(self.max_candidates.min(targets.len()))
            .into_iter()
            .map(|(name, addr)| observation(&name, Some(addr), ServerStatus::Skipped, 0))
            .collect();
        (targets, skipped)
    }

    /// Resolves every nameserver that came with glue and flags glue that
    /// disagrees with the resolved addresses. Hosts that do not resolve are
    /// left alone.
    async fn compare_glue(&self, glue: &mut [GlueRecord], deadline: Instant) {
        let resolved = join_all(glue.iter().map(|record| async move {
            if record.addresses.is_empty() {
                return None;
            }
            self.glue.resolve(&record.nameserver, deadline).await.ok()
        }))
        .await;

        for (record, addrs) in glue.iter_mut().zip(resolved) {
            if let Some(addrs) = addrs {
                record.check_resolution(&addrs);
            }
        }
    }

    /// Queries every target concurrently. Returns the replies in arrival order
    /// and whether the deadline cut the wait short.
    async fn fan_out(
        &self,
        zone: &str,
        targets: &[(String, IpAddr)],
        deadline: Instant,
    ) -> (Vec<Arrival>, bool) {
        let mut abort_handles = Vec::with_capacity(targets.len());
        let mut futs = FuturesUnordered::new();
        let timeout = self
            .query_timeout
            .min(deadline.saturating_duration_since(Instant::now()));

        for (index, (_, addr)) in targets.iter().enumerate() {
            let query = Arc::clone(&self.query);
            let zone = zone.to_string();
            let server = SocketAddr::new(*addr, DNS_PORT);
            let handle = tokio::spawn(async move {
                let sent = Instant::now();
                let outcome = query
                    .query(server, &zone, RecordType::NS, QueryMode::Iterative, timeout)
                    .await;
                Arrival {
                    index,
                    outcome,
                    elapsed_ms: elapsed_ms(sent),
                }
            });
            abort_handles.push(handle.abort_handle());
            futs.push(handle);
        }

        let mut arrivals = Vec::with_capacity(targets.len());
        let waited = timeout_at(deadline, async {
            while let Some(joined) = futs.next().await {
                match joined {
                    Ok(arrival) => arrivals.push(arrival),
                    Err(e) => warn!(error = %e, "Query task failed"),
                }
            }
        })
        .await;

        for handle in &abort_handles {
            handle.abort();
        }

        let timed_out = waited.is_err();
        if timed_out {
            debug!(zone = %zone, answered = arrivals.len(), pending = targets.len() - arrivals.len(), "Budget exhausted, cancelling queries");
        }
        (arrivals, timed_out)
    }

    #[allow(clippy::too_many_arguments)]
    fn node(
        &self,
        zone: &str,
        nameservers: Vec<String>,
        response_time_ms: u64,
        error_type: Option<ErrorKind>,
        queried_at: DateTime<Utc>,
        servers: Vec<ServerObservation>,
        glue: Vec<GlueRecord>,
    ) -> TraceNode {
        TraceNode {
            zone: zone.to_string(),
            nameservers,
            response_time_ms,
            error_type,
            is_slow: response_time_ms > self.slow_threshold_ms,
            queried_at,
            servers,
            authority: vec![],
            glue,
        }
    }
}

fn observation(nameserver: &str, address: Option<IpAddr>, status: ServerStatus, elapsed_ms: u64) -> ServerObservation {
    ServerObservation {
        nameserver: nameserver.to_string(),
        address,
        status,
        elapsed_ms,
    }
}

/// One observation per target, in target order. Targets without a reply were
/// cancelled when the deadline cut the wait short, and failed otherwise.
fn observe(
    targets: &[(String, IpAddr)],
    replies: Vec<(usize, ServerStatus, u64)>,
    timed_out: bool,
    level_ms: u64,
) -> Vec<ServerObservation> {
    let mut observed: Vec<Option<ServerObservation>> = vec![None; targets.len()];
    for (index, status, elapsed) in replies {
        let (name, addr) = &targets[index];
        observed[index] = Some(observation(name, Some(*addr), status, elapsed));
    }

    let missing = if timed_out {
        ServerStatus::Cancelled
    } else {
        ServerStatus::ServerFailure
    };
    observed
        .into_iter()
        .zip(targets)
        .map(|(seen, (name, addr))| seen.unwrap_or_else(|| observation(name, Some(*addr), missing, level_ms)))
        .collect()
}

fn statuses_of(servers: &[ServerObservation]) -> Vec<ServerStatus> {
    servers.iter().map(|s| s.status).collect()
}

fn interpret(zone: &str, visited: &[String], outcome: QueryOutcome) -> Reply {
    let records = match outcome {
        QueryOutcome::Answered { records, .. } => records,
        other => return Reply::Failed(failure_status(&other)),
    };

    let hosts = records.ns_hosts_for(zone);
    if !hosts.is_empty() {
        return Reply::Delegation {
            hosts,
            glue: records.glue,
        };
    }

    if records.authoritative && records.answer_ns.is_empty() && records.authority_soa {
        return Reply::NoCut;
    }

    match records.referral_zone() {
        Some(referred) if referred != zone && visited.iter().any(|v| v == referred) => {
            Reply::Failed(ServerStatus::Loop)
        }
        _ => Reply::Failed(ServerStatus::Lame),
    }
}

/// Apex NS hosts from a server that must be authoritative for `zone`.
/// Refusals, SERVFAIL and NXDOMAIN from such a server are lameness too.
fn authoritative_hosts(zone: &str, outcome: QueryOutcome) -> Result<Vec<String>, ServerStatus> {
    match outcome {
        QueryOutcome::Answered { records, .. } => {
            if records.authoritative && records.answer_ns.iter().any(|r| r.zone == zone) {
                Ok(records.ns_hosts_for(zone))
            } else {
                Err(ServerStatus::Lame)
            }
        }
        QueryOutcome::Refused | QueryOutcome::ServerFailure | QueryOutcome::NameError => {
            Err(ServerStatus::Lame)
        }
        other => Err(failure_status(&other)),
    }
}

fn same_hosts(a: &[String], b: &[String]) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// Picks the working NS set from the delegations, given in arrival order.
///
/// Unanimous and majority sets keep the order of the first answer that carried
/// them; a split falls back to the union in arrival order.
fn agree(delegations: &[Vec<String>]) -> (Consensus, Vec<String>) {
    let mut groups: Vec<(BTreeSet<&String>, usize, usize)> = Vec::new();
    for (position, hosts) in delegations.iter().enumerate() {
        let set: BTreeSet<&String> = hosts.iter().collect();
        match groups.iter_mut().find(|(existing, _, _)| *existing == set) {
            Some(group) => group.1 += 1,
            None => groups.push((set, 1, position)),
        }
    }

    if groups.len() == 1 {
        return (Consensus::Unanimous, delegations[0].clone());
    }

    if let Some((_, _, first)) = groups
        .iter()
        .find(|(_, count, _)| count * 2 > delegations.len())
    {
        return (Consensus::Majority, delegations[*first].clone());
    }

    let mut union: Vec<String> = Vec::new();
    for host in delegations.iter().flatten() {
        if !union.contains(host) {
            union.push(host.clone());
        }
    }
    (Consensus::Split, union)
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
