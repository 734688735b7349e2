use dns_by_eye_domain::{ErrorKind, ServerStatus};

/// How far the usable referrals at a level agreed with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consensus {
    /// Every usable answer carried the same NS set.
    Unanimous,
    /// Sets differ, but one is held by a strict majority.
    Majority,
    /// Sets differ and none has a strict majority.
    Split,
}

/// Turns the per-server statuses of one level into the level's error kind.
///
/// `consensus` is `Some` when at least one server gave a usable answer. In that
/// case individual failures stay in the observations and only disagreement or
/// lameness marks the level. Without usable answers the most specific failure
/// wins: NXDOMAIN over loops over lameness over timeouts over SERVFAIL over
/// REFUSED over malformed replies.
pub fn classify_level(statuses: &[ServerStatus], consensus: Option<Consensus>) -> Option<ErrorKind> {
    if let Some(consensus) = consensus {
        if any_of(statuses, &[ServerStatus::Lame, ServerStatus::Loop]) {
            return Some(ErrorKind::LameDelegation);
        }
        if consensus != Consensus::Unanimous || any_of(statuses, &[ServerStatus::NameError]) {
            return Some(ErrorKind::Inconsistent);
        }
        return None;
    }

    let precedence = [
        (&[ServerStatus::NameError][..], ErrorKind::NameError),
        (&[ServerStatus::Loop][..], ErrorKind::CircularDelegation),
        (&[ServerStatus::Lame][..], ErrorKind::LameDelegation),
        (&[ServerStatus::Timeout, ServerStatus::Cancelled][..], ErrorKind::Timeout),
        (&[ServerStatus::ServerFailure][..], ErrorKind::ServerFailure),
        (&[ServerStatus::Refused][..], ErrorKind::Refused),
        (&[ServerStatus::Malformed][..], ErrorKind::Malformed),
    ];

    precedence
        .iter()
        .find(|(wanted, _)| any_of(statuses, wanted))
        .map(|(_, kind)| *kind)
        .or(Some(ErrorKind::Unknown))
}

fn any_of(statuses: &[ServerStatus], wanted: &[ServerStatus]) -> bool {
    statuses.iter().any(|s| wanted.contains(s))
}
