use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of problems a trace level can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidDomain,
    Timeout,
    NameError,
    ServerFailure,
    Refused,
    Malformed,
    LameDelegation,
    Inconsistent,
    CircularDelegation,
    Unknown,
}

impl ErrorKind {
    /// Kinds that always end the walk at the level carrying them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ErrorKind::NameError
                | ErrorKind::Timeout
                | ErrorKind::ServerFailure
                | ErrorKind::CircularDelegation
        )
    }

    /// Kinds that annotate a level without stopping the walk on their own.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorKind::LameDelegation | ErrorKind::Inconsistent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidDomain => "INVALID_DOMAIN",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::NameError => "NAME_ERROR",
            ErrorKind::ServerFailure => "SERVER_FAILURE",
            ErrorKind::Refused => "REFUSED",
            ErrorKind::Malformed => "MALFORMED",
            ErrorKind::LameDelegation => "LAME_DELEGATION",
            ErrorKind::Inconsistent => "INCONSISTENT",
            ErrorKind::CircularDelegation => "CIRCULAR_DELEGATION",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
