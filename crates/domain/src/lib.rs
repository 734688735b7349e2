//! dns-by-eye domain layer
pub mod config;
pub mod cross_reference;
pub mod errors;
pub mod health;
pub mod query_outcome;
pub mod record_type;
pub mod trace;
pub mod validators;
pub mod zone;

pub use config::{CliOverrides, Config, ConfigError, LoggingConfig, RootHint, TracerConfig};
pub use cross_reference::{link_mutual_references, CrossReference};
pub use errors::DomainError;
pub use health::HealthScore;
pub use query_outcome::{DnsAnswer, HostAddress, NsRecord, QueryOutcome};
pub use record_type::RecordType;
pub use trace::{
    build_chain, ErrorKind, GlueIssue, GlueRecord, LevelTiming, ServerObservation, ServerStatus,
    TimingSummary, TraceNode, TraceReport,
};
pub use validators::{is_valid_domain, validate_domain};
pub use zone::{is_in_zone, label_count, normalize_name, zone_chain, ROOT_ZONE};
