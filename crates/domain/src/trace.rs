pub mod chain;
pub mod error_kind;
pub mod glue;
pub mod node;
pub mod report;
pub mod timing;

pub use chain::build_chain;
pub use error_kind::ErrorKind;
pub use glue::{GlueIssue, GlueRecord};
pub use node::{ServerObservation, ServerStatus, TraceNode};
pub use report::TraceReport;
pub use timing::{LevelTiming, TimingSummary};
