mod candidate;
mod classifier;
mod glue_lookup;
mod level_resolver;
mod trace_delegation;

pub use candidate::Candidate;
pub use classifier::{classify_level, Consensus};
pub use glue_lookup::GlueLookup;
pub use level_resolver::{LevelResolution, LevelResolver};
pub use trace_delegation::{TraceDelegationUseCase, TraceOptions};
