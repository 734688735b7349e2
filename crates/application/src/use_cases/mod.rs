pub mod cross_reference;
pub mod trace;

pub use cross_reference::CrossReferenceUseCase;
pub use trace::{LevelResolver, TraceDelegationUseCase, TraceOptions};
