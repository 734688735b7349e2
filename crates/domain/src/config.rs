pub mod errors;
pub mod logging;
pub mod root;
pub mod tracer;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use tracer::{RootHint, TracerConfig};
