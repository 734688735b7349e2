//! dns-by-eye application layer: the delegation tracer and its ports.
pub mod ports;
pub mod use_cases;
