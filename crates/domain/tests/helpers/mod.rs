mod builders;

pub use builders::TraceNodeBuilder;
