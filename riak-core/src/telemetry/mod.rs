//! Tracing spans and metrics for the decode pipeline

pub mod counters;
pub mod spans;

pub use counters::describe_metrics;
pub use spans::TracedOperation;
