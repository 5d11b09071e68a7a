//! Process observability for the hook.

pub mod tracing_setup;
