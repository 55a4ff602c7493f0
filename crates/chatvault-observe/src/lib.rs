//! Observability setup for chatvault: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
