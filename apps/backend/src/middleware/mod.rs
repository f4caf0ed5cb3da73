//! HTTP middleware. `main.rs` wraps CORS first and `RequestTrace` last, so
//! `RequestTrace` runs outermost and the trace id is in place before
//! `TraceSpan` and `StructuredLogger` see the request.

pub mod cors;
pub mod request_trace;
pub mod structured_logger;
pub mod trace_span;

pub use cors::cors_middleware;
pub use request_trace::{RequestTrace, TraceId};
pub use structured_logger::StructuredLogger;
pub use trace_span::TraceSpan;
