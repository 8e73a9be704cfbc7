//! Diagnostics module: the gRPC surface of the agent.

pub mod map;
pub mod route;

pub use route::DiagnosticsServiceImpl;
