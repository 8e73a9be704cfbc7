// Domain-driven module structure for the diagnostics agent.

// Core infrastructure
pub mod parser;
pub mod filter;
pub mod cache;
pub mod state;
pub mod conf;
pub mod runtime;
pub mod proto;

// Domain modules
pub mod logs;
pub mod info;
pub mod diagnostics;
