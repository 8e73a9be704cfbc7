//! Runtime module: server lifecycle and panic-safe blocking work.

pub mod blocking;
pub mod boot;
pub mod serve;
pub mod stop;
pub mod tls;
