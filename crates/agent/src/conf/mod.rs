//! Conf module: configuration model, loading and TLS.

pub mod model;
pub mod load;
pub mod tls;

pub use model::{AgentConfig, SearchConfig};
