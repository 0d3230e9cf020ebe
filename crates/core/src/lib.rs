pub mod benchmark;
pub mod config;
pub mod error;
pub mod metrics;

pub use benchmark::*;
pub use config::Config;
pub use error::*;
pub use metrics::*;
