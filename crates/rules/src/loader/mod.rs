//! Filesystem rule loader.
//!
//! Scans the rules directory for YAML files and loads every supported kind
//! via two-pass deserialization (RuleEnvelope -> RuleDocument).

mod core;
mod error;


pub use self::core::RuleLoader;
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
