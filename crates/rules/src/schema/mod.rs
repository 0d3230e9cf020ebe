//! Rule document schema shared by all kinds.

mod document;
mod envelope;
mod kind;
mod metadata;

pub use document::RuleDocument;
pub use envelope::RuleEnvelope;
pub use kind::RuleKind;
pub use metadata::CommonMetadata;
