pub mod provider;
pub mod types;

pub use provider::{AnalysisProvider, FileAnalysisProvider};
pub use types::{AnalysisPayload, ReferenceDecision};
