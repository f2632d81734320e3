pub mod reporter;
pub mod verification;

pub use reporter::ConsensusReporter;
pub use verification::{ConsistencyChecker, ConsistencyReport};
