pub mod consensus_scanner;

pub use consensus_scanner::{ConsensusReport, ConsensusScanner};
