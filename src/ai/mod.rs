pub mod consensus;
pub mod sources;
pub mod weights;

pub use consensus::{Agreement, Contribution, ConsensusEngine, ConsensusResult, Votes};
pub use sources::{normalize, Auxiliary, ModelVerdict, SignalSource, SourceId};
pub use weights::WeightTable;
