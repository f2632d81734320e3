//! Multi-signal consensus engine
//!
//! Combines technical, simple-AI, advanced-AI and Wyckoff analysis layers
//! into one weighted recommendation for a crypto-asset symbol.

pub mod ai;
pub mod api;
pub mod core;
pub mod monitoring;
pub mod scanner;
pub mod strategy;

pub use crate::ai::{ConsensusEngine, ConsensusResult, SignalSource, SourceId, WeightTable};
pub use crate::api::{AnalysisPayload, ReferenceDecision};
pub use crate::core::ConsensusError;
pub use crate::strategy::{Recommendation, SignalFamily, Strength};
