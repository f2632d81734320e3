//! Weighted multi-layer consensus.
//!
//! Each present layer contributes `weight * (confidence / 100) * direction`
//! to a signed total score, which is then bucketed into a recommendation
//! and strength tier. Layers that are absent simply contribute nothing:
//! the remaining weights are not rescaled.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::sources::{normalize, SignalSource, SourceId};
use super::weights::WeightTable;
use crate::api::AnalysisPayload;
use crate::strategy::{Recommendation, SignalFamily, Strength};

pub const STRONG_THRESHOLD: f64 = 15.0;
pub const MODERATE_THRESHOLD: f64 = 5.0;

/// Default minimum number of layers for a result not to be flagged partial.
pub const DEFAULT_MIN_SOURCES: usize = 3;

/// Audit row explaining one layer's share of the total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: SourceId,
    pub display_name: String,
    pub label: String,
    pub weight: u32,
    pub confidence: f64,
    pub direction: i8,
    pub contribution: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl Votes {
    pub fn total(&self) -> usize {
        self.buy + self.sell + self.hold
    }
}

/// How the layers lined up behind the classified recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Agreement {
    StrongConsensus,
    LeaningBuy,
    LeaningSell,
    Conflicting,
    NoSignals,
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Agreement::StrongConsensus => write!(f, "Strong consensus"),
            Agreement::LeaningBuy => write!(f, "Leaning buy"),
            Agreement::LeaningSell => write!(f, "Leaning sell"),
            Agreement::Conflicting => write!(f, "Conflicting opinions"),
            Agreement::NoSignals => write!(f, "No signals"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub total_score: f64,
    pub recommendation: Recommendation,
    pub strength: Strength,
    pub votes: Votes,
    pub participating_sources: usize,
    /// `|total_score|`, a display figure rather than a probability.
    pub confidence: f64,
    pub contributions: Vec<Contribution>,
    pub agreement: Agreement,
    pub insufficient_data: bool,
    pub partial_data: bool,
    /// Sources as normalized, including auxiliary data for reporting.
    pub sources: Vec<SignalSource>,
}

impl ConsensusResult {
    pub fn wyckoff_phase(&self) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.id == SourceId::Wyckoff)
            .and_then(|s| s.auxiliary.phase.as_deref())
    }
}

pub fn contribution(source: &SignalSource) -> f64 {
    source.weight as f64 * (source.confidence / 100.0) * source.direction as f64
}

pub fn contributions(sources: &[SignalSource]) -> Vec<Contribution> {
    sources
        .iter()
        .map(|s| Contribution {
            id: s.id,
            display_name: s.display_name.clone(),
            label: s.label.clone(),
            weight: s.weight,
            confidence: s.confidence,
            direction: s.direction,
            contribution: contribution(s),
        })
        .collect()
}

/// Sum of contributions over the present sources; 0 for an empty set.
pub fn aggregate(sources: &[SignalSource]) -> f64 {
    sources.iter().fold(0.0, |total, s| total + contribution(s))
}

/// Buckets a score. Every boundary is exclusive on the upper side of the
/// lower bucket: 15 is BUY, 5 is HOLD, -5 is SELL, -15 is STRONG_SELL.
pub fn classify(total_score: f64) -> (Recommendation, Strength) {
    if total_score > STRONG_THRESHOLD {
        (Recommendation::StrongBuy, Strength::Strong)
    } else if total_score > MODERATE_THRESHOLD {
        (Recommendation::Buy, Strength::Moderate)
    } else if total_score > -MODERATE_THRESHOLD {
        (Recommendation::Hold, Strength::Weak)
    } else if total_score > -STRONG_THRESHOLD {
        (Recommendation::Sell, Strength::Moderate)
    } else {
        (Recommendation::StrongSell, Strength::Strong)
    }
}

pub fn tally(sources: &[SignalSource]) -> Votes {
    sources.iter().fold(Votes::default(), |mut votes, s| {
        match s.family {
            SignalFamily::Buy => votes.buy += 1,
            SignalFamily::Sell => votes.sell += 1,
            SignalFamily::Neutral => votes.hold += 1,
        }
        votes
    })
}

pub fn agreement(recommendation: Recommendation, votes: &Votes) -> Agreement {
    if votes.total() == 0 {
        return Agreement::NoSignals;
    }
    match recommendation.family() {
        SignalFamily::Buy if votes.buy > 1 => Agreement::StrongConsensus,
        SignalFamily::Buy => Agreement::LeaningBuy,
        SignalFamily::Sell if votes.sell > 1 => Agreement::StrongConsensus,
        SignalFamily::Sell => Agreement::LeaningSell,
        SignalFamily::Neutral => Agreement::Conflicting,
    }
}

/// Stateless apart from its immutable configuration; one instance can be
/// shared across threads and symbols.
#[derive(Debug, Clone)]
pub struct ConsensusEngine {
    weights: WeightTable,
    min_sources: usize,
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self::new(WeightTable::default())
    }
}

impl ConsensusEngine {
    pub fn new(weights: WeightTable) -> Self {
        Self {
            weights,
            min_sources: DEFAULT_MIN_SOURCES,
        }
    }

    pub fn with_min_sources(mut self, min_sources: usize) -> Self {
        self.min_sources = min_sources;
        self
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn evaluate(&self, payload: &AnalysisPayload) -> ConsensusResult {
        self.evaluate_sources(normalize(payload, &self.weights))
    }

    pub fn evaluate_sources(&self, sources: Vec<SignalSource>) -> ConsensusResult {
        let total_score = aggregate(&sources);
        let (recommendation, strength) = classify(total_score);
        let votes = tally(&sources);
        let participating_sources = sources.len();
        let insufficient_data = participating_sources == 0;

        if insufficient_data {
            tracing::warn!("⚠️ No analysis layers present; returning HOLD (insufficient data)");
        }

        tracing::debug!(
            "📊 Consensus: score={:.2} -> {} ({}) from {} sources (buy {}, sell {}, hold {})",
            total_score,
            recommendation,
            strength,
            participating_sources,
            votes.buy,
            votes.sell,
            votes.hold
        );

        ConsensusResult {
            total_score,
            recommendation,
            strength,
            votes,
            participating_sources,
            confidence: total_score.abs(),
            contributions: contributions(&sources),
            agreement: agreement(recommendation, &votes),
            insufficient_data,
            partial_data: participating_sources < self.min_sources,
            sources,
        }
    }
}
