use serde::{Deserialize, Serialize};

use crate::ai::ConsensusResult;
use crate::api::ReferenceDecision;

pub const DIVERGENCE_NOTE: &str =
    "locally computed consensus diverges from reference decision; review aggregation weights";
pub const MISSING_REFERENCE_LABEL_NOTE: &str =
    "reference decision carries no recommendation; consistency cannot be confirmed";

/// Outcome of comparing the local consensus with the upstream decision.
/// Purely advisory: the local result is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub agrees: bool,
    pub note: Option<String>,
    pub local_recommendation: String,
    pub reference_recommendation: Option<String>,
    pub local_confidence: f64,
    pub reference_confidence: Option<f64>,
    pub confidence_gap: Option<f64>,
    pub reference_reasoning: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyChecker;

impl ConsistencyChecker {
    pub fn new() -> Self {
        Self
    }

    /// Exact label comparison: STRONG_BUY against BUY is a disagreement.
    /// Case and surrounding whitespace of the reference label are ignored.
    pub fn check(&self, local: &ConsensusResult, reference: &ReferenceDecision) -> ConsistencyReport {
        let local_label = local.recommendation.as_str();
        let reference_label = reference
            .final_recommendation
            .as_deref()
            .map(|label| label.trim().to_ascii_uppercase());

        let (agrees, note) = match reference_label.as_deref() {
            Some(label) if label == local_label => (true, None),
            Some(label) => {
                tracing::warn!(
                    "⚠️ Consensus divergence: local {} vs reference {}",
                    local_label,
                    label
                );
                (false, Some(DIVERGENCE_NOTE.to_string()))
            }
            None => {
                tracing::warn!("⚠️ Reference decision has no recommendation to compare against");
                (false, Some(MISSING_REFERENCE_LABEL_NOTE.to_string()))
            }
        };

        ConsistencyReport {
            agrees,
            note,
            local_recommendation: local_label.to_string(),
            reference_recommendation: reference_label,
            local_confidence: local.confidence,
            reference_confidence: reference.final_confidence,
            confidence_gap: reference
                .final_confidence
                .map(|conf| (local.confidence - conf).abs()),
            reference_reasoning: reference.reasoning.clone(),
        }
    }
}
