use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::weights::WeightTable;
use crate::api::types::{
    field_number, field_str, AnalysisPayload, ADVANCED_AI_LAYER_KEY, SIMPLE_AI_LAYER_KEY,
    TECHNICAL_LAYER_KEY,
};
use crate::strategy::{Recommendation, SignalFamily};

/// Label assumed when a layer carries no recommendation at all.
pub const DEFAULT_LABEL: &str = "HOLD";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Technical,
    SimpleAi,
    AdvancedAi,
    Wyckoff,
}

impl SourceId {
    /// Canonical evaluation order.
    pub const ALL: [SourceId; 4] = [
        SourceId::Technical,
        SourceId::SimpleAi,
        SourceId::AdvancedAi,
        SourceId::Wyckoff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Technical => "technical",
            SourceId::SimpleAi => "simple_ai",
            SourceId::AdvancedAi => "advanced_ai",
            SourceId::Wyckoff => "wyckoff",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::Technical => "Technical Analysis",
            SourceId::SimpleAi => "Simple AI",
            SourceId::AdvancedAi => "Advanced AI",
            SourceId::Wyckoff => "Wyckoff Analysis",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One verdict from the advanced-AI layer's individual models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVerdict {
    pub model: String,
    pub prediction: Option<String>,
    pub confidence: Option<f64>,
}

/// Layer-specific data carried for reporting. Never scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Auxiliary {
    pub reasoning: Option<String>,
    pub phase: Option<String>,
    pub phase_strength: Option<f64>,
    pub models: Vec<ModelVerdict>,
}

/// What a layer said, before any defaulting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerReading {
    pub label: Option<String>,
    pub confidence: Option<f64>,
    pub auxiliary: Auxiliary,
}

/// Pulls one layer out of the payload, resolving the per-layer key
/// differences. `None` means the layer is absent.
pub fn read_layer(payload: &AnalysisPayload, id: SourceId) -> Option<LayerReading> {
    match id {
        SourceId::Technical => {
            let layer = payload.layer(TECHNICAL_LAYER_KEY)?;
            Some(LayerReading {
                label: field_str(layer, "recommendation")
                    .or_else(|| field_str(layer, "overall_recommendation")),
                confidence: field_number(layer, "confidence"),
                auxiliary: Auxiliary {
                    reasoning: field_str(layer, "reasoning"),
                    ..Auxiliary::default()
                },
            })
        }
        SourceId::SimpleAi => {
            let layer = payload.layer(SIMPLE_AI_LAYER_KEY)?;
            Some(LayerReading {
                label: field_str(layer, "recommendation"),
                confidence: field_number(layer, "confidence"),
                auxiliary: Auxiliary {
                    reasoning: field_str(layer, "reasoning"),
                    ..Auxiliary::default()
                },
            })
        }
        SourceId::AdvancedAi => {
            let layer = payload.layer(ADVANCED_AI_LAYER_KEY)?;
            let models = layer
                .get("individual_models")
                .and_then(Value::as_object)
                .map(read_models)
                .unwrap_or_default();

            let reading = match layer.get("ensemble_prediction").and_then(Value::as_object) {
                Some(prediction) => LayerReading {
                    label: field_str(prediction, "final_decision")
                        .or_else(|| field_str(prediction, "recommendation")),
                    confidence: field_number(prediction, "confidence"),
                    auxiliary: Auxiliary {
                        reasoning: field_str(prediction, "reasoning"),
                        models,
                        ..Auxiliary::default()
                    },
                },
                None => LayerReading {
                    auxiliary: Auxiliary {
                        models,
                        ..Auxiliary::default()
                    },
                    ..LayerReading::default()
                },
            };
            Some(reading)
        }
        SourceId::Wyckoff => {
            let layer = payload.wyckoff()?;
            Some(LayerReading {
                label: field_str(layer, "recommended_action")
                    .or_else(|| field_str(layer, "recommendation")),
                confidence: field_number(layer, "confidence"),
                auxiliary: Auxiliary {
                    reasoning: field_str(layer, "interpretation"),
                    phase: field_str(layer, "current_phase").or_else(|| field_str(layer, "phase")),
                    phase_strength: field_number(layer, "phase_strength"),
                    models: Vec::new(),
                },
            })
        }
    }
}

fn read_models(models: &Map<String, Value>) -> Vec<ModelVerdict> {
    models
        .iter()
        .map(|(name, data)| {
            let data = data.as_object();
            ModelVerdict {
                model: name.clone(),
                prediction: data.and_then(|d| field_str(d, "prediction")),
                confidence: data.and_then(|d| field_number(d, "confidence")),
            }
        })
        .collect()
}

/// Missing or non-finite confidence becomes 0; finite values are clamped
/// into [0, 100].
pub fn sanitize_confidence(raw: Option<f64>) -> f64 {
    match raw {
        Some(value) if value.is_finite() => value.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// One analysis layer's opinion, normalized for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSource {
    pub id: SourceId,
    pub display_name: String,
    pub weight: u32,
    /// Upstream label, trimmed and upper-cased.
    pub label: String,
    /// `None` when the label is not one of the canonical recommendations.
    pub recommendation: Option<Recommendation>,
    pub family: SignalFamily,
    pub direction: i8,
    pub confidence: f64,
    pub auxiliary: Auxiliary,
}

impl SignalSource {
    pub fn new(id: SourceId, weight: u32, label: &str, confidence: f64) -> Self {
        let label = label.trim().to_ascii_uppercase();
        let family = SignalFamily::classify(&label);

        Self {
            id,
            display_name: id.display_name().to_string(),
            weight: weight.min(100),
            recommendation: Recommendation::from_label(&label),
            direction: family.direction(),
            family,
            label,
            confidence: sanitize_confidence(Some(confidence)),
            auxiliary: Auxiliary::default(),
        }
    }

    pub fn with_auxiliary(mut self, auxiliary: Auxiliary) -> Self {
        self.auxiliary = auxiliary;
        self
    }

    fn from_reading(id: SourceId, weight: u32, reading: LayerReading) -> Self {
        let label = reading.label.as_deref().unwrap_or(DEFAULT_LABEL);

        if let Some(raw) = reading.confidence {
            if !(0.0..=100.0).contains(&raw) {
                tracing::warn!(
                    "⚠️ {} confidence {} outside [0, 100]; using {}",
                    id,
                    raw,
                    sanitize_confidence(Some(raw))
                );
            }
        }

        let source = Self::new(id, weight, label, sanitize_confidence(reading.confidence))
            .with_auxiliary(reading.auxiliary);

        if source.recommendation.is_none() {
            if source.family == SignalFamily::Neutral {
                tracing::warn!(
                    "⚠️ Unrecognized {} recommendation '{}', counted as HOLD",
                    id,
                    source.label
                );
            } else {
                tracing::debug!(
                    "Non-canonical {} recommendation '{}' read as {}",
                    id,
                    source.label,
                    source.family
                );
            }
        }

        source
    }
}

/// Builds the source set for one payload, in canonical order. Absent layers
/// are skipped without a placeholder.
pub fn normalize(payload: &AnalysisPayload, weights: &WeightTable) -> Vec<SignalSource> {
    SourceId::ALL
        .iter()
        .filter_map(|&id| {
            read_layer(payload, id)
                .map(|reading| SignalSource::from_reading(id, weights.weight_for(id), reading))
        })
        .collect()
}
