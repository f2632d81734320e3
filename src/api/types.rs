use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::{ConsensusError, Result};

pub const TECHNICAL_LAYER_KEY: &str = "1_technical_analysis";
pub const SIMPLE_AI_LAYER_KEY: &str = "2_simple_ai";
pub const ADVANCED_AI_LAYER_KEY: &str = "3_advanced_ai";
pub const WYCKOFF_LAYER_KEY: &str = "4_wyckoff_analysis";

/// One symbol's analysis as delivered by the upstream analysis service.
///
/// Layer bodies stay as raw JSON; the normalization step in
/// `ai::sources` is the only place that interprets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub analysis_layers: Option<Map<String, Value>>,
    #[serde(default)]
    pub wyckoff_analysis: Option<Value>,
    #[serde(default)]
    pub ultimate_decision: Option<Value>,
}

/// The upstream service's own combined decision, used only for the
/// consistency check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDecision {
    pub final_recommendation: Option<String>,
    pub final_confidence: Option<f64>,
    pub reasoning: Option<String>,
}

impl AnalysisPayload {
    pub fn from_json(symbol: &str, raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|source| ConsensusError::Payload {
            symbol: symbol.to_string(),
            source,
        })
    }

    /// A usable layer object, or `None` when the key is absent, not an
    /// object, or one of the backend's `{"error": ..}` / `{"disabled": true}`
    /// placeholders.
    pub fn layer(&self, key: &str) -> Option<&Map<String, Value>> {
        self.analysis_layers
            .as_ref()
            .and_then(|layers| layers.get(key))
            .and_then(usable_object)
    }

    /// Wyckoff output lives at the top level in newer payloads and under
    /// `analysis_layers` in older ones.
    pub fn wyckoff(&self) -> Option<&Map<String, Value>> {
        self.wyckoff_analysis
            .as_ref()
            .and_then(usable_object)
            .or_else(|| self.layer(WYCKOFF_LAYER_KEY))
    }

    pub fn reference(&self) -> Option<ReferenceDecision> {
        let decision = self.ultimate_decision.as_ref()?.as_object()?;

        Some(ReferenceDecision {
            final_recommendation: field_str(decision, "final_recommendation"),
            final_confidence: field_number(decision, "final_confidence"),
            reasoning: field_str(decision, "reasoning"),
        })
    }
}

/// Reads a field of the wrong JSON type as absent so the rest of the payload
/// still gets scored.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn usable_object(value: &Value) -> Option<&Map<String, Value>> {
    let object = value.as_object()?;
    let disabled = object.get("disabled").and_then(Value::as_bool).unwrap_or(false);
    if disabled || object.contains_key("error") {
        return None;
    }
    Some(object)
}

/// Non-empty string field.
pub(crate) fn field_str(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Numeric field; numeric strings are accepted, anything else is `None`.
pub(crate) fn field_number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrongly_typed_fields_do_not_drop_payload() {
        let payload = AnalysisPayload::from_json(
            "XRPUSDT",
            r#"{"symbol": 7, "analysis_layers": [],
                "wyckoff_analysis": {"recommended_action": "BUY", "confidence": 90}}"#,
        )
        .unwrap();

        assert!(payload.symbol.is_none());
        assert!(payload.analysis_layers.is_none());
        assert!(payload.layer(TECHNICAL_LAYER_KEY).is_none());
        let wyckoff = payload.wyckoff().unwrap();
        assert_eq!(field_str(wyckoff, "recommended_action").as_deref(), Some("BUY"));
        assert_eq!(field_number(wyckoff, "confidence"), Some(90.0));

        let payload =
            AnalysisPayload::from_json("XRPUSDT", r#"{"analysis_layers": "unavailable"}"#).unwrap();
        assert!(payload.analysis_layers.is_none());
    }

    #[test]
    fn test_placeholder_layers_are_absent() {
        let payload: AnalysisPayload = serde_json::from_value(json!({
            "analysis_layers": {
                "1_technical_analysis": {"recommendation": "BUY", "confidence": 70},
                "2_simple_ai": {"error": "model not trained"},
                "3_advanced_ai": "unavailable",
                "4_wyckoff_analysis": {"disabled": true}
            }
        }))
        .unwrap();

        assert!(payload.layer(TECHNICAL_LAYER_KEY).is_some());
        assert!(payload.layer(SIMPLE_AI_LAYER_KEY).is_none());
        assert!(payload.layer(ADVANCED_AI_LAYER_KEY).is_none());
        assert!(payload.wyckoff().is_none());
    }

    #[test]
    fn test_wyckoff_prefers_top_level() {
        let payload: AnalysisPayload = serde_json::from_value(json!({
            "analysis_layers": {
                "4_wyckoff_analysis": {"recommended_action": "SELL"}
            },
            "wyckoff_analysis": {"recommended_action": "BUY"}
        }))
        .unwrap();

        let wyckoff = payload.wyckoff().unwrap();
        assert_eq!(field_str(wyckoff, "recommended_action").as_deref(), Some("BUY"));
    }

    #[test]
    fn test_reference_decision_is_lenient() {
        let payload: AnalysisPayload = serde_json::from_value(json!({
            "ultimate_decision": {
                "final_recommendation": "STRONG_BUY",
                "final_confidence": "81.5"
            }
        }))
        .unwrap();

        let reference = payload.reference().unwrap();
        assert_eq!(reference.final_recommendation.as_deref(), Some("STRONG_BUY"));
        assert_eq!(reference.final_confidence, Some(81.5));
        assert_eq!(reference.reasoning, None);
    }

    #[test]
    fn test_malformed_json_reports_symbol() {
        let err = AnalysisPayload::from_json("BTCUSDT", "{not json").unwrap_err();
        assert!(err.to_string().contains("BTCUSDT"));
    }
}
