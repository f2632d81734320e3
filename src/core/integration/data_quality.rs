use serde::{Deserialize, Serialize};

use crate::ai::sources::{read_layer, LayerReading};
use crate::ai::SourceId;
use crate::api::AnalysisPayload;
use crate::strategy::{Recommendation, SignalFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityLevel {
    Critical,   // MUST pass
    Important,  // SHOULD pass
    Optional,   // CAN fail
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub name: String,
    pub level: QualityLevel,
    pub passed: bool,
    pub message: String,
    pub score: f64,
}

impl QualityCheck {
    fn new(name: impl Into<String>, level: QualityLevel, passed: bool, message: String) -> Self {
        Self {
            name: name.into(),
            level,
            passed,
            message,
            score: if passed { 1.0 } else { 0.0 },
        }
    }
}

/// Structural checks on an analysis payload. Diagnostic only: a failing
/// payload is still aggregated.
pub struct DataQualityManager {
    min_important_pass_rate: f64,
}

impl Default for DataQualityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DataQualityManager {
    pub fn new() -> Self {
        Self {
            min_important_pass_rate: 0.8,
        }
    }

    pub fn validate(&self, payload: &AnalysisPayload) -> Vec<QualityCheck> {
        let mut checks = Vec::new();
        let readings: Vec<(SourceId, Option<LayerReading>)> = SourceId::ALL
            .iter()
            .map(|&id| (id, read_layer(payload, id)))
            .collect();

        // CRITICAL CHECKS
        checks.push(self.check_any_layer_present(&readings));

        for (id, reading) in &readings {
            match reading {
                Some(reading) => {
                    // IMPORTANT CHECKS
                    checks.push(self.check_recommendation_present(*id, reading));
                    checks.push(self.check_confidence_present(*id, reading));
                    if let Some(label) = &reading.label {
                        checks.push(self.check_label_recognized(*id, label));
                    }
                    if let Some(confidence) = reading.confidence {
                        checks.push(self.check_confidence_range(*id, confidence));
                    }

                    // OPTIONAL CHECKS
                    checks.push(self.check_reasoning_present(*id, reading));
                    if *id == SourceId::Wyckoff {
                        checks.push(self.check_phase_present(reading));
                    }
                }
                None => checks.push(QualityCheck::new(
                    format!("{} layer", id),
                    QualityLevel::Optional,
                    false,
                    format!("{} layer missing or disabled", id.display_name()),
                )),
            }
        }

        checks.push(self.check_reference_decision(payload));

        checks
    }

    pub fn is_valid(&self, checks: &[QualityCheck]) -> bool {
        let critical_pass = checks
            .iter()
            .filter(|c| c.level == QualityLevel::Critical)
            .all(|c| c.passed);

        if !critical_pass {
            return false;
        }

        let important_checks: Vec<_> = checks
            .iter()
            .filter(|c| c.level == QualityLevel::Important)
            .collect();

        if !important_checks.is_empty() {
            let important_pass_rate = important_checks.iter().filter(|c| c.passed).count() as f64
                / important_checks.len() as f64;

            if important_pass_rate < self.min_important_pass_rate {
                return false;
            }
        }

        true
    }

    pub fn get_overall_score(&self, checks: &[QualityCheck]) -> f64 {
        if checks.is_empty() {
            return 0.0;
        }

        let total_score: f64 = checks.iter().map(|c| c.score).sum();
        total_score / checks.len() as f64
    }

    fn check_any_layer_present(&self, readings: &[(SourceId, Option<LayerReading>)]) -> QualityCheck {
        let present = readings.iter().filter(|(_, r)| r.is_some()).count();

        QualityCheck::new(
            "Analysis Layers",
            QualityLevel::Critical,
            present > 0,
            if present > 0 {
                format!("{}/{} layers present", present, readings.len())
            } else {
                "All analysis layers missing".to_string()
            },
        )
    }

    fn check_recommendation_present(&self, id: SourceId, reading: &LayerReading) -> QualityCheck {
        let passed = reading.label.is_some();

        QualityCheck::new(
            format!("{} recommendation", id),
            QualityLevel::Important,
            passed,
            if passed {
                format!("{} recommendation present", id.display_name())
            } else {
                format!("{} recommendation missing (assumed HOLD)", id.display_name())
            },
        )
    }

    fn check_confidence_present(&self, id: SourceId, reading: &LayerReading) -> QualityCheck {
        let passed = reading.confidence.is_some();

        QualityCheck::new(
            format!("{} confidence", id),
            QualityLevel::Important,
            passed,
            if passed {
                format!("{} confidence present", id.display_name())
            } else {
                format!("{} confidence missing or non-numeric (assumed 0)", id.display_name())
            },
        )
    }

    fn check_label_recognized(&self, id: SourceId, label: &str) -> QualityCheck {
        let recognized = Recommendation::from_label(label).is_some();
        // Non-canonical labels that still read as buy/sell are scored normally.
        let passed = recognized || SignalFamily::classify(label) != SignalFamily::Neutral;

        QualityCheck::new(
            format!("{} label", id),
            QualityLevel::Important,
            passed,
            if recognized {
                format!("Label '{}' recognized", label)
            } else if passed {
                format!("Non-canonical label '{}' read as {}", label, SignalFamily::classify(label))
            } else {
                format!("Unrecognized label '{}' counted as HOLD", label)
            },
        )
    }

    fn check_confidence_range(&self, id: SourceId, confidence: f64) -> QualityCheck {
        let passed = confidence.is_finite() && (0.0..=100.0).contains(&confidence);

        QualityCheck::new(
            format!("{} confidence range", id),
            QualityLevel::Important,
            passed,
            format!("Confidence: {}", confidence),
        )
    }

    fn check_reasoning_present(&self, id: SourceId, reading: &LayerReading) -> QualityCheck {
        let passed = reading.auxiliary.reasoning.is_some();

        QualityCheck::new(
            format!("{} reasoning", id),
            QualityLevel::Optional,
            passed,
            if passed {
                "Reasoning provided".to_string()
            } else {
                format!("{} reasoning missing", id.display_name())
            },
        )
    }

    fn check_phase_present(&self, reading: &LayerReading) -> QualityCheck {
        let phase = reading.auxiliary.phase.as_deref();

        QualityCheck::new(
            "wyckoff phase",
            QualityLevel::Optional,
            phase.is_some(),
            match phase {
                Some(phase) => format!("Current phase: {}", phase),
                None => "Wyckoff current phase missing".to_string(),
            },
        )
    }

    fn check_reference_decision(&self, payload: &AnalysisPayload) -> QualityCheck {
        let (passed, message) = match payload.reference() {
            None => (false, "Reference decision section missing".to_string()),
            Some(reference) => match (reference.final_recommendation, reference.final_confidence) {
                (None, _) => (false, "Reference recommendation missing".to_string()),
                (Some(_), Some(conf)) if (0.0..=100.0).contains(&conf) => {
                    (true, format!("Reference decision present ({:.1}%)", conf))
                }
                (Some(_), _) => (false, "Reference confidence missing or out of range".to_string()),
            },
        };

        QualityCheck::new("Reference Decision", QualityLevel::Important, passed, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> AnalysisPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_complete_payload_is_valid() {
        let payload = payload(json!({
            "analysis_layers": {
                "1_technical_analysis": {"recommendation": "BUY", "confidence": 70, "reasoning": "MACD cross"},
                "2_simple_ai": {"recommendation": "HOLD", "confidence": 55, "reasoning": "flat"},
                "3_advanced_ai": {"ensemble_prediction": {"final_decision": "BUY", "confidence": 80, "reasoning": "ensemble"}}
            },
            "wyckoff_analysis": {"recommended_action": "BUY", "confidence": 60, "current_phase": "MARKUP", "interpretation": "markup"},
            "ultimate_decision": {"final_recommendation": "BUY", "final_confidence": 72.4}
        }));

        let manager = DataQualityManager::new();
        let checks = manager.validate(&payload);
        assert!(checks.iter().all(|c| c.passed), "{:?}", checks);
        assert!(manager.is_valid(&checks));
        assert_eq!(manager.get_overall_score(&checks), 1.0);
    }

    #[test]
    fn test_empty_payload_fails_critical() {
        let manager = DataQualityManager::new();
        let checks = manager.validate(&AnalysisPayload::default());
        assert!(!manager.is_valid(&checks));

        let critical = checks
            .iter()
            .find(|c| c.level == QualityLevel::Critical)
            .unwrap();
        assert!(!critical.passed);
    }

    #[test]
    fn test_missing_fields_are_flagged_not_fatal() {
        let payload = payload(json!({
            "analysis_layers": {
                "1_technical_analysis": {"recommendation": "MAYBE"},
                "3_advanced_ai": {}
            }
        }));

        let manager = DataQualityManager::new();
        let checks = manager.validate(&payload);
        let failed: Vec<_> = checks.iter().filter(|c| !c.passed).map(|c| c.name.as_str()).collect();

        assert!(failed.contains(&"technical confidence"));
        assert!(failed.contains(&"technical label"));
        assert!(failed.contains(&"advanced_ai recommendation"));
        assert!(failed.contains(&"simple_ai layer"));
        assert!(failed.contains(&"Reference Decision"));
        assert!(!manager.is_valid(&checks));
    }
}
