use crate::ai::SourceId;
use crate::core::Result;
use crate::scanner::ConsensusReport;
use crate::strategy::SignalFamily;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

pub struct ConsensusReporter;

impl ConsensusReporter {
    pub fn format_report(report: &ConsensusReport) -> String {
        let result = &report.result;
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!("║  CONSENSUS: {:<57}║\n", report.symbol));
        output.push_str("╚══════════════════════════════════════════════════════════════════════╝\n\n");

        output.push_str(&format!(
            "{} {} ({}) | score {:+.2} | confidence {:.1}%\n",
            family_badge(result.recommendation.family()),
            result.recommendation,
            result.strength,
            result.total_score,
            result.confidence
        ));
        output.push_str(&format!(
            "🗳️  {} from {} sources (buy {} | sell {} | hold {})\n\n",
            result.agreement,
            result.participating_sources,
            result.votes.buy,
            result.votes.sell,
            result.votes.hold
        ));

        if !result.contributions.is_empty() {
            output.push_str("📐 Contributions (weight × confidence × direction):\n");
            for c in &result.contributions {
                output.push_str(&format!(
                    "   • {:<20} {:>3}% × {:>5.1}% × {:+} = {:+7.2}  [{}]\n",
                    c.display_name, c.weight, c.confidence, c.direction, c.contribution, c.label
                ));
            }
            output.push('\n');
        }

        if let Some(phase) = result.wyckoff_phase() {
            let strength = result
                .sources
                .iter()
                .find(|s| s.id == SourceId::Wyckoff)
                .and_then(|s| s.auxiliary.phase_strength);
            match strength {
                Some(strength) => {
                    output.push_str(&format!("📈 Wyckoff phase: {} ({:.0}%)\n\n", phase, strength))
                }
                None => output.push_str(&format!("📈 Wyckoff phase: {}\n\n", phase)),
            }
        }

        if let Some(consistency) = &report.consistency {
            output.push_str(&format!(
                "🔁 Reference: {} ({}) → {}\n\n",
                consistency.reference_recommendation.as_deref().unwrap_or("N/A"),
                consistency
                    .reference_confidence
                    .map(|c| format!("{:.1}%", c))
                    .unwrap_or_else(|| "N/A".to_string()),
                if consistency.agrees { "✅ agrees" } else { "❌ diverges" }
            ));
        }

        let advisories = report.advisories();
        if !advisories.is_empty() {
            output.push_str("⚠️  ADVISORIES:\n");
            for advisory in &advisories {
                output.push_str(&format!("   • {}\n", advisory));
            }
            output.push('\n');
        }

        output.push_str(RULE);
        output
    }

    pub fn to_json(reports: &[ConsensusReport]) -> Result<String> {
        Ok(serde_json::to_string_pretty(reports)?)
    }
}

fn family_badge(family: SignalFamily) -> &'static str {
    match family {
        SignalFamily::Buy => "🟢",
        SignalFamily::Sell => "🔴",
        SignalFamily::Neutral => "🟡",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ConsensusEngine;
    use crate::api::AnalysisPayload;
    use crate::core::integration::DataQualityManager;
    use crate::monitoring::ConsistencyChecker;
    use serde_json::json;

    fn report(value: serde_json::Value) -> ConsensusReport {
        let payload: AnalysisPayload = serde_json::from_value(value).unwrap();
        ConsensusReport::build(
            "BTCUSDT",
            &payload,
            &ConsensusEngine::default(),
            &ConsistencyChecker::new(),
            &DataQualityManager::new(),
        )
    }

    #[test]
    fn test_text_report_contents() {
        let report = report(json!({
            "analysis_layers": {
                "3_advanced_ai": {"ensemble_prediction": {"final_decision": "BUY", "confidence": 80}}
            },
            "wyckoff_analysis": {"recommended_action": "BUY", "confidence": 60, "current_phase": "MARKUP", "phase_strength": 70},
            "ultimate_decision": {"final_recommendation": "HOLD", "final_confidence": 55}
        }));

        let text = ConsensusReporter::format_report(&report);
        assert!(text.contains("BTCUSDT"));
        assert!(text.contains("STRONG_BUY"));
        assert!(text.contains("Wyckoff phase: MARKUP (70%)"));
        assert!(text.contains("❌ diverges"));
        assert!(text.contains("partial data"));
    }

    #[test]
    fn test_json_report_labels() {
        let report = report(json!({}));
        let json = ConsensusReporter::to_json(&[report]).unwrap();
        assert!(json.contains("\"recommendation\": \"HOLD\""));
        assert!(json.contains("\"insufficient_data\": true"));
    }
}
