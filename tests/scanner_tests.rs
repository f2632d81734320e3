use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::eq;
use serde_json::json;
use std::sync::Arc;

use crypto_consensus_engine::ai::ConsensusEngine;
use crypto_consensus_engine::api::{AnalysisPayload, AnalysisProvider};
use crypto_consensus_engine::core::{ConsensusError, Result};
use crypto_consensus_engine::scanner::ConsensusScanner;
use crypto_consensus_engine::Recommendation;

mock! {
    pub Provider {}

    #[async_trait]
    impl AnalysisProvider for Provider {
        async fn fetch(&self, symbol: &str) -> Result<AnalysisPayload>;
        async fn symbols(&self) -> Result<Vec<String>>;
    }
}

fn payload(value: serde_json::Value) -> AnalysisPayload {
    serde_json::from_value(value).unwrap()
}

fn bullish() -> AnalysisPayload {
    payload(json!({
        "analysis_layers": {
            "1_technical_analysis": {"recommendation": "BUY", "confidence": 80},
            "2_simple_ai": {"recommendation": "BUY", "confidence": 80},
            "3_advanced_ai": {"ensemble_prediction": {"final_decision": "BUY", "confidence": 80}}
        },
        "wyckoff_analysis": {"recommended_action": "BUY", "confidence": 80, "current_phase": "MARKUP"},
        "ultimate_decision": {"final_recommendation": "BUY", "final_confidence": 78}
    }))
}

fn bearish() -> AnalysisPayload {
    payload(json!({
        "analysis_layers": {
            "3_advanced_ai": {"ensemble_prediction": {"final_decision": "SELL", "confidence": 30}}
        },
        "ultimate_decision": {"final_recommendation": "SELL", "final_confidence": 64}
    }))
}

#[tokio::test]
async fn scan_preserves_order_and_skips_failures() {
    let mut provider = MockProvider::new();
    provider
        .expect_fetch()
        .with(eq("BTCUSDT"))
        .returning(|_| Ok(bullish()));
    provider
        .expect_fetch()
        .with(eq("ETHUSDT"))
        .returning(|_| Ok(bearish()));
    provider
        .expect_fetch()
        .with(eq("XRPUSDT"))
        .returning(|s| Err(ConsensusError::SymbolNotFound(s.to_string())));

    let scanner = ConsensusScanner::new(Arc::new(provider), ConsensusEngine::default());
    let symbols: Vec<String> = ["BTCUSDT", "XRPUSDT", "ETHUSDT"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let reports = scanner.scan(&symbols).await;
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0].symbol, "BTCUSDT");
    // 24 + 16 + 32 + 8 = 80
    assert_eq!(reports[0].result.recommendation, Recommendation::StrongBuy);
    let consistency = reports[0].consistency.as_ref().unwrap();
    assert!(!consistency.agrees, "STRONG_BUY vs BUY must disagree");
    assert_eq!(reports[0].result.wyckoff_phase(), Some("MARKUP"));

    assert_eq!(reports[1].symbol, "ETHUSDT");
    // 40 * 0.3 * -1 = -12
    assert_eq!(reports[1].result.recommendation, Recommendation::Sell);
    assert!(reports[1].consistency.as_ref().unwrap().agrees);
    assert!(reports[1].result.partial_data);
    assert!(reports[1]
        .advisories()
        .iter()
        .any(|a| a.starts_with("partial data")));
}

#[tokio::test]
async fn scan_all_uses_provider_symbols() {
    let mut provider = MockProvider::new();
    provider
        .expect_symbols()
        .times(1)
        .returning(|| Ok(vec!["SOLUSDT".to_string()]));
    provider
        .expect_fetch()
        .with(eq("SOLUSDT"))
        .times(1)
        .returning(|_| Ok(AnalysisPayload::default()));

    let scanner = ConsensusScanner::new(Arc::new(provider), ConsensusEngine::default());
    let reports = scanner.scan_all().await.unwrap();

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.result.insufficient_data);
    assert_eq!(report.result.recommendation, Recommendation::Hold);
    assert!(report.consistency.is_none());
    assert!(!report.data_valid);
}

#[test]
fn evaluate_symbol_propagates_fetch_errors() {
    let mut provider = MockProvider::new();
    provider
        .expect_fetch()
        .returning(|s| Err(ConsensusError::SymbolNotFound(s.to_string())));

    let scanner = ConsensusScanner::new(Arc::new(provider), ConsensusEngine::default());
    let err = tokio_test::block_on(scanner.evaluate_symbol("ADAUSDT")).unwrap_err();
    assert!(matches!(err, ConsensusError::SymbolNotFound(ref s) if s == "ADAUSDT"));
}
