use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai::{ConsensusEngine, ConsensusResult};
use crate::api::{AnalysisPayload, AnalysisProvider};
use crate::core::integration::{DataQualityManager, QualityCheck, QualityLevel};
use crate::core::{ConsensusError, Result};
use crate::monitoring::{ConsistencyChecker, ConsistencyReport};

/// Everything computed for one symbol in one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusReport {
    pub symbol: String,
    pub evaluated_at: DateTime<Utc>,
    pub result: ConsensusResult,
    /// `None` when the payload carried no reference decision.
    pub consistency: Option<ConsistencyReport>,
    pub quality_checks: Vec<QualityCheck>,
    pub data_valid: bool,
    pub quality_score: f64,
}

impl ConsensusReport {
    /// Normalize, aggregate, classify, tally, then cross-check, in that
    /// order. Validation and the cross-check never change `result`.
    pub fn build(
        symbol: &str,
        payload: &AnalysisPayload,
        engine: &ConsensusEngine,
        checker: &ConsistencyChecker,
        quality: &DataQualityManager,
    ) -> Self {
        let quality_checks = quality.validate(payload);
        let data_valid = quality.is_valid(&quality_checks);
        let quality_score = quality.get_overall_score(&quality_checks);

        if !data_valid {
            tracing::warn!(
                "⚠️ {} payload failed data-quality checks (score {:.0}%)",
                symbol,
                quality_score * 100.0
            );
        }

        let result = engine.evaluate(payload);
        let consistency = payload
            .reference()
            .map(|reference| checker.check(&result, &reference));

        Self {
            symbol: symbol.to_string(),
            evaluated_at: Utc::now(),
            result,
            consistency,
            quality_checks,
            data_valid,
            quality_score,
        }
    }

    pub fn advisories(&self) -> Vec<String> {
        let mut advisories = Vec::new();

        if self.result.insufficient_data {
            advisories.push("insufficient data: no analysis layers present".to_string());
        } else if self.result.partial_data {
            advisories.push(format!(
                "partial data: only {} analysis layers present; results may be less reliable",
                self.result.participating_sources
            ));
        }

        if let Some(note) = self.consistency.as_ref().and_then(|c| c.note.as_ref()) {
            advisories.push(note.clone());
        }

        advisories.extend(
            self.quality_checks
                .iter()
                .filter(|c| !c.passed && c.level != QualityLevel::Optional)
                .map(|c| c.message.clone()),
        );

        advisories
    }
}

pub struct ConsensusScanner {
    provider: Arc<dyn AnalysisProvider>,
    engine: Arc<ConsensusEngine>,
    checker: ConsistencyChecker,
    quality: Arc<DataQualityManager>,
}

impl ConsensusScanner {
    pub fn new(provider: Arc<dyn AnalysisProvider>, engine: ConsensusEngine) -> Self {
        Self {
            provider,
            engine: Arc::new(engine),
            checker: ConsistencyChecker::new(),
            quality: Arc::new(DataQualityManager::new()),
        }
    }

    pub async fn evaluate_symbol(&self, symbol: &str) -> Result<ConsensusReport> {
        let payload = self.provider.fetch(symbol).await?;
        Ok(ConsensusReport::build(
            symbol,
            &payload,
            &self.engine,
            &self.checker,
            &self.quality,
        ))
    }

    /// Every symbol the provider knows about.
    pub async fn scan_all(&self) -> Result<Vec<ConsensusReport>> {
        let symbols = self.provider.symbols().await?;
        Ok(self.scan(&symbols).await)
    }

    /// Evaluates symbols on independent tasks. Failed symbols are logged and
    /// left out; the rest come back in input order.
    pub async fn scan(&self, symbols: &[String]) -> Vec<ConsensusReport> {
        tracing::info!("🔍 Evaluating consensus for {} symbols", symbols.len());

        let handles = symbols.iter().map(|symbol| {
            let task_symbol = symbol.clone();
            let provider = self.provider.clone();
            let engine = self.engine.clone();
            let quality = self.quality.clone();
            let checker = self.checker;

            let handle = tokio::spawn(async move {
                let payload = provider.fetch(&task_symbol).await?;
                Ok::<_, ConsensusError>(ConsensusReport::build(
                    &task_symbol,
                    &payload,
                    &engine,
                    &checker,
                    &quality,
                ))
            });
            async move { (symbol, handle.await) }
        });

        let mut reports = Vec::with_capacity(symbols.len());
        for (symbol, outcome) in join_all(handles).await {
            match outcome {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => tracing::warn!("Failed to evaluate {}: {}", symbol, e),
                Err(e) => {
                    let err = ConsensusError::Task {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    };
                    tracing::error!("❌ {}", err);
                }
            }
        }

        tracing::info!("✅ Consensus computed for {}/{} symbols", reports.len(), symbols.len());
        reports
    }
}
