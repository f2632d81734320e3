use anyhow::{Context, Result};
use std::sync::Arc;

use crypto_consensus_engine::ai::ConsensusEngine;
use crypto_consensus_engine::api::FileAnalysisProvider;
use crypto_consensus_engine::core::logging::init_logging;
use crypto_consensus_engine::core::{Config, OutputFormat};
use crypto_consensus_engine::monitoring::ConsensusReporter;
use crypto_consensus_engine::scanner::ConsensusScanner;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;

    // Initialize logging
    init_logging(&config.monitoring.log_level);

    tracing::info!("🚀 Consensus engine starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Weights: technical={}% simple_ai={}% advanced_ai={}% wyckoff={}%",
        config.weights.technical,
        config.weights.simple_ai,
        config.weights.advanced_ai,
        config.weights.wyckoff
    );

    let provider = Arc::new(FileAnalysisProvider::new(&config.scanner.payload_dir));
    let engine = ConsensusEngine::new(config.weights).with_min_sources(config.engine.min_sources);
    let scanner = ConsensusScanner::new(provider, engine);

    let reports = if config.scanner.symbols.is_empty() {
        scanner.scan_all().await.with_context(|| {
            format!(
                "failed to list payloads in {}",
                config.scanner.payload_dir.display()
            )
        })?
    } else {
        scanner.scan(&config.scanner.symbols).await
    };

    match config.monitoring.output {
        OutputFormat::Json => println!("{}", ConsensusReporter::to_json(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                print!("{}", ConsensusReporter::format_report(report));
            }
        }
    }

    let diverging = reports
        .iter()
        .filter(|r| r.consistency.as_ref().is_some_and(|c| !c.agrees))
        .count();
    tracing::info!(
        "✅ Done: {} reports, {} diverging from reference",
        reports.len(),
        diverging
    );

    Ok(())
}
