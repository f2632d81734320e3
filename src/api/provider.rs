use async_trait::async_trait;
use std::path::PathBuf;

use super::types::AnalysisPayload;
use crate::core::{ConsensusError, Result};

/// Source of per-symbol analysis payloads (the upstream analysis service).
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<AnalysisPayload>;

    async fn symbols(&self) -> Result<Vec<String>>;
}

/// Reads `<dir>/<SYMBOL>.json` files, e.g. snapshots saved from the
/// analysis backend.
pub struct FileAnalysisProvider {
    dir: PathBuf,
}

impl FileAnalysisProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol))
    }
}

#[async_trait]
impl AnalysisProvider for FileAnalysisProvider {
    async fn fetch(&self, symbol: &str) -> Result<AnalysisPayload> {
        let path = self.path_for(symbol);

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConsensusError::SymbolNotFound(symbol.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("📥 Loaded payload for {} from {}", symbol, path.display());

        let mut payload = AnalysisPayload::from_json(symbol, &raw)?;
        if payload.symbol.is_none() {
            payload.symbol = Some(symbol.to_string());
        }
        Ok(payload)
    }

    async fn symbols(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut symbols = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
