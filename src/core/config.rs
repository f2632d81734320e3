use config::{Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use super::error::{ConsensusError, Result};
use crate::ai::WeightTable;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub weights: WeightTable,
    pub engine: EngineConfig,
    pub scanner: ScannerConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Below this many participating layers a result is flagged as partial.
    pub min_sources: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    pub payload_dir: PathBuf,
    /// Empty means every payload file found in `payload_dir`.
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub output: OutputFormat,
}

impl Config {
    /// Loads `.env`, then `consensus.toml` (optional), then `CONSENSUS_*`
    /// variables, e.g. `CONSENSUS_WEIGHTS__ADVANCED_AI=40`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load(Some("consensus"))
    }

    pub fn load(file: Option<&str>) -> Result<Self> {
        Self::load_from(file, None)
    }

    /// Like `load`, but reads `CONSENSUS_*` keys from `env` instead of the
    /// process environment when given.
    pub fn load_from(
        file: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("weights.technical", 30_i64)?
            .set_default("weights.simple_ai", 20_i64)?
            .set_default("weights.advanced_ai", 40_i64)?
            .set_default("weights.wyckoff", 10_i64)?
            .set_default("engine.min_sources", 3_i64)?
            .set_default("scanner.payload_dir", "./payloads")?
            .set_default("scanner.symbols", Vec::<String>::new())?
            .set_default("monitoring.log_level", "info")?
            .set_default("monitoring.output", "text")?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let config: Config = builder
            .add_source(
                Environment::with_prefix("CONSENSUS")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("scanner.symbols")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.weights.validate()?;

        if self.engine.min_sources > crate::ai::SourceId::ALL.len() {
            return Err(ConsensusError::InvalidSetting(format!(
                "engine.min_sources = {} exceeds the {} known layers",
                self.engine.min_sources,
                crate::ai::SourceId::ALL.len()
            )));
        }

        if self.weights.total() != 100 {
            tracing::warn!(
                "⚠️ Layer weights sum to {}% (not 100%); scores are not renormalized",
                self.weights.total()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_match_canonical_weights() {
        let config = Config::load_from(None, env(&[])).unwrap();
        assert_eq!(config.weights, WeightTable::default());
        assert_eq!(config.engine.min_sources, 3);
        assert_eq!(config.monitoring.output, OutputFormat::Text);
        assert!(config.scanner.symbols.is_empty());
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::load_from(
            None,
            env(&[
                ("CONSENSUS_WEIGHTS__ADVANCED_AI", "55"),
                ("CONSENSUS_ENGINE__MIN_SOURCES", "2"),
                ("CONSENSUS_SCANNER__SYMBOLS", "BTCUSDT,ETHUSDT"),
                ("CONSENSUS_MONITORING__OUTPUT", "json"),
                ("OTHER_WEIGHTS__TECHNICAL", "99"),
            ]),
        )
        .unwrap();

        assert_eq!(config.weights.advanced_ai, 55);
        assert_eq!(config.weights.technical, 30);
        assert_eq!(config.engine.min_sources, 2);
        assert_eq!(config.scanner.symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(config.monitoring.output, OutputFormat::Json);
    }

    #[test]
    fn test_rejects_weight_above_100() {
        let err = Config::load_from(None, env(&[("CONSENSUS_WEIGHTS__WYCKOFF", "150")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConsensusError::InvalidWeight { ref layer, weight: 150 } if layer == "wyckoff"
        ));
    }

    #[test]
    fn test_rejects_min_sources_above_layer_count() {
        let err = Config::load_from(None, env(&[("CONSENSUS_ENGINE__MIN_SOURCES", "5")]))
            .unwrap_err();
        assert!(matches!(err, ConsensusError::InvalidSetting(_)));
    }

    #[test]
    fn test_malformed_value_is_config_error() {
        let err = Config::load_from(None, env(&[("CONSENSUS_MONITORING__OUTPUT", "yaml")]))
            .unwrap_err();
        assert!(matches!(err, ConsensusError::Config(_)));
    }
}
