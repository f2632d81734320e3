use serde::{Deserialize, Serialize};

use super::sources::SourceId;
use crate::core::{ConsensusError, Result};

/// Percentage share of each analysis layer in the final score.
///
/// Immutable once built; injected into `ConsensusEngine`. Shares of absent
/// layers are dropped, never redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    pub technical: u32,
    pub simple_ai: u32,
    pub advanced_ai: u32,
    pub wyckoff: u32,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            technical: 30,
            simple_ai: 20,
            advanced_ai: 40,
            wyckoff: 10,
        }
    }
}

impl WeightTable {
    pub fn new(technical: u32, simple_ai: u32, advanced_ai: u32, wyckoff: u32) -> Result<Self> {
        let table = Self {
            technical,
            simple_ai,
            advanced_ai,
            wyckoff,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn weight_for(&self, id: SourceId) -> u32 {
        match id {
            SourceId::Technical => self.technical,
            SourceId::SimpleAi => self.simple_ai,
            SourceId::AdvancedAi => self.advanced_ai,
            SourceId::Wyckoff => self.wyckoff,
        }
    }

    pub fn total(&self) -> u32 {
        SourceId::ALL.iter().map(|id| self.weight_for(*id)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for id in SourceId::ALL {
            let weight = self.weight_for(id);
            if weight > 100 {
                return Err(ConsensusError::InvalidWeight {
                    layer: id.as_str().to_string(),
                    weight,
                });
            }
        }
        Ok(())
    }
}
