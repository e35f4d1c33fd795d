use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cards::DECK_SIZE;
use crate::ledger::types::PlayerId;

/// Engine-wide settings shared by every table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cards are drawn uniformly from `0..deck_size`.
    pub deck_size: u8,
    pub board_size: usize,
    /// Seeds the reveal-key generator. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
    /// Identity granted dealer privileges at startup.
    pub dealer: PlayerId,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deck_size: DECK_SIZE,
            board_size: 5,
            rng_seed: None,
            dealer: 0,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse engine config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.deck_size > 0 && self.deck_size <= DECK_SIZE,
            "deck_size must be in 1..={DECK_SIZE}"
        );
        anyhow::ensure!(self.board_size == 5, "board_size must be 5");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serde::assert_round_trip_eq;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"rng_seed": 42}"#).unwrap();
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.deck_size, DECK_SIZE);
        assert_eq!(config.board_size, 5);
        assert_round_trip_eq(&config);
    }

    #[test]
    fn load_reads_and_validates_a_file() {
        let dir = std::env::temp_dir().join(format!("veiled-poker-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{"dealer": 9, "rng_seed": 1}"#).unwrap();
        let config = EngineConfig::load(&good).unwrap();
        assert_eq!(config.dealer, 9);

        let bad = dir.join("bad.json");
        std::fs::write(&bad, r#"{"deck_size": 0}"#).unwrap();
        assert!(EngineConfig::load(&bad).is_err());
        assert!(EngineConfig::load(dir.join("missing.json")).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
