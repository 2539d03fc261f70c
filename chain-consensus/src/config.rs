//! Consensus configuration

use crate::economics::{
    generated_between, generation_at, DECREMENT_INTERVAL, GENERATION_AMOUNT, SECONDS_PER_BLOCK,
    STANDBY_MINERS,
};
use crate::{ConsensusError, ConsensusResult};
use chain_core::{BlockHeight, PublicKey};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Consensus configuration. The default is the production network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Target block interval in seconds
    pub seconds_per_block: u32,
    /// Blocks between generation decrements
    pub decrement_interval: u32,
    /// Units generated per block, one entry per decrement interval
    pub generation_amount: Vec<u32>,
    /// Standby bookkeeper keys as compressed hex
    pub standby_miners: Vec<String>,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            seconds_per_block: SECONDS_PER_BLOCK,
            decrement_interval: DECREMENT_INTERVAL,
            generation_amount: GENERATION_AMOUNT.to_vec(),
            standby_miners: STANDBY_MINERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ConsensusConfig {
    /// Load configuration from a `.toml` or `.json` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConsensusResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConsensusError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ConsensusConfig = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;

        info!(
            "Loaded consensus config from {} ({} standby miners)",
            path.display(),
            config.standby_miners.len()
        );
        Ok(config)
    }

    /// Save configuration; the format follows the file extension
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConsensusResult<()> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        fs::write(path, content)
            .map_err(|e| ConsensusError::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConsensusResult<()> {
        if self.seconds_per_block == 0 {
            return Err(ConsensusError::Config(
                "Seconds per block must be greater than 0".to_string(),
            ));
        }

        if self.decrement_interval == 0 {
            return Err(ConsensusError::Config(
                "Decrement interval must be greater than 0".to_string(),
            ));
        }

        if self.generation_amount.is_empty() {
            return Err(ConsensusError::Config(
                "Generation schedule must not be empty".to_string(),
            ));
        }

        if self.standby_miners.is_empty() {
            return Err(ConsensusError::Config(
                "At least one standby miner is required".to_string(),
            ));
        }

        let keys = self.standby_keys()?;
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(ConsensusError::Config(format!(
                    "Duplicate standby miner {}: {}",
                    i, key
                )));
            }
        }

        Ok(())
    }

    /// Decode the standby bookkeeper keys
    pub fn standby_keys(&self) -> ConsensusResult<Vec<PublicKey>> {
        self.standby_miners
            .iter()
            .enumerate()
            .map(|(i, hex)| {
                let key = PublicKey::from_hex(hex).map_err(|e| {
                    ConsensusError::InvalidMiner(format!("standby miner {}: {}", i, e))
                })?;
                if key.is_infinity() {
                    return Err(ConsensusError::InvalidMiner(format!(
                        "standby miner {} is the point at infinity",
                        i
                    )));
                }
                Ok(key)
            })
            .collect()
    }

    /// Block interval as Duration
    pub fn time_per_block(&self) -> Duration {
        Duration::from_secs(u64::from(self.seconds_per_block))
    }

    /// Units generated by the block at `height`
    pub fn generation_at(&self, height: BlockHeight) -> u32 {
        generation_at(height, self.decrement_interval, &self.generation_amount)
    }

    /// Units generated by the blocks in `[start, end)`
    pub fn generated_between(&self, start: BlockHeight, end: BlockHeight) -> u64 {
        generated_between(start, end, self.decrement_interval, &self.generation_amount)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economics::standby_miners;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConsensusConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.standby_keys().unwrap(), standby_miners().to_vec());
        assert_eq!(config.time_per_block(), Duration::from_secs(15));
        assert_eq!(config.generation_at(0), 8);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ConsensusConfig::default();
        config.seconds_per_block = 0;
        assert!(config.validate().is_err());

        let mut config = ConsensusConfig::default();
        config.generation_amount.clear();
        assert!(config.validate().is_err());

        let mut config = ConsensusConfig::default();
        config.standby_miners.push(config.standby_miners[0].clone());
        assert!(config.validate().is_err());

        let mut config = ConsensusConfig::default();
        config.standby_miners = vec!["zz".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConsensusError::InvalidMiner(_))
        ));

        let mut config = ConsensusConfig::default();
        config.standby_miners = vec!["00".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConsensusError::InvalidMiner(_))
        ));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("consensus.json");

        let mut config = ConsensusConfig::default();
        config.seconds_per_block = 5;
        config.save_to_file(&path).unwrap();

        let loaded = ConsensusConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("consensus.toml");

        let mut config = ConsensusConfig::default();
        config.decrement_interval = 100;
        config.save_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("decrement_interval = 100"));

        let loaded = ConsensusConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("consensus.toml");
        std::fs::write(&path, "seconds_per_block = 1\n").unwrap();

        let loaded = ConsensusConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.seconds_per_block, 1);
        assert_eq!(loaded.standby_miners.len(), 5);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = ConsensusConfig::load_from_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConsensusError::Config(_))));
    }
}
