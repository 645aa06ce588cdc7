//! Tunable game rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use game_core::MAX_PROJECT_QUALITY;

/// Errors loading a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Rule parameters; missing YAML keys fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Save slot key.
    pub save_key: String,
    /// MRR gained per converted customer.
    pub revenue_per_customer: u32,
    /// Quality of newly created projects.
    pub default_quality: u8,
    /// Smallest allowed starting balance.
    pub min_starting_money: Decimal,
    /// Largest allowed starting balance.
    pub max_starting_money: Decimal,
    /// A campaign awards floor(budget / divisor) XP.
    pub xp_budget_divisor: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            save_key: persistence::DEFAULT_SAVE_KEY.to_string(),
            revenue_per_customer: game_econ::REVENUE_PER_CUSTOMER,
            default_quality: game_core::DEFAULT_PROJECT_QUALITY,
            min_starting_money: Decimal::new(1_000, 0),
            max_starting_money: Decimal::new(10_000, 0),
            xp_budget_divisor: 10,
        }
    }
}

impl GameConfig {
    /// Parse YAML and validate.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.save_key.trim().is_empty() {
            return Err(ConfigError::Invalid("save_key is empty".into()));
        }
        if self.default_quality > MAX_PROJECT_QUALITY {
            return Err(ConfigError::Invalid(format!(
                "default_quality {} exceeds {}",
                self.default_quality, MAX_PROJECT_QUALITY
            )));
        }
        if self.min_starting_money < Decimal::ZERO
            || self.min_starting_money > self.max_starting_money
        {
            return Err(ConfigError::Invalid(format!(
                "starting money range [{}, {}] is invalid",
                self.min_starting_money, self.max_starting_money
            )));
        }
        if self.xp_budget_divisor == 0 {
            return Err(ConfigError::Invalid("xp_budget_divisor must be > 0".into()));
        }
        Ok(())
    }

    /// Clamp a requested starting balance into the configured range.
    pub fn clamp_starting_money(&self, amount: Decimal) -> Decimal {
        game_core::clamp_starting_money(amount, self.min_starting_money, self.max_starting_money)
    }
}
