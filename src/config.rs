//! Table configuration.
//!
//! Loaded from JSON or from environment variables, with defaults for
//! anything left out.

use serde::{Deserialize, Serialize};

/// Rules knobs for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Cards drawn at the start of a turn (default: 2)
    pub draw_count: usize,
    /// Cards dealt to every player before the first turn (default: 0)
    pub hand_size: usize,
    /// Prestige every player starts with (default: 3)
    pub starting_prestige: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            draw_count: 2,
            hand_size: 0,
            starting_prestige: 3,
        }
    }
}

impl TableConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `TURNSTATE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed, or if the
    /// resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            draw_count: parse_or(&lookup, "TURNSTATE_DRAW_COUNT", defaults.draw_count)?,
            hand_size: parse_or(&lookup, "TURNSTATE_HAND_SIZE", defaults.hand_size)?,
            starting_prestige: parse_or(
                &lookup,
                "TURNSTATE_STARTING_PRESTIGE",
                defaults.starting_prestige,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.draw_count == 0 {
            return Err(ConfigError::Invalid {
                var: "TURNSTATE_DRAW_COUNT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse a variable, falling back to `default` only when it is unset.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse {raw:?}"),
        }),
        None => Ok(default),
    }
}
