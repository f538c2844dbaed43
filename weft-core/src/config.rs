//! Tracker Configuration
//!
//! A [`TrackerConfig`] controls the two tunable behaviors of a tracker:
//!
//! - how the active-effect pointer is left after a nested `effect()` call
//!   returns ([`EffectScoping`]);
//! - how often the dependency graph reclaims entries whose observed object
//!   has been dropped (`sweep_interval`).
//!
//! Configuration can be built in code, parsed from JSON, or read from the
//! environment. The thread-local runtime reads the environment once, the
//! first time it is used on a thread.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// What happens to the active-effect pointer when `effect()` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectScoping {
    /// Reset the pointer to empty.
    ///
    /// An outer effect that runs a nested `effect()` loses its own
    /// registration for every read it makes after the nested call returns.
    #[default]
    Clear,

    /// Restore whichever effect was active before the call.
    Restore,
}

impl FromStr for EffectScoping {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(Self::Clear),
            "restore" => Ok(Self::Restore),
            other => Err(ConfigError::UnknownScoping(other.to_string())),
        }
    }
}

impl fmt::Display for EffectScoping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => f.write_str("clear"),
            Self::Restore => f.write_str("restore"),
        }
    }
}

/// Settings for a [`Tracker`](crate::reactive::Tracker).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Pointer behavior after a nested `effect()` call.
    pub effect_scoping: EffectScoping,

    /// Number of newly created target entries after which the graph drops
    /// entries belonging to dead targets.
    pub sweep_interval: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            effect_scoping: EffectScoping::Clear,
            sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl TrackerConfig {
    /// Default value of `sweep_interval`.
    pub const DEFAULT_SWEEP_INTERVAL: usize = 64;

    /// Environment variable holding the effect scoping (`clear` or `restore`).
    pub const ENV_EFFECT_SCOPING: &'static str = "WEFT_EFFECT_SCOPING";

    /// Environment variable holding the sweep interval.
    pub const ENV_SWEEP_INTERVAL: &'static str = "WEFT_SWEEP_INTERVAL";

    /// Set the effect scoping.
    pub fn with_effect_scoping(mut self, scoping: EffectScoping) -> Self {
        self.effect_scoping = scoping;
        self
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: usize) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(Self::ENV_EFFECT_SCOPING) {
            config.effect_scoping = value.parse()?;
        }

        if let Some(value) = lookup(Self::ENV_SWEEP_INTERVAL) {
            config.sweep_interval =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidVar {
                        variable: Self::ENV_SWEEP_INTERVAL,
                        value: value.clone(),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }
}
