//! Match configuration
//!
//! Everything tunable about a bout, set once before the first tick and
//! constant afterwards: hit zones, strike profiles, engine thresholds,
//! opponent tuning, hand detector tuning and fighter resources.

use std::collections::HashSet;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::OpponentConfig;
use crate::combat::{default_hit_zones, default_repertoire, HitZone, StrikeProfile, StrikeThresholds};
use crate::motion::DetectorConfig;

/// Fighter resources at the start of a bout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    pub max_health: u32,
    pub max_stamina: u32,
    pub stamina_regen_amount: u32,
    pub stamina_regen_interval: f32,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            max_stamina: 100,
            stamina_regen_amount: 2,
            stamina_regen_interval: 0.1,
        }
    }
}

/// Match-wide configuration resource.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub thresholds: StrikeThresholds,
    pub opponent: OpponentConfig,
    pub detector: DetectorConfig,
    pub fighter: FighterConfig,
    pub zones: Vec<HitZone>,
    pub repertoire: Vec<StrikeProfile>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            thresholds: StrikeThresholds::default(),
            opponent: OpponentConfig::default(),
            detector: DetectorConfig::default(),
            fighter: FighterConfig::default(),
            zones: default_hit_zones(),
            repertoire: default_repertoire(),
        }
    }
}

/// Errors that can occur when loading/validating a MatchConfig
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("min_impact_force must be positive (got {0})")]
    NonPositiveMinForce(f32),

    #[error("heavy_threshold ({heavy}) must exceed min_impact_force ({min})")]
    HeavyBelowMinimum { min: f32, heavy: f32 },

    #[error("critical_threshold ({critical}) must not be below heavy_threshold ({heavy})")]
    CriticalBelowHeavy { heavy: f32, critical: f32 },

    #[error("min_attack_distance ({min}) exceeds max_attack_distance ({max})")]
    AttackBandInverted { min: f32, max: f32 },

    #[error("detector max_velocity ({max}) must exceed min_velocity ({min})")]
    VelocityBandInverted { min: f32, max: f32 },

    #[error("at least one hit zone is required")]
    NoZones,

    #[error("duplicate hit zone name: {0}")]
    DuplicateZone(String),

    #[error("detector history_size must be at least 1")]
    EmptyVelocityWindow,
}

impl MatchConfig {
    /// Load from a JSON file and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string and validate. Missing fields take the boxing defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if t.min_impact_force <= 0.0 {
            return Err(ConfigError::NonPositiveMinForce(t.min_impact_force));
        }
        if t.heavy_threshold <= t.min_impact_force {
            return Err(ConfigError::HeavyBelowMinimum {
                min: t.min_impact_force,
                heavy: t.heavy_threshold,
            });
        }
        if t.critical_threshold < t.heavy_threshold {
            return Err(ConfigError::CriticalBelowHeavy {
                heavy: t.heavy_threshold,
                critical: t.critical_threshold,
            });
        }

        if self.opponent.min_attack_distance > self.opponent.max_attack_distance {
            return Err(ConfigError::AttackBandInverted {
                min: self.opponent.min_attack_distance,
                max: self.opponent.max_attack_distance,
            });
        }

        if self.detector.max_velocity <= self.detector.min_velocity {
            return Err(ConfigError::VelocityBandInverted {
                min: self.detector.min_velocity,
                max: self.detector.max_velocity,
            });
        }
        if self.detector.history_size == 0 {
            return Err(ConfigError::EmptyVelocityWindow);
        }

        if self.zones.is_empty() {
            return Err(ConfigError::NoZones);
        }
        let mut seen = HashSet::new();
        for zone in &self.zones {
            if !seen.insert(zone.name.as_str()) {
                return Err(ConfigError::DuplicateZone(zone.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let json = r#"{ "thresholds": { "heavy_threshold": 6.0 }, "opponent": { "difficulty": 0.9 } }"#;
        let config = MatchConfig::from_json(json).expect("parse failed");

        assert_eq!(config.thresholds.heavy_threshold, 6.0);
        assert_eq!(config.thresholds.min_impact_force, 1.0);
        assert_eq!(config.opponent.difficulty, 0.9);
        assert_eq!(config.zones.len(), 2);
        assert_eq!(config.repertoire.len(), 6);
    }

    #[test]
    fn test_json_roundtrip_keeps_zones() {
        let config = MatchConfig::default();
        let json = config.to_json().expect("serialize failed");
        let parsed = MatchConfig::from_json(&json).expect("parse failed");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(MatchConfig::from_json("{ not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_threshold_order_rejected() {
        let mut config = MatchConfig::default();
        config.thresholds.critical_threshold = 4.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::CriticalBelowHeavy {
                heavy: 5.0,
                critical: 4.0
            })
        );

        let mut config = MatchConfig::default();
        config.thresholds.min_impact_force = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveMinForce(0.0)));
    }

    #[test]
    fn test_inverted_bands_rejected() {
        let mut config = MatchConfig::default();
        config.opponent.min_attack_distance = 2.0;
        assert!(matches!(config.validate(), Err(ConfigError::AttackBandInverted { .. })));

        let mut config = MatchConfig::default();
        config.detector.max_velocity = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::VelocityBandInverted { .. })));
    }

    #[test]
    fn test_zone_list_rejected() {
        let mut config = MatchConfig::default();
        config.zones.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoZones));

        let mut config = MatchConfig::default();
        let head = config.zones[0].clone();
        config.zones.push(head);
        assert_eq!(config.validate(), Err(ConfigError::DuplicateZone("head".into())));
    }
}
