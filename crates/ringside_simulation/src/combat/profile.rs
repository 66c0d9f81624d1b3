//! Strike profiles (jab/cross/hook/uppercut/combo).
//!
//! Immutable per-match configuration. The opponent controller picks one
//! at decision time from the profiles that are in range and affordable.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct StrikeProfile {
    pub name: String,
    /// Animation trigger for the attacker
    pub animation_cue: String,
    /// Base damage per hit (before zone multiplier)
    pub damage: u32,
    /// Impact force, drives severity tier and knockback
    pub force: f32,
    pub stamina_cost: u32,
    /// Seconds before the next attack may start
    pub cooldown: f32,
    /// Effective reach (meters)
    pub range: f32,
    /// Zone the probe aims at
    pub aim_zone: String,
    /// Seconds from attack start to the first contact probe
    pub windup: f32,
    pub hits: u8,
    /// Seconds between probes of a multi-hit profile
    pub hit_interval: f32,
    /// Only offered through the difficulty-based combo extension
    pub combo: bool,
}

impl StrikeProfile {
    #[allow(clippy::too_many_arguments)]
    pub fn single(
        name: &str,
        animation_cue: &str,
        damage: u32,
        force: f32,
        stamina_cost: u32,
        cooldown: f32,
        range: f32,
        aim_zone: &str,
        windup: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            animation_cue: animation_cue.to_string(),
            damage,
            force,
            stamina_cost,
            cooldown,
            range,
            aim_zone: aim_zone.to_string(),
            windup,
            hits: 1,
            hit_interval: 0.0,
            combo: false,
        }
    }

    /// Turn a single strike into a multi-hit combo profile.
    pub fn chained(mut self, hits: u8, hit_interval: f32) -> Self {
        self.hits = hits.max(1);
        self.hit_interval = hit_interval;
        self.combo = true;
        self
    }

    pub fn is_affordable(&self, stamina: u32) -> bool {
        stamina >= self.stamina_cost
    }

    pub fn in_range(&self, distance: f32) -> bool {
        distance <= self.range
    }

    /// Time until the last probe of this profile has fired.
    pub fn active_duration(&self) -> f32 {
        self.windup + self.hit_interval * f32::from(self.hits.saturating_sub(1))
    }

    /// Time until the attacker may decide again.
    pub fn recovery_time(&self) -> f32 {
        self.cooldown.max(self.active_duration())
    }
}

/// Boxing preset.
pub fn default_repertoire() -> Vec<StrikeProfile> {
    vec![
        StrikeProfile::single("jab", "Jab", 5, 3.0, 10, 0.8, 1.6, "head", 0.2),
        StrikeProfile::single("cross", "Cross", 8, 5.5, 15, 1.1, 1.7, "head", 0.3),
        StrikeProfile::single("hook", "Hook", 12, 7.0, 20, 1.4, 1.3, "head", 0.35),
        StrikeProfile::single("uppercut", "Uppercut", 15, 9.0, 25, 1.6, 1.1, "head", 0.4),
        StrikeProfile::single("one_two", "ComboOneTwo", 7, 4.5, 30, 2.0, 1.6, "head", 0.2)
            .chained(2, 0.55),
        StrikeProfile::single("body_flurry", "ComboFlurry", 6, 4.0, 35, 2.4, 1.4, "body", 0.25)
            .chained(3, 0.55),
    ]
}

/// Strike profiles available to an opponent.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct StrikeRepertoire {
    pub profiles: Vec<StrikeProfile>,
}

impl Default for StrikeRepertoire {
    fn default() -> Self {
        Self::new(default_repertoire())
    }
}

impl StrikeRepertoire {
    pub fn new(profiles: Vec<StrikeProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, index: usize) -> Option<&StrikeProfile> {
        self.profiles.get(index)
    }
}
