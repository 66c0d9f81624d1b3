//! Motion-to-Strike detector
//!
//! Tracks one hand's position history and decides when its motion is a
//! strike. The rolling average of the last `history_size` per-tick
//! velocities is the speed signal; crossing `min_velocity` (outside the
//! cooldown) starts a swing, the first contact during the swing becomes a
//! strike with a force mapped linearly from the swing speed.

use std::collections::{HashSet, VecDeque};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Detector tuning (per hand, constant per match).
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Average speed that starts a swing (m/s)
    pub min_velocity: f32,
    /// Speed mapped to `max_force`
    pub max_velocity: f32,
    /// Velocity samples in the rolling window
    pub history_size: usize,
    /// Seconds after a landed strike before a new swing may start
    pub cooldown: f32,
    pub min_force: f32,
    pub max_force: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_velocity: 1.5,
            max_velocity: 8.0,
            history_size: 5,
            cooldown: 0.3,
            min_force: 1.0,
            max_force: 10.0,
        }
    }
}

/// Map a swing speed onto the impact force range, clamped at both ends.
pub fn impact_force(speed: f32, config: &DetectorConfig) -> f32 {
    let span = config.max_velocity - config.min_velocity;
    if span <= 0.0 {
        return config.max_force;
    }
    let t = ((speed - config.min_velocity) / span).clamp(0.0, 1.0);
    config.min_force + (config.max_force - config.min_force) * t
}

/// Fixed-size window of the most recent velocity samples.
///
/// Starts full of zeros: the size never changes, every push evicts the
/// oldest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityHistory {
    samples: VecDeque<Vec3>,
}

impl VelocityHistory {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            samples: std::iter::repeat(Vec3::ZERO).take(size).collect(),
        }
    }

    pub fn push(&mut self, velocity: Vec3) {
        self.samples.pop_front();
        self.samples.push_back(velocity);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn average(&self) -> Vec3 {
        self.samples.iter().copied().sum::<Vec3>() / self.samples.len() as f32
    }

    pub fn average_speed(&self) -> f32 {
        self.average().length()
    }

    pub fn clear(&mut self) {
        self.samples.iter_mut().for_each(|sample| *sample = Vec3::ZERO);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum StrikePhase {
    #[default]
    Idle,
    Striking,
}

/// Strike produced by the first contact of a swing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedStrike {
    /// Normalized average velocity
    pub direction: Vec3,
    pub force: f32,
    pub speed: f32,
}

/// Tracked hand. Its `Transform` is the device-reported world position.
#[derive(Component, Debug, Clone)]
pub struct StrikeDetector {
    /// Fighter the hand belongs to, never struck by its own hand
    pub owner: Entity,
    pub config: DetectorConfig,
    history: VelocityHistory,
    last_position: Option<Vec3>,
    phase: StrikePhase,
    cooldown_remaining: f32,
    contacted: HashSet<Entity>,
}

impl StrikeDetector {
    pub fn new(owner: Entity, config: DetectorConfig) -> Self {
        Self {
            owner,
            history: VelocityHistory::new(config.history_size),
            config,
            last_position: None,
            phase: StrikePhase::Idle,
            cooldown_remaining: 0.0,
            contacted: HashSet::new(),
        }
    }

    pub fn phase(&self) -> StrikePhase {
        self.phase
    }

    pub fn average_speed(&self) -> f32 {
        self.history.average_speed()
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    /// Feed the hand position of this tick.
    ///
    /// Returns `true` when this sample started a swing. A swing whose
    /// speed falls back below `min_velocity` without contact ends as a
    /// whiff and does not start the cooldown.
    pub fn sample(&mut self, position: Vec3, delta: f32) -> bool {
        self.cooldown_remaining = (self.cooldown_remaining - delta).max(0.0);

        let velocity = match self.last_position {
            Some(last) if delta > 0.0 => (position - last) / delta,
            _ => Vec3::ZERO,
        };
        self.last_position = Some(position);
        self.history.push(velocity);

        let speed = self.history.average_speed();
        match self.phase {
            StrikePhase::Idle => {
                if speed > self.config.min_velocity && self.cooldown_remaining <= 0.0 {
                    self.phase = StrikePhase::Striking;
                    self.contacted.clear();
                    return true;
                }
            }
            StrikePhase::Striking => {
                if speed <= self.config.min_velocity {
                    self.phase = StrikePhase::Idle;
                }
            }
        }
        false
    }

    /// Contact with `target` during the current swing.
    ///
    /// Only the first contact of a swing produces a strike; it ends the
    /// swing and starts the cooldown. Repeated contacts with the same
    /// target inside one swing are ignored.
    pub fn contact(&mut self, target: Entity) -> Option<DetectedStrike> {
        if self.phase != StrikePhase::Striking || target == self.owner {
            return None;
        }
        if !self.contacted.insert(target) {
            return None;
        }

        let average = self.history.average();
        let speed = average.length();
        let strike = DetectedStrike {
            direction: average.normalize_or_zero(),
            force: impact_force(speed, &self.config),
            speed,
        };

        self.phase = StrikePhase::Idle;
        self.cooldown_remaining = self.config.cooldown;
        Some(strike)
    }
}
