//! Opponent controller components (state machine, tuning, traits, brain).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::StrikeRepertoire;
use crate::components::{Fighter, MovementSpeed};

/// Opponent behavior states
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum OpponentState {
    /// Orbit the target on `OpponentBrain::circle_side` (initial state)
    #[default]
    Circling,
    /// Close the distance to the attack band
    Approaching,
    /// Back away from the target
    Retreating,
    /// Strike profile in progress (windup → probes → recovery)
    Attacking,
    /// Guard held until BlockEnd
    Blocking,
    /// No decisions until StunEnd, then Retreating
    Stunned,
    /// Side-step with i-frames until DodgeEnd
    Dodging,
    /// Health reached zero (terminal)
    Defeated,
    /// Target knocked out, idle until re-enabled
    Celebrating,
}

impl OpponentState {
    /// An action is in progress; the decision cycle waits for its timed task.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            OpponentState::Attacking
                | OpponentState::Blocking
                | OpponentState::Dodging
                | OpponentState::Defeated
                | OpponentState::Celebrating
        )
    }
}

/// Opponent tuning (constant per match).
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct OpponentConfig {
    /// Base decision cadence (seconds), randomized ±30% per cycle
    pub reaction_time: f32,
    pub min_attack_distance: f32,
    pub max_attack_distance: f32,
    /// Base trait values before the spawn roll
    pub aggressiveness: f32,
    pub defensiveness: f32,
    /// Max deviation of a rolled trait from its base value
    pub trait_variance: f32,
    /// 0..1, drives evasive reactions, counter-attacks and combo use
    pub difficulty: f32,
    /// Minimum stamina to start any attack
    pub attack_stamina_floor: u32,
    /// Chance to retreat when the target is too close
    pub retreat_chance: f32,
    /// Width of the "approach anyway" band above aggressiveness
    pub approach_band: f32,
    /// Weight of Block against Dodge in the evasive draw
    pub block_weight: f32,
    /// Block hold time at defensiveness 0.5
    pub block_duration: f32,
    pub dodge_duration: f32,
    pub dodge_cost: u32,
    /// Side-step length of a dodge (meters)
    pub dodge_distance: f32,
    /// Debounce window of the "target is attacking" signal
    pub target_attacking_window: f32,
    /// Combo profiles are offered only at or above this difficulty
    pub combo_min_difficulty: f32,
    pub stun_base: f32,
    pub stun_per_damage: f32,
    pub stun_max: f32,
    pub counter_stun_multiplier: f32,
    /// Delay before the defeated controller is handed off and disabled
    pub defeat_handoff_delay: f32,
    /// Angular step of one circling move (degrees)
    pub circle_step_degrees: f32,
    /// How far a retreat backs away (meters)
    pub retreat_distance: f32,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            reaction_time: 0.6,
            min_attack_distance: 0.8,
            max_attack_distance: 1.8,
            aggressiveness: 0.6,
            defensiveness: 0.5,
            trait_variance: 0.15,
            difficulty: 0.5,
            attack_stamina_floor: 10,
            retreat_chance: 0.7,
            approach_band: 0.3,
            block_weight: 0.7,
            block_duration: 0.8,
            dodge_duration: 0.4,
            dodge_cost: 15,
            dodge_distance: 0.8,
            target_attacking_window: 0.5,
            combo_min_difficulty: 0.5,
            stun_base: 0.5,
            stun_per_damage: 0.05,
            stun_max: 3.0,
            counter_stun_multiplier: 1.5,
            defeat_handoff_delay: 2.0,
            circle_step_degrees: 25.0,
            retreat_distance: 1.5,
        }
    }
}

impl OpponentConfig {
    /// Block hold time scaled by defensiveness (×0.5 .. ×1.5).
    pub fn block_hold_time(&self, defensiveness: f32) -> f32 {
        self.block_duration * (0.5 + defensiveness.clamp(0.0, 1.0))
    }

    /// Middle of the attack band, the distance an approach aims for.
    pub fn preferred_distance(&self) -> f32 {
        (self.min_attack_distance + self.max_attack_distance) * 0.5
    }
}

/// Per-opponent personality, rolled once at spawn around the config base.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct OpponentTraits {
    pub aggressiveness: f32,
    pub defensiveness: f32,
    pub rolled: bool,
}

impl Default for OpponentTraits {
    fn default() -> Self {
        Self {
            aggressiveness: 0.6,
            defensiveness: 0.5,
            rolled: false,
        }
    }
}

impl OpponentTraits {
    /// Fixed traits, skips the spawn roll.
    pub fn fixed(aggressiveness: f32, defensiveness: f32) -> Self {
        Self {
            aggressiveness,
            defensiveness,
            rolled: true,
        }
    }
}

/// Orbit direction while Circling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum CircleSide {
    #[default]
    Left,
    Right,
}

impl CircleSide {
    pub fn sign(&self) -> f32 {
        match self {
            CircleSide::Left => 1.0,
            CircleSide::Right => -1.0,
        }
    }
}

/// Strike profile currently being executed.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ActiveAttack {
    /// Index into `StrikeRepertoire::profiles`
    pub profile: usize,
    /// Contact probes still to fire
    pub hits_left: u8,
}

/// Decision-loop bookkeeping.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct OpponentBrain {
    /// Seconds until the next decision cycle
    pub decision_timer: f32,
    /// Seconds until another attack may start
    pub attack_cooldown: f32,
    pub circle_side: CircleSide,
    pub active_attack: Option<ActiveAttack>,
}

impl OpponentBrain {
    pub fn attack_ready(&self) -> bool {
        self.attack_cooldown <= 0.0
    }
}

/// Side-channel signals about the target, set by notifications.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct TargetSignals {
    /// Debounced: cleared by TargetAttackingEnd
    pub target_attacking: bool,
    /// Cleared by TargetVulnerableEnd
    pub target_vulnerable: bool,
    pub target_down: bool,
}

/// Fighter this opponent is boxing against.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct OpponentTarget {
    pub target: Option<Entity>,
}

/// Marker: controller produces no decisions (Disable notification or defeat hand-off).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ControllerDisabled;

/// Opponent marker, pulls in the whole controller through Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(
    Fighter = Fighter::opponent(),
    OpponentState,
    OpponentConfig,
    OpponentTraits,
    OpponentBrain,
    TargetSignals,
    OpponentTarget,
    StrikeRepertoire,
    MovementSpeed
)]
pub struct Opponent;
