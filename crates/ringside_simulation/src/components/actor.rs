//! Fighter components: Fighter, Health, Stamina, DefenseState.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::{ComboState, HitCooldownTable, HitZones};
use crate::components::MovementCommand;
use crate::scheduling::TimedTasks;

/// Which side of the ring a fighter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum FighterRole {
    #[default]
    Player,
    Opponent,
}

/// Fighter (player or opponent), the base component of every agent in the ring.
///
/// Pulls in resources, defense flags, hit zones and the timed task table
/// through Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(
    Health,
    Stamina,
    DefenseState,
    TimedTasks,
    HitZones,
    HitCooldownTable,
    ComboState,
    MovementCommand,
    Transform
)]
pub struct Fighter {
    pub role: FighterRole,
}

impl Fighter {
    pub fn player() -> Self {
        Self {
            role: FighterRole::Player,
        }
    }

    pub fn opponent() -> Self {
        Self {
            role: FighterRole::Opponent,
        }
    }
}

/// Fighter health.
///
/// Invariant: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Stamina spent on attacks and dodges.
///
/// Invariant: 0 ≤ current ≤ max
/// Regen: `regen_amount` every `regen_interval` seconds, on its own clock.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Stamina {
    pub current: u32,
    pub max: u32,
    pub regen_amount: u32,
    /// Seconds between regen pulses
    pub regen_interval: f32,
    /// Time accumulated toward the next pulse
    pub regen_timer: f32,
}

impl Default for Stamina {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Stamina {
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            regen_amount: 2,
            regen_interval: 0.1,
            regen_timer: 0.0,
        }
    }

    pub fn with_regen(mut self, amount: u32, interval: f32) -> Self {
        self.regen_amount = amount;
        self.regen_interval = interval;
        self
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.current >= cost
    }

    pub fn consume(&mut self, cost: u32) -> bool {
        if self.can_afford(cost) {
            self.current -= cost;
            true
        } else {
            false
        }
    }

    pub fn regenerate(&mut self, delta_time: f32) {
        if self.current >= self.max || self.regen_interval <= 0.0 {
            self.current = self.current.min(self.max);
            self.regen_timer = 0.0;
            return;
        }

        self.regen_timer += delta_time;
        while self.regen_timer >= self.regen_interval {
            self.regen_timer -= self.regen_interval;
            self.current = self.current.saturating_add(self.regen_amount).min(self.max);
        }
    }

    pub fn percent(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }
}

/// Defensive flags of a fighter.
///
/// `stunned` suppresses decision-making. `vulnerable` is a timed window
/// opened by a guard break; both are cleared by timed tasks.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DefenseState {
    pub blocking: bool,
    pub stunned: bool,
    pub dodging: bool,
    pub vulnerable: bool,
}

/// Marker: health reached zero. Never removed within a match.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Defeated;

/// Marker: knocked down by a critical hit, waiting for the recovery task.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct KnockedDown;
