//! Opponent controller events
//!
//! Inbound side-channel notifications (from the strike engine, hand
//! detectors or an external match director) and the attack announcement
//! every fighter emits when it starts swinging.

use bevy::prelude::*;

/// Inbound notifications to one opponent controller.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum OpponentNotification {
    /// Target started a swing (debounced, cleared after a fixed window)
    TargetAttacking { opponent: Entity },

    /// Target is open for `duration` seconds
    TargetVulnerable { opponent: Entity, duration: f32 },

    /// Target is down for good, idle and celebrate
    TargetKnockedOut { opponent: Entity },

    /// Break off and back away (knockdown recovery, external director)
    ForceRetreat { opponent: Entity },

    /// Resume decisions
    Enable { opponent: Entity },

    /// Stop decisions, hold still
    Disable { opponent: Entity },
}

impl OpponentNotification {
    pub fn opponent(&self) -> Entity {
        match *self {
            OpponentNotification::TargetAttacking { opponent }
            | OpponentNotification::TargetVulnerable { opponent, .. }
            | OpponentNotification::TargetKnockedOut { opponent }
            | OpponentNotification::ForceRetreat { opponent }
            | OpponentNotification::Enable { opponent }
            | OpponentNotification::Disable { opponent } => opponent,
        }
    }
}

/// Event: `fighter` started an attack (opponent profile or tracked hand swing).
///
/// Relayed as `TargetAttacking` to every opponent boxing against `fighter`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FighterAttacking {
    pub fighter: Entity,
}
