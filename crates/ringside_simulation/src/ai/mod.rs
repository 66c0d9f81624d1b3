//! Opponent Controller
//!
//! Finite-state controller for autonomous opponents: a decision cycle on a
//! jittered reaction-time cadence, attack execution through strike
//! profiles, evasive reactions to the target's swings and timed recovery
//! from blocks, dodges, stuns and knockdowns.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod policy;
pub mod systems;


// Re-export controller types and systems
pub use components::*;
pub use events::*;
pub use systems::*;

use crate::SimulationSet;

/// Opponent Plugin
///
/// Registers controller systems in FixedUpdate for determinism.
/// Order inside the Decide set:
/// 1. relay_target_events: fighter events → notifications
/// 2. handle_notifications: signals, retreat, enable/disable
/// 3. face_targets: turn toward the target
/// 4. resolve_attack_probes: windup over → StrikeRegistered
/// 5. handle_controller_tasks: block/dodge/stun/attack endings
/// 6. run_decision_cycles: new decisions
/// 7. movement_from_state: OpponentState → MovementCommand
pub struct OpponentPlugin;

impl Plugin for OpponentPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<OpponentNotification>()
            .add_event::<FighterAttacking>();

        app.add_systems(
            FixedUpdate,
            (
                (roll_opponent_traits, tick_attack_cooldowns).in_set(SimulationSet::Timers),
                (
                    relay_target_events,
                    handle_notifications,
                    face_targets,
                    resolve_attack_probes,
                    handle_controller_tasks,
                    run_decision_cycles,
                    movement_from_state,
                )
                    .chain()
                    .in_set(SimulationSet::Decide),
            ),
        );
    }
}
