//! Decision cycle systems (trait roll, cadence, decision application).

use bevy::prelude::*;

use crate::ai::policy::{
    decide, next_decision_interval, roll_trait, select_strike, Decision, DecisionContext, EvasiveAction,
};
use crate::ai::{
    begin_attack, ControllerDisabled, FighterAttacking, Opponent, OpponentBrain, OpponentConfig,
    OpponentState, OpponentTarget, OpponentTraits, TargetSignals,
};
use crate::combat::StrikeRepertoire;
use crate::components::{Defeated, DefenseState, Fighter, KnockedDown, Stamina};
use crate::feedback::FeedbackCue;
use crate::scheduling::{TaskKind, TimedTasks};
use crate::DeterministicRng;

/// Horizontal distance between two fighters.
pub fn ring_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// System: roll opponent traits once, around the configured base values.
pub fn roll_opponent_traits(
    mut opponents: Query<(Entity, &OpponentConfig, &mut OpponentTraits)>,
    mut rng: ResMut<DeterministicRng>,
) {
    for (entity, config, mut traits) in opponents.iter_mut() {
        if traits.rolled {
            continue;
        }

        traits.aggressiveness = roll_trait(config.aggressiveness, config.trait_variance, &mut *rng);
        traits.defensiveness = roll_trait(config.defensiveness, config.trait_variance, &mut *rng);
        traits.rolled = true;

        crate::logger::log(&format!(
            "🎲 {:?} traits: aggressiveness {:.2}, defensiveness {:.2}",
            entity, traits.aggressiveness, traits.defensiveness
        ));
    }
}

/// System: count attack cooldowns down on the fixed clock.
pub fn tick_attack_cooldowns(mut brains: Query<&mut OpponentBrain>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut brain in brains.iter_mut() {
        if brain.attack_cooldown > 0.0 {
            brain.attack_cooldown = (brain.attack_cooldown - delta).max(0.0);
        }
    }
}

/// System: opponent decision cycle
///
/// Runs each opponent's decision every `reaction_time` (±30%) instead of
/// every tick. Busy opponents (attacking, blocking, dodging) wait for the
/// timed task that ends their action and decide on the first free tick.
///
/// Knocked-down, disabled and defeated opponents are filtered out.
#[allow(clippy::too_many_arguments)]
pub fn run_decision_cycles(
    mut opponents: Query<
        (
            Entity,
            &Transform,
            &mut OpponentState,
            &mut OpponentBrain,
            &mut Stamina,
            &mut DefenseState,
            &mut TimedTasks,
            &OpponentConfig,
            &OpponentTraits,
            &TargetSignals,
            &OpponentTarget,
            &StrikeRepertoire,
        ),
        (
            With<Opponent>,
            Without<Defeated>,
            Without<KnockedDown>,
            Without<ControllerDisabled>,
        ),
    >,
    targets: Query<&Transform, With<Fighter>>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
    mut cues: EventWriter<FeedbackCue>,
    mut attacking_events: EventWriter<FighterAttacking>,
) {
    let delta = time.delta_secs();

    for (
        entity,
        transform,
        mut state,
        mut brain,
        mut stamina,
        mut defense,
        mut tasks,
        config,
        traits,
        signals,
        target,
        repertoire,
    ) in opponents.iter_mut()
    {
        brain.decision_timer -= delta;
        if brain.decision_timer > 0.0 {
            continue;
        }
        if state.is_busy() {
            brain.decision_timer = 0.0;
            continue;
        }

        let Some(target_transform) = target.target.and_then(|t| targets.get(t).ok()) else {
            continue;
        };

        brain.decision_timer = next_decision_interval(config.reaction_time, &mut *rng);

        let distance = ring_distance(transform.translation, target_transform.translation);
        let context = DecisionContext {
            distance,
            stamina: stamina.current,
            stunned: defense.stunned,
            attack_ready: brain.attack_ready(),
            signals: *signals,
        };

        let previous = *state;
        match decide(&context, config, traits, &mut *rng) {
            Decision::HoldStun => {
                *state = OpponentState::Stunned;
            }
            Decision::Evade(EvasiveAction::Block) => {
                defense.blocking = true;
                tasks.schedule(TaskKind::BlockEnd, config.block_hold_time(traits.defensiveness));
                *state = OpponentState::Blocking;
                cues.write(FeedbackCue::animation(entity, "Block"));
            }
            Decision::Evade(EvasiveAction::Dodge) => {
                stamina.consume(config.dodge_cost);
                defense.dodging = true;
                tasks.schedule(TaskKind::DodgeEnd, config.dodge_duration);
                *state = OpponentState::Dodging;
                cues.write(FeedbackCue::animation(entity, "Dodge"));
            }
            Decision::CounterAttack | Decision::Attack => {
                let chosen = select_strike(&repertoire.profiles, distance, stamina.current, config, &mut *rng)
                    .and_then(|index| repertoire.get(index).map(|profile| (index, profile)));

                match chosen {
                    Some((index, profile)) => {
                        begin_attack(index, profile, &mut stamina, &mut brain, &mut tasks);
                        *state = OpponentState::Attacking;
                        cues.write(FeedbackCue::animation(entity, profile.animation_cue.clone()));
                        attacking_events.write(FighterAttacking { fighter: entity });
                        crate::logger::log(&format!(
                            "👊 {:?} throws {} at {:.2}m (stamina {})",
                            entity, profile.name, distance, stamina.current
                        ));
                    }
                    None => {
                        *state = OpponentState::Circling;
                    }
                }
            }
            Decision::Approach => {
                *state = OpponentState::Approaching;
            }
            Decision::Retreat => {
                *state = OpponentState::Retreating;
            }
            Decision::Circle { side } => {
                if let Some(side) = side {
                    brain.circle_side = side;
                }
                *state = OpponentState::Circling;
            }
        }

        if previous != *state {
            crate::logger::log(&format!("AI: {:?} {:?} → {:?}", entity, previous, *state));
        }
    }
}
