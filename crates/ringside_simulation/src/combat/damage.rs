//! Damage application
//!
//! Reads TakeDamage events and applies them to Health with the defensive
//! modifiers of the struck fighter:
//! - Clean block (facing the blow): ×0.2
//! - Angled block: ×0.7
//! - Dodge: evaded
//! - Open guard: full damage + stun roll (controller-driven fighters only)

use bevy::prelude::*;

use crate::ai::{OpponentConfig, OpponentNotification, OpponentState};
use crate::components::{Defeated, DefenseState, Fighter, Health, KnockedDown, MovementCommand};
use crate::feedback::FeedbackCue;
use crate::scheduling::{TaskKind, TimedTaskElapsed, TimedTasks};
use crate::{DeterministicRng, RandomSource};

pub const CLEAN_BLOCK_FACTOR: f32 = 0.2;
pub const ANGLED_BLOCK_FACTOR: f32 = 0.7;
/// Facing · (−incoming direction) above this is a clean block
pub const CLEAN_BLOCK_ALIGNMENT: f32 = 0.5;

/// Inbound: deal `amount` damage to `target`.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TakeDamage {
    pub target: Entity,
    pub attacker: Option<Entity>,
    pub amount: u32,
    /// Travel direction of the blow (attacker → target)
    pub direction: Vec3,
    /// Landed while the target was attacking
    pub is_counter: bool,
    /// Block already accounted for by the strike resolution engine
    pub pre_mitigated: bool,
    /// Heavy blow through a raised guard: the guard was up, no stun roll
    pub guard_broken: bool,
}

/// Event: damage applied.
///
/// Written after Health changed. Used for UI, sounds, scoring.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    pub mitigation: Mitigation,
    pub target_defeated: bool,
}

/// Event: fighter's health reached zero. Written exactly once per fighter.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FighterDefeated {
    pub fighter: Entity,
    pub by: Option<Entity>,
}

/// Which defensive modifier applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mitigation {
    None,
    CleanBlock,
    AngledBlock,
    Dodged,
}

/// Apply the defensive modifiers of `defense` to an incoming blow.
///
/// Returns the final damage and the modifier that applied.
pub fn mitigate_damage(
    amount: u32,
    direction: Vec3,
    facing: Vec3,
    defense: &DefenseState,
    pre_mitigated: bool,
) -> (u32, Mitigation) {
    if defense.dodging {
        return (0, Mitigation::Dodged);
    }
    if !defense.blocking || pre_mitigated {
        return (amount, Mitigation::None);
    }

    let alignment = facing.normalize_or_zero().dot(-direction.normalize_or_zero());
    if alignment > CLEAN_BLOCK_ALIGNMENT {
        ((amount as f32 * CLEAN_BLOCK_FACTOR).round() as u32, Mitigation::CleanBlock)
    } else {
        ((amount as f32 * ANGLED_BLOCK_FACTOR).round() as u32, Mitigation::AngledBlock)
    }
}

/// Stun probability: damage/100, ×`counter_multiplier` on counter hits.
pub fn stun_chance(damage: u32, is_counter: bool, counter_multiplier: f32) -> f32 {
    let mut chance = damage as f32 / 100.0;
    if is_counter {
        chance *= counter_multiplier;
    }
    chance.clamp(0.0, 1.0)
}

/// Stun duration grows with damage, capped at `config.stun_max`.
pub fn stun_duration(damage: u32, config: &OpponentConfig) -> f32 {
    (config.stun_base + damage as f32 * config.stun_per_damage).min(config.stun_max)
}

/// System: apply TakeDamage events
///
/// 1. Defensive modifiers (block / dodge)
/// 2. Health subtraction (floor 0)
/// 3. Stun roll for controller-driven fighters hit with an open guard
/// 4. Defeat exactly once: cancel all timed tasks, schedule hand-off
#[allow(clippy::too_many_arguments)]
pub fn apply_damage(
    mut commands: Commands,
    mut damage_events: EventReader<TakeDamage>,
    mut fighters: Query<
        (
            &Transform,
            &mut Health,
            &mut DefenseState,
            &mut TimedTasks,
            &mut MovementCommand,
            Option<&mut OpponentState>,
            Option<&OpponentConfig>,
        ),
        (With<Fighter>, Without<Defeated>),
    >,
    mut rng: ResMut<DeterministicRng>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut defeated_events: EventWriter<FighterDefeated>,
    mut cues: EventWriter<FeedbackCue>,
) {
    for event in damage_events.read() {
        let Ok((transform, mut health, mut defense, mut tasks, mut movement, mut state, config)) =
            fighters.get_mut(event.target)
        else {
            continue;
        };

        if !health.is_alive() {
            continue;
        }

        let (damage, mitigation) = mitigate_damage(
            event.amount,
            event.direction,
            transform.forward().as_vec3(),
            &defense,
            event.pre_mitigated,
        );

        let open_guard = !defense.blocking && !defense.dodging && !event.guard_broken;
        health.take_damage(damage);
        let target_defeated = !health.is_alive();

        dealt_events.write(DamageDealt {
            attacker: event.attacker,
            target: event.target,
            damage,
            mitigation,
            target_defeated,
        });

        if target_defeated {
            tasks.cancel_all();
            *defense = DefenseState::default();
            *movement = MovementCommand::Stop;
            if let Some(state) = state.as_mut() {
                **state = OpponentState::Defeated;
            }

            let handoff_delay = config.map(|c| c.defeat_handoff_delay).unwrap_or(2.0);
            tasks.schedule(TaskKind::DefeatHandoff, handoff_delay);
            commands.entity(event.target).insert(Defeated);

            defeated_events.write(FighterDefeated {
                fighter: event.target,
                by: event.attacker,
            });
            cues.write(FeedbackCue::animation(event.target, "Defeated"));
            crate::logger::log_info(&format!(
                "🏁 {:?} defeated by {:?}",
                event.target, event.attacker
            ));
            continue;
        }

        // Stun roll: only fighters driven by a controller, only with an open guard
        let (Some(mut state), Some(config)) = (state, config) else {
            continue;
        };
        if !open_guard || damage == 0 {
            continue;
        }

        let chance = stun_chance(damage, event.is_counter, config.counter_stun_multiplier);
        if !rng.chance(chance) {
            continue;
        }

        let duration = stun_duration(damage, config);
        defense.stunned = true;
        tasks.cancel(TaskKind::AttackProbe);
        tasks.cancel(TaskKind::AttackRecovery);
        tasks.schedule(TaskKind::StunEnd, duration);
        *state = OpponentState::Stunned;
        *movement = MovementCommand::Stop;

        cues.write(FeedbackCue::animation(event.target, "Stunned"));
        crate::logger::log_info(&format!(
            "💫 {:?} stunned for {:.2}s ({} dmg, counter: {})",
            event.target, duration, damage, event.is_counter
        ));
    }
}

/// System: close combat windows shared by every fighter.
///
/// - VulnerableEnd: guard-break window over
/// - KnockdownEnd: get up, controller retreats
/// - DefeatHandoff: presentation takes over
pub fn expire_combat_windows(
    mut commands: Commands,
    mut elapsed: EventReader<TimedTaskElapsed>,
    mut fighters: Query<&mut DefenseState, With<Fighter>>,
    mut cues: EventWriter<FeedbackCue>,
    mut notifications: EventWriter<OpponentNotification>,
) {
    for event in elapsed.read() {
        match event.kind {
            TaskKind::VulnerableEnd => {
                if let Ok(mut defense) = fighters.get_mut(event.entity) {
                    defense.vulnerable = false;
                }
            }
            TaskKind::KnockdownEnd => {
                commands.entity(event.entity).remove::<KnockedDown>();
                cues.write(FeedbackCue::animation(event.entity, "GetUp"));
                notifications.write(OpponentNotification::ForceRetreat {
                    opponent: event.entity,
                });
                crate::logger::log_info(&format!("⬆️ {:?} back on their feet", event.entity));
            }
            TaskKind::DefeatHandoff => {
                cues.write(FeedbackCue::animation(event.entity, "DefeatedIdle"));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocking() -> DefenseState {
        DefenseState {
            blocking: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_block_takes_twenty_percent() {
        // Facing -Z, blow travelling +Z (coming straight at the face)
        let (damage, mitigation) = mitigate_damage(20, Vec3::Z, Vec3::NEG_Z, &blocking(), false);
        assert_eq!(damage, 4);
        assert_eq!(mitigation, Mitigation::CleanBlock);
    }

    #[test]
    fn test_angled_block_takes_seventy_percent() {
        // Blow from the side
        let (damage, mitigation) = mitigate_damage(20, Vec3::X, Vec3::NEG_Z, &blocking(), false);
        assert_eq!(damage, 14);
        assert_eq!(mitigation, Mitigation::AngledBlock);
    }

    #[test]
    fn test_open_guard_takes_full_damage() {
        let (damage, mitigation) = mitigate_damage(20, Vec3::Z, Vec3::NEG_Z, &DefenseState::default(), false);
        assert_eq!(damage, 20);
        assert_eq!(mitigation, Mitigation::None);
    }

    #[test]
    fn test_pre_mitigated_skips_block_but_not_dodge() {
        let (damage, _) = mitigate_damage(4, Vec3::Z, Vec3::NEG_Z, &blocking(), true);
        assert_eq!(damage, 4);

        let dodging = DefenseState {
            dodging: true,
            ..Default::default()
        };
        assert_eq!(mitigate_damage(18, Vec3::Z, Vec3::NEG_Z, &dodging, true), (0, Mitigation::Dodged));
    }

    #[test]
    fn test_stun_chance_scales_with_damage_and_counter() {
        assert!((stun_chance(20, false, 1.5) - 0.2).abs() < 1e-6);
        assert!((stun_chance(20, true, 1.5) - 0.3).abs() < 1e-6);
        assert_eq!(stun_chance(90, true, 1.5), 1.0);
    }

    #[test]
    fn test_stun_duration_is_capped() {
        let config = OpponentConfig::default();
        assert!(stun_duration(10, &config) < stun_duration(20, &config));
        assert_eq!(stun_duration(10_000, &config), config.stun_max);
    }
}
