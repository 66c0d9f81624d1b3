//! Opponent attack execution (windup → contact probes → recovery).

use bevy::prelude::*;

use crate::ai::{ActiveAttack, Opponent, OpponentBrain, OpponentState, OpponentTarget};
use crate::combat::{HitZones, StrikeProfile, StrikeRegistered, StrikeRepertoire};
use crate::components::{Defeated, Fighter, Stamina};
use crate::feedback::{FeedbackCue, SoundCategory};
use crate::scheduling::{TaskKind, TimedTaskElapsed, TimedTasks};

/// Extra reach of a probe beyond the profile range (arm extension)
pub const PROBE_REACH_MARGIN: f32 = 0.3;
/// Minimum facing · to-target alignment for a probe to connect
pub const PROBE_MIN_ALIGNMENT: f32 = 0.5;

/// Commit to a strike profile: pay stamina, start cooldown, schedule probes.
///
/// The attacker stays Attacking until AttackRecovery, which never fires
/// before the last probe.
pub fn begin_attack(
    profile_index: usize,
    profile: &StrikeProfile,
    stamina: &mut Stamina,
    brain: &mut OpponentBrain,
    tasks: &mut TimedTasks,
) {
    stamina.consume(profile.stamina_cost);
    brain.attack_cooldown = profile.cooldown;
    brain.active_attack = Some(ActiveAttack {
        profile: profile_index,
        hits_left: profile.hits.max(1),
    });
    tasks.schedule(TaskKind::AttackProbe, profile.windup);
    tasks.schedule(TaskKind::AttackRecovery, profile.recovery_time());
}

/// Does a probe from `attacker` reach `target`?
pub fn probe_connects(attacker: &Transform, target: Vec3, reach: f32) -> bool {
    let to_target = Vec3::new(target.x - attacker.translation.x, 0.0, target.z - attacker.translation.z);
    if to_target.length() > reach {
        return false;
    }

    let forward = attacker.forward().as_vec3();
    let facing = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    facing.dot(to_target.normalize_or_zero()) >= PROBE_MIN_ALIGNMENT
}

/// System: fire attack probes
///
/// On AttackProbe: if the target is within reach in front of the attacker,
/// register a strike at the target's aimed zone (profile force and base
/// damage); otherwise the swing whiffs. Multi-hit profiles re-schedule the
/// probe until all hits are spent.
pub fn resolve_attack_probes(
    mut elapsed: EventReader<TimedTaskElapsed>,
    mut attackers: Query<
        (
            &Transform,
            &OpponentState,
            &mut OpponentBrain,
            &mut TimedTasks,
            &OpponentTarget,
            &StrikeRepertoire,
        ),
        (With<Opponent>, Without<Defeated>),
    >,
    targets: Query<(&Transform, &HitZones), With<Fighter>>,
    mut strikes: EventWriter<StrikeRegistered>,
    mut cues: EventWriter<FeedbackCue>,
) {
    for event in elapsed.read() {
        if event.kind != TaskKind::AttackProbe {
            continue;
        }
        let Ok((transform, state, mut brain, mut tasks, target, repertoire)) = attackers.get_mut(event.entity) else {
            continue;
        };
        if *state != OpponentState::Attacking {
            continue;
        }
        let Some(mut active) = brain.active_attack else {
            continue;
        };
        let Some(profile) = repertoire.get(active.profile) else {
            brain.active_attack = None;
            continue;
        };

        let aimed = target
            .target
            .and_then(|entity| targets.get(entity).ok().map(|(t, zones)| (entity, t, zones)));

        let mut landed = false;
        if let Some((target_entity, target_transform, zones)) = aimed {
            if probe_connects(transform, target_transform.translation, profile.range + PROBE_REACH_MARGIN) {
                let point = zones
                    .index_of(&profile.aim_zone)
                    .and_then(|index| zones.world_anchor(target_transform, index))
                    .unwrap_or(target_transform.translation);
                let direction = (point - transform.translation).normalize_or_zero();

                strikes.write(StrikeRegistered {
                    target: target_entity,
                    source: event.entity,
                    point,
                    direction,
                    force: profile.force,
                    base_damage: Some(profile.damage),
                });
                landed = true;
            }
        }

        if !landed {
            cues.write(FeedbackCue::Sound {
                entity: event.entity,
                category: SoundCategory::Swing,
                intensity: 0.5,
            });
            crate::logger::log(&format!("💨 {:?} {} whiffed", event.entity, profile.name));
        }

        active.hits_left = active.hits_left.saturating_sub(1);
        if active.hits_left > 0 {
            tasks.schedule(TaskKind::AttackProbe, profile.hit_interval);
            brain.active_attack = Some(active);
        } else {
            brain.active_attack = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::default_repertoire;

    #[test]
    fn test_begin_attack_pays_and_schedules() {
        let profiles = default_repertoire();
        let flurry_index = profiles.iter().position(|p| p.name == "body_flurry").unwrap_or(0);
        let flurry = &profiles[flurry_index];

        let mut stamina = Stamina::new(100);
        let mut brain = OpponentBrain::default();
        let mut tasks = TimedTasks::default();

        begin_attack(flurry_index, flurry, &mut stamina, &mut brain, &mut tasks);

        assert_eq!(stamina.current, 100 - flurry.stamina_cost);
        assert_eq!(brain.attack_cooldown, flurry.cooldown);
        assert_eq!(
            brain.active_attack,
            Some(ActiveAttack {
                profile: flurry_index,
                hits_left: 3
            })
        );
        assert_eq!(tasks.remaining(TaskKind::AttackProbe), Some(flurry.windup));
        assert_eq!(tasks.remaining(TaskKind::AttackRecovery), Some(flurry.recovery_time()));
    }

    #[test]
    fn test_probe_needs_reach_and_facing() {
        // Attacker at origin looking down -Z
        let attacker = Transform::from_xyz(0.0, 0.0, 0.0).looking_at(Vec3::new(0.0, 0.0, -1.0), Vec3::Y);

        assert!(probe_connects(&attacker, Vec3::new(0.0, 0.0, -1.2), 1.9));
        assert!(!probe_connects(&attacker, Vec3::new(0.0, 0.0, -2.5), 1.9)); // Too far
        assert!(!probe_connects(&attacker, Vec3::new(0.0, 0.0, 1.2), 1.9)); // Behind
        assert!(!probe_connects(&attacker, Vec3::new(1.2, 0.0, 0.0), 1.9)); // Beside
    }
}
