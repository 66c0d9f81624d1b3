//! Opponent movement intents and facing.

use bevy::prelude::*;

use crate::ai::{ControllerDisabled, Opponent, OpponentBrain, OpponentConfig, OpponentState, OpponentTarget};
use crate::components::{Defeated, Fighter, KnockedDown, MovementCommand};

/// Where an opponent in `state` wants to go, or `None` to stand still.
pub fn movement_target(
    state: OpponentState,
    position: Vec3,
    target: Vec3,
    brain: &OpponentBrain,
    config: &OpponentConfig,
) -> Option<Vec3> {
    let offset = Vec3::new(position.x - target.x, 0.0, position.z - target.z);
    let away = if offset.length_squared() > 1e-6 {
        offset.normalize()
    } else {
        Vec3::Z
    };

    match state {
        OpponentState::Approaching => Some(target + away * config.preferred_distance()),
        OpponentState::Retreating => Some(position + away * config.retreat_distance),
        OpponentState::Circling => {
            let step = Quat::from_rotation_y(config.circle_step_degrees.to_radians() * brain.circle_side.sign());
            let radius = offset.length().max(config.min_attack_distance);
            Some(target + step * away * radius)
        }
        OpponentState::Dodging => {
            let side = Vec3::Y.cross(away) * brain.circle_side.sign();
            Some(position + side * config.dodge_distance)
        }
        OpponentState::Attacking
        | OpponentState::Blocking
        | OpponentState::Stunned
        | OpponentState::Defeated
        | OpponentState::Celebrating => None,
    }
}

/// System: OpponentState → MovementCommand
///
/// Writes only when the intent changed, so `Changed<MovementCommand>`
/// stays meaningful for the navigation layer.
#[allow(clippy::type_complexity)]
pub fn movement_from_state(
    mut opponents: Query<
        (
            &Transform,
            &OpponentState,
            &OpponentBrain,
            &OpponentConfig,
            &OpponentTarget,
            &mut MovementCommand,
            Has<ControllerDisabled>,
            Has<KnockedDown>,
        ),
        With<Opponent>,
    >,
    targets: Query<&Transform, With<Fighter>>,
) {
    for (transform, state, brain, config, target, mut command, disabled, knocked_down) in opponents.iter_mut() {
        let target_position = target
            .target
            .and_then(|entity| targets.get(entity).ok())
            .map(|t| t.translation);

        let desired = match target_position {
            Some(target_position) if !disabled && !knocked_down => {
                match movement_target(*state, transform.translation, target_position, brain, config) {
                    Some(point) => MovementCommand::MoveToPosition { target: point },
                    None => MovementCommand::Stop,
                }
            }
            _ => MovementCommand::Stop,
        };

        command.set_if_neq(desired);
    }
}

/// System: turn opponents toward their target on the horizontal plane.
pub fn face_targets(
    mut set: ParamSet<(
        Query<(Entity, &OpponentTarget), (With<Opponent>, Without<Defeated>, Without<KnockedDown>)>,
        Query<&Transform, With<Fighter>>,
        Query<&mut Transform, (With<Opponent>, Without<Defeated>, Without<KnockedDown>)>,
    )>,
) {
    let pairs: Vec<(Entity, Entity)> = set
        .p0()
        .iter()
        .filter_map(|(entity, target)| target.target.map(|t| (entity, t)))
        .collect();

    let aims: Vec<(Entity, Vec3)> = {
        let fighters = set.p1();
        pairs
            .into_iter()
            .filter_map(|(entity, target)| fighters.get(target).ok().map(|t| (entity, t.translation)))
            .collect()
    };

    let mut opponents = set.p2();
    for (entity, aim) in aims {
        let Ok(mut transform) = opponents.get_mut(entity) else {
            continue;
        };

        let look = Vec3::new(aim.x, transform.translation.y, aim.z);
        if look.distance_squared(transform.translation) < 1e-6 {
            continue;
        }
        transform.look_at(look, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::CircleSide;

    #[test]
    fn test_approach_aims_for_the_attack_band() {
        let config = OpponentConfig::default();
        let brain = OpponentBrain::default();

        let point = movement_target(
            OpponentState::Approaching,
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::ZERO,
            &brain,
            &config,
        );
        let point = point.unwrap_or_default();
        assert!((point.length() - config.preferred_distance()).abs() < 1e-4);
        assert!(point.z > 0.0); // Stays on its own side
    }

    #[test]
    fn test_retreat_backs_away() {
        let config = OpponentConfig::default();
        let point = movement_target(
            OpponentState::Retreating,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::ZERO,
            &OpponentBrain::default(),
            &config,
        )
        .unwrap_or_default();
        assert!((point.z - (1.0 + config.retreat_distance)).abs() < 1e-4);
    }

    #[test]
    fn test_circling_keeps_radius_and_switches_sides() {
        let config = OpponentConfig::default();
        let position = Vec3::new(0.0, 0.0, 1.5);
        let mut brain = OpponentBrain::default();

        let left = movement_target(OpponentState::Circling, position, Vec3::ZERO, &brain, &config).unwrap_or_default();
        brain.circle_side = CircleSide::Right;
        let right = movement_target(OpponentState::Circling, position, Vec3::ZERO, &brain, &config).unwrap_or_default();

        assert!((left.length() - 1.5).abs() < 1e-4);
        assert!((right.length() - 1.5).abs() < 1e-4);
        assert!(left.x * right.x < 0.0);
    }

    #[test]
    fn test_committed_states_stand_still() {
        let config = OpponentConfig::default();
        let brain = OpponentBrain::default();
        for state in [
            OpponentState::Attacking,
            OpponentState::Blocking,
            OpponentState::Stunned,
            OpponentState::Defeated,
        ] {
            assert_eq!(movement_target(state, Vec3::Z, Vec3::ZERO, &brain, &config), None);
        }
    }
}
