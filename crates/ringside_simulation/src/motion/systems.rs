//! Hand tracking systems.

use bevy::prelude::*;

use crate::ai::FighterAttacking;
use crate::combat::StrikeRegistered;
use crate::feedback::{FeedbackCue, SoundCategory};
use crate::motion::StrikeDetector;

/// Inbound: a tracked hand's collider touched `target` at `point`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HandContact {
    pub hand: Entity,
    pub target: Entity,
    pub point: Vec3,
}

/// System: sample every tracked hand once per fixed tick.
///
/// A new swing announces the owner as attacking (opponents watching the
/// owner get a TargetAttacking notification) and plays the swing sound.
pub fn sample_hand_motion(
    mut hands: Query<(Entity, &Transform, &mut StrikeDetector)>,
    time: Res<Time<Fixed>>,
    mut attacking_events: EventWriter<FighterAttacking>,
    mut cues: EventWriter<FeedbackCue>,
) {
    let delta = time.delta_secs();

    for (hand, transform, mut detector) in hands.iter_mut() {
        if !detector.sample(transform.translation, delta) {
            continue;
        }

        attacking_events.write(FighterAttacking {
            fighter: detector.owner,
        });
        cues.write(FeedbackCue::Sound {
            entity: hand,
            category: SoundCategory::Swing,
            intensity: (detector.average_speed() / detector.config.max_velocity).clamp(0.0, 1.0),
        });
        crate::logger::log(&format!(
            "✋ {:?} swing started at {:.2} m/s",
            hand,
            detector.average_speed()
        ));
    }
}

/// System: turn hand contacts into strikes
///
/// Contacts outside a swing, on the hand's own fighter or repeated within
/// one swing are dropped.
pub fn register_hand_contacts(
    mut contacts: EventReader<HandContact>,
    mut hands: Query<&mut StrikeDetector>,
    mut strikes: EventWriter<StrikeRegistered>,
) {
    for contact in contacts.read() {
        let Ok(mut detector) = hands.get_mut(contact.hand) else {
            continue;
        };
        let Some(strike) = detector.contact(contact.target) else {
            continue;
        };

        crate::logger::log(&format!(
            "✋ {:?} contact on {:?}: {:.2} m/s → force {:.2}",
            contact.hand, contact.target, strike.speed, strike.force
        ));
        strikes.write(StrikeRegistered {
            target: contact.target,
            source: contact.hand,
            point: contact.point,
            direction: strike.direction,
            force: strike.force,
            base_damage: None,
        });
    }
}
