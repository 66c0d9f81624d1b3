//! Motion-to-Strike Detector
//!
//! One `StrikeDetector` per tracked hand. The device layer writes the hand
//! `Transform` and sends `HandContact` when the hand collider touches a
//! fighter; this module turns both into `StrikeRegistered` events for the
//! Strike Resolution Engine.

use bevy::prelude::*;

pub mod detector;
pub mod systems;

pub use detector::{impact_force, DetectedStrike, DetectorConfig, StrikeDetector, StrikePhase, VelocityHistory};
pub use systems::{register_hand_contacts, sample_hand_motion, HandContact};

use crate::SimulationSet;

/// Motion Plugin
///
/// Runs first in the fixed tick: samples hands, then converts contacts.
pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HandContact>().add_systems(
            FixedUpdate,
            (sample_hand_motion, register_hand_contacts)
                .chain()
                .in_set(SimulationSet::Sense),
        );
    }
}
