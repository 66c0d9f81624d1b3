//! Outbound presentation hooks.
//!
//! The simulation never plays animations, sounds or particles itself.
//! It writes fire-and-forget events that the presentation layer consumes;
//! nothing in the simulation reads them back.
//!
//! Haptics go through the app-scoped [`HapticPulse`] channel, so two
//! matches running in separate `App`s never see each other's pulses.

use bevy::prelude::*;

/// Sound category picked by the presentation layer's sound bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SoundCategory {
    Hit,
    Block,
    GuardBreak,
    Knockdown,
    Swing,
    Crowd,
}

/// Visual effect spawned at a contact point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum EffectKind {
    Impact,
    Block,
    GuardBreak,
    Knockdown,
}

/// Presentation cue (animation trigger / sound / effect).
#[derive(Event, Debug, Clone, PartialEq)]
pub enum FeedbackCue {
    /// Play animation trigger on an entity's animator
    Animation { entity: Entity, trigger: String },
    /// Play a sound from `category`, volume scaled by `intensity` (0..1)
    Sound {
        entity: Entity,
        category: SoundCategory,
        intensity: f32,
    },
    /// Spawn an effect at `point` oriented along `direction`
    Effect {
        kind: EffectKind,
        point: Vec3,
        direction: Vec3,
    },
}

impl FeedbackCue {
    pub fn animation(entity: Entity, trigger: impl Into<String>) -> Self {
        Self::Animation {
            entity,
            trigger: trigger.into(),
        }
    }
}

/// Physical impulse to apply on a fighter (physics engine is external).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ImpulseRequested {
    pub target: Entity,
    pub impulse: Vec3,
}

/// Haptic pulse for the striking side (a tracked hand or an opponent).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HapticPulse {
    pub source: Entity,
    /// 0..1
    pub intensity: f32,
    /// Seconds
    pub duration: f32,
}

/// Registers the outbound event channels.
pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FeedbackCue>()
            .add_event::<ImpulseRequested>()
            .add_event::<HapticPulse>();
    }
}
