//! RINGSIDE Simulation Core
//!
//! Headless combat core of a VR boxing match on Bevy 0.16 ECS:
//! - Motion-to-Strike Detector: tracked hand motion → strikes
//! - Strike Resolution Engine: contact → zone, block, damage, knockback, combo
//! - Opponent Controller: decision cycle, attacks, blocks, dodges, recovery
//!
//! Presentation (animation, sound, effects, physics impulses, haptics,
//! navigation) consumes the outbound events and `MovementCommand`.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod feedback;
pub mod logger;
pub mod motion;
pub mod scheduling;
pub mod spawn;

pub use ai::{Opponent, OpponentConfig, OpponentNotification, OpponentPlugin, OpponentState};
pub use combat::{
    CombatPlugin, DamageDealt, FighterDefeated, HitKind, SeverityTier, StrikeRegistered, StrikeResolved,
    StrikeThresholds, TakeDamage,
};
pub use components::*;
pub use config::{ConfigError, FighterConfig, MatchConfig};
pub use feedback::{FeedbackCue, FeedbackPlugin, HapticPulse, ImpulseRequested};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use motion::{HandContact, MotionPlugin, StrikeDetector};
pub use scheduling::{TaskKind, TimedTaskElapsed, TimedTasks};
pub use spawn::{hand_bundle, opponent_bundle, player_bundle};

/// Simulation tick rate (FixedUpdate)
pub const TICK_HZ: f64 = 60.0;

/// Phases of one fixed tick, chained in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Hand sampling and contacts
    Sense,
    /// Timed tasks, stamina regen, cooldowns
    Timers,
    /// Combat windows closing (vulnerability, knockdown, defeat hand-off)
    Windows,
    /// Opponent notifications, probes and decisions
    Decide,
    /// Strike resolution
    Resolve,
    /// Damage application
    Apply,
}

/// Main simulation plugin (combines all subsystems)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .init_resource::<DeterministicRng>()
            .init_resource::<MatchConfig>()
            .add_event::<TimedTaskElapsed>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Sense,
                    SimulationSet::Timers,
                    SimulationSet::Windows,
                    SimulationSet::Decide,
                    SimulationSet::Resolve,
                    SimulationSet::Apply,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                scheduling::tick_timed_tasks
                    .in_set(SimulationSet::Timers)
                    .before(combat::regenerate_stamina),
            )
            .add_plugins((FeedbackPlugin, MotionPlugin, CombatPlugin, OpponentPlugin));
    }
}

/// Source of randomness for decisions and rolls.
///
/// Everything derives from [`RandomSource::next_unit`], so a test can script
/// exact draws.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`
    fn next_unit(&mut self) -> f32;

    fn chance(&mut self, probability: f32) -> bool {
        self.next_unit() < probability
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_unit()
    }

    /// Uniform index in `0..len` (0 for an empty range)
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_unit() * len as f32) as usize).min(len - 1)
    }
}

/// Deterministic RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

impl RandomSource for DeterministicRng {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// Creates a minimal Bevy App for headless simulation.
///
/// Virtual time advances by exactly one fixed step per `App::update`, so
/// every update after the first runs one FixedUpdate tick. The first
/// update only starts the clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / TICK_HZ)));

    app
}

/// Run `ticks` fixed ticks (plus the clock-starting update on a fresh app).
pub fn run_ticks(app: &mut App, ticks: usize) {
    if app.world().resource::<Time<Real>>().first_update().is_none() {
        app.update();
    }
    for _ in 0..ticks {
        app.update();
    }
}

/// World snapshot for determinism comparison
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Sort by entity index for a stable order
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
