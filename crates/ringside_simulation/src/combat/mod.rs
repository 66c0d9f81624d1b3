//! Combat module: Strike Resolution Engine + damage model
//!
//! ECS responsibility:
//! - Game state: Health, Stamina, DefenseState, zone cooldowns, combos
//! - Combat rules: zone lookup, block / guard break, severity tiers, knockback
//! - Events: StrikeRegistered → StrikeResolved / TakeDamage → DamageDealt / FighterDefeated
//!
//! Presentation responsibility:
//! - Contact detection (hand colliders, hit probes), animation, sound, physics impulses

use bevy::prelude::*;

pub mod combo;
pub mod damage;
pub mod profile;
pub mod resolution;
pub mod stamina;
pub mod zones;


pub use combo::ComboState;
pub use damage::{
    apply_damage, expire_combat_windows, mitigate_damage, DamageDealt, FighterDefeated, Mitigation,
    TakeDamage,
};
pub use profile::{default_repertoire, StrikeProfile, StrikeRepertoire};
pub use resolution::{
    is_within_guard, resolve_strike, resolve_strikes, HitKind, SeverityTier, StrikeInput,
    StrikeOutcome, StrikeRegistered, StrikeRejection, StrikeResolved, StrikeTarget,
    StrikeThresholds, VulnerabilityOpened,
};
pub use stamina::regenerate_stamina;
pub use zones::{default_hit_zones, prepare_hit_cooldowns, HitCooldownTable, HitZone, HitZones};

use crate::SimulationSet;

/// Combat Plugin
///
/// Registers combat events and systems in FixedUpdate.
///
/// Order:
/// 1. Timers: prepare_hit_cooldowns, regenerate_stamina
/// 2. Windows: expire_combat_windows (vulnerability / knockdown / hand-off)
/// 3. Resolve: resolve_strikes
/// 4. Apply: apply_damage
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StrikeRegistered>()
            .add_event::<StrikeResolved>()
            .add_event::<VulnerabilityOpened>()
            .add_event::<TakeDamage>()
            .add_event::<DamageDealt>()
            .add_event::<FighterDefeated>();

        app.add_systems(
            FixedUpdate,
            (
                (prepare_hit_cooldowns, regenerate_stamina)
                    .chain()
                    .in_set(SimulationSet::Timers),
                expire_combat_windows.in_set(SimulationSet::Windows),
                resolve_strikes.in_set(SimulationSet::Resolve),
                apply_damage.in_set(SimulationSet::Apply),
            ),
        );
    }
}
