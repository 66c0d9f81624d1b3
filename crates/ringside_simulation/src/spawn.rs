//! Bundles for fighters and tracked hands, built from a MatchConfig.

use bevy::prelude::*;

use crate::ai::{Opponent, OpponentTarget};
use crate::combat::{HitCooldownTable, HitZones, StrikeRepertoire};
use crate::components::{Fighter, Health, Stamina};
use crate::motion::StrikeDetector;
use crate::MatchConfig;

fn fighter_resources(config: &MatchConfig) -> (Health, Stamina) {
    let fighter = &config.fighter;
    (
        Health::new(fighter.max_health),
        Stamina::new(fighter.max_stamina).with_regen(fighter.stamina_regen_amount, fighter.stamina_regen_interval),
    )
}

/// Opponent controlled by the decision cycle, boxing against `target`.
///
/// The opponent turns to face its target every tick; `position` only sets
/// where it stands.
pub fn opponent_bundle(config: &MatchConfig, position: Vec3, target: Option<Entity>) -> impl Bundle {
    let (health, stamina) = fighter_resources(config);
    (
        Opponent,
        Fighter::opponent(),
        health,
        stamina,
        HitZones::new(config.zones.clone()),
        HitCooldownTable::for_zones(&config.zones),
        config.opponent.clone(),
        StrikeRepertoire::new(config.repertoire.clone()),
        OpponentTarget { target },
        Transform::from_translation(position),
    )
}

/// Player fighter (health model only, no controller).
pub fn player_bundle(config: &MatchConfig, transform: Transform) -> impl Bundle {
    let (health, stamina) = fighter_resources(config);
    (
        Fighter::player(),
        health,
        stamina,
        HitZones::new(config.zones.clone()),
        HitCooldownTable::for_zones(&config.zones),
        transform,
    )
}

/// Tracked hand belonging to `owner`.
pub fn hand_bundle(config: &MatchConfig, owner: Entity, position: Vec3) -> impl Bundle {
    (
        StrikeDetector::new(owner, config.detector.clone()),
        Transform::from_translation(position),
    )
}
