//! Decision cycle of the opponent controller (pure functions).
//!
//! Systems gather a [`DecisionContext`] from ECS state, call [`decide`]
//! with the match RNG and apply the returned [`Decision`]. Keeping the
//! branching free of ECS makes every branch reachable from tests with a
//! scripted random source.

use crate::ai::{CircleSide, OpponentConfig, OpponentTraits, TargetSignals};
use crate::combat::StrikeProfile;
use crate::RandomSource;

/// Per-cycle jitter of the reaction time (±30%)
pub const REACTION_JITTER_MIN: f32 = 0.7;
pub const REACTION_JITTER_MAX: f32 = 1.3;

/// Snapshot of everything a decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext {
    /// Horizontal distance to the target (meters)
    pub distance: f32,
    pub stamina: u32,
    pub stunned: bool,
    /// Attack cooldown elapsed
    pub attack_ready: bool,
    pub signals: TargetSignals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvasiveAction {
    Block,
    Dodge,
}

/// Outcome of one decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Stunned: stay put, the stun task ends it
    HoldStun,
    /// Target is swinging: block or dodge
    Evade(EvasiveAction),
    /// Target is vulnerable: attack now, cooldown ignored
    CounterAttack,
    Approach,
    Retreat,
    Attack,
    /// Circle, optionally switching sides
    Circle { side: Option<CircleSide> },
}

/// Run one decision cycle.
///
/// Branch order:
/// 1. Stunned → hold
/// 2. Target attacking and `rand > 1 − difficulty` → block (weighted) or dodge
/// 3. Target vulnerable, difficulty roll, in reach, stamina ≥ floor → counter-attack
/// 4. Distance band: too far → approach, too close → mostly retreat,
///    in range → attack / approach / circle by one aggressiveness draw
pub fn decide(
    ctx: &DecisionContext,
    config: &OpponentConfig,
    traits: &OpponentTraits,
    rng: &mut impl RandomSource,
) -> Decision {
    if ctx.stunned {
        return Decision::HoldStun;
    }

    if ctx.signals.target_attacking && rng.next_unit() > 1.0 - config.difficulty {
        let action = if rng.chance(config.block_weight) {
            EvasiveAction::Block
        } else {
            EvasiveAction::Dodge
        };
        // Too tired to dodge, cover up instead
        if action == EvasiveAction::Dodge && ctx.stamina < config.dodge_cost {
            return Decision::Evade(EvasiveAction::Block);
        }
        return Decision::Evade(action);
    }

    let has_attack_stamina = ctx.stamina >= config.attack_stamina_floor;

    if ctx.signals.target_vulnerable
        && rng.chance(config.difficulty)
        && ctx.distance <= config.max_attack_distance
        && has_attack_stamina
    {
        return Decision::CounterAttack;
    }

    let can_attack = ctx.attack_ready && has_attack_stamina;

    if ctx.distance > config.max_attack_distance {
        return Decision::Approach;
    }

    if ctx.distance < config.min_attack_distance {
        if rng.chance(config.retreat_chance) {
            return Decision::Retreat;
        }
        if can_attack {
            return Decision::Attack;
        }
        return Decision::Circle { side: None };
    }

    let r = rng.next_unit();
    if r < traits.aggressiveness && can_attack {
        Decision::Attack
    } else if r >= traits.aggressiveness && r < traits.aggressiveness + config.approach_band {
        Decision::Approach
    } else {
        Decision::Circle {
            side: Some(pick_circle_side(rng)),
        }
    }
}

pub fn pick_circle_side(rng: &mut impl RandomSource) -> CircleSide {
    if rng.chance(0.5) {
        CircleSide::Left
    } else {
        CircleSide::Right
    }
}

/// Pick a strike profile for the current distance and stamina.
///
/// Candidates are the single strikes in range and affordable. From
/// `combo_min_difficulty` up, a `difficulty` roll also admits combo
/// profiles. Returns the index into `profiles`; `None` when nothing fits.
pub fn select_strike(
    profiles: &[StrikeProfile],
    distance: f32,
    stamina: u32,
    config: &OpponentConfig,
    rng: &mut impl RandomSource,
) -> Option<usize> {
    let usable = |profile: &StrikeProfile| profile.in_range(distance) && profile.is_affordable(stamina);

    let mut candidates: Vec<usize> = profiles
        .iter()
        .enumerate()
        .filter(|(_, profile)| !profile.combo && usable(profile))
        .map(|(index, _)| index)
        .collect();

    if config.difficulty >= config.combo_min_difficulty && rng.chance(config.difficulty) {
        candidates.extend(
            profiles
                .iter()
                .enumerate()
                .filter(|(_, profile)| profile.combo && usable(profile))
                .map(|(index, _)| index),
        );
    }

    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.pick_index(candidates.len())])
}

/// Seconds until the next decision cycle.
pub fn next_decision_interval(reaction_time: f32, rng: &mut impl RandomSource) -> f32 {
    reaction_time * rng.range(REACTION_JITTER_MIN, REACTION_JITTER_MAX)
}

/// Jitter a base trait within ±`variance`, clamped to 0..1.
pub fn roll_trait(base: f32, variance: f32, rng: &mut impl RandomSource) -> f32 {
    (base + rng.range(-variance, variance)).clamp(0.0, 1.0)
}
