//! Strike Resolution Engine.
//!
//! # Pipeline
//!
//! ```text
//! StrikeRegistered (hand contact or opponent attack probe)
//!   ↓ force ≥ min_impact_force
//!   ↓ nearest zone within acceptance radius
//!   ↓ zone cooldown expired (starts a new one)
//!   ↓ block check (target blocking, point within 60° of facing)
//!   ↓ damage + tier / guard break + knockback + combo
//! TakeDamage → apply_damage
//! StrikeResolved, FeedbackCue, ImpulseRequested, HapticPulse
//! ```
//!
//! Every rejection is a silent no-op: contact data is noisy and a
//! sub-threshold or out-of-zone contact is normal, not an error.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::OpponentState;
use crate::combat::{ComboState, HitCooldownTable, HitZones, TakeDamage};
use crate::components::{Defeated, DefenseState, Fighter, KnockedDown};
use crate::feedback::{EffectKind, FeedbackCue, HapticPulse, ImpulseRequested, SoundCategory};
use crate::scheduling::{TaskKind, TimedTasks};
use crate::{DeterministicRng, MatchConfig, RandomSource};

// ============================================================================
// Configuration
// ============================================================================

/// Global thresholds of the engine (constant per match).
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeThresholds {
    pub min_impact_force: f32,
    pub heavy_threshold: f32,
    pub critical_threshold: f32,
    /// Max distance between contact point and zone anchor (meters)
    pub zone_acceptance_radius: f32,
    /// Per-zone re-hit cooldown (seconds)
    pub zone_cooldown: f32,
    pub combo_window: f32,
    pub knockback_multiplier: f32,
    /// Max angle between facing and the contact point for a block (degrees)
    pub block_angle_degrees: f32,
    pub blocked_damage_factor: f32,
    pub knockdown_chance: f32,
    pub knockdown_duration: f32,
    /// Vulnerability window opened by a guard break (seconds)
    pub guard_break_vulnerability: f32,
    pub haptic_duration: f32,
}

impl Default for StrikeThresholds {
    fn default() -> Self {
        Self {
            min_impact_force: 1.0,
            heavy_threshold: 5.0,
            critical_threshold: 10.0,
            zone_acceptance_radius: 0.35,
            zone_cooldown: 0.5,
            combo_window: 1.5,
            knockback_multiplier: 1.0,
            block_angle_degrees: 60.0,
            blocked_damage_factor: 0.2,
            knockdown_chance: 0.3,
            knockdown_duration: 3.0,
            guard_break_vulnerability: 1.5,
            haptic_duration: 0.1,
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Force classification of an unblocked strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum SeverityTier {
    Light,
    Medium,
    Heavy,
    Critical,
}

impl SeverityTier {
    /// Lower bounds are inclusive: `force == heavy_threshold` is Heavy.
    pub fn classify(force: f32, thresholds: &StrikeThresholds) -> Self {
        if force >= thresholds.critical_threshold {
            SeverityTier::Critical
        } else if force >= thresholds.heavy_threshold {
            SeverityTier::Heavy
        } else if force >= thresholds.min_impact_force * 2.0 {
            SeverityTier::Medium
        } else {
            SeverityTier::Light
        }
    }
}

/// How the strike landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HitKind {
    Clean(SeverityTier),
    Blocked,
    GuardBreak,
}

impl HitKind {
    pub fn knockback_factor(&self) -> f32 {
        match self {
            HitKind::Clean(SeverityTier::Light) => 0.5,
            HitKind::Clean(SeverityTier::Medium) => 1.0,
            HitKind::Clean(SeverityTier::Heavy) => 2.0,
            HitKind::Clean(SeverityTier::Critical) => 3.0,
            HitKind::Blocked => 0.3,
            HitKind::GuardBreak => 0.7,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, HitKind::Blocked | HitKind::GuardBreak)
    }
}

/// Why a strike was dropped. Never surfaced to the caller, only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeRejection {
    BelowMinimumForce,
    NoZoneInRange,
    ZoneOnCooldown,
    /// Target was side-stepping, the blow found nothing
    Dodged,
    TargetMissing,
    TargetDefeated,
}

// ============================================================================
// Events
// ============================================================================

/// Inbound: a physical strike made contact with `target`.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct StrikeRegistered {
    pub target: Entity,
    /// Striking side (tracked hand or attacking opponent), receives haptics
    pub source: Entity,
    pub point: Vec3,
    pub direction: Vec3,
    pub force: f32,
    /// Scripted attacks bring their own base damage; hand strikes use `round(force)`
    pub base_damage: Option<u32>,
}

/// Outbound: full outcome of an accepted strike.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct StrikeResolved {
    pub target: Entity,
    pub source: Entity,
    pub outcome: StrikeOutcome,
}

/// Outbound: a vulnerability window opened on `fighter`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct VulnerabilityOpened {
    pub fighter: Entity,
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrikeOutcome {
    pub zone: String,
    pub reaction_cue: String,
    pub score: u32,
    pub kind: HitKind,
    pub damage: u32,
    /// Direction × magnitude
    pub knockback: Vec3,
    pub knockdown: bool,
    pub combo_count: u32,
    pub haptic_intensity: f32,
}

// ============================================================================
// Pure resolution
// ============================================================================

/// Strike as seen by the engine.
#[derive(Debug, Clone, Copy)]
pub struct StrikeInput {
    pub point: Vec3,
    pub direction: Vec3,
    pub force: f32,
    pub base_damage: Option<u32>,
}

impl From<&StrikeRegistered> for StrikeInput {
    fn from(event: &StrikeRegistered) -> Self {
        Self {
            point: event.point,
            direction: event.direction,
            force: event.force,
            base_damage: event.base_damage,
        }
    }
}

/// Target state touched by one resolution.
pub struct StrikeTarget<'a> {
    pub transform: &'a Transform,
    pub zones: &'a HitZones,
    pub blocking: bool,
    pub dodging: bool,
    pub cooldowns: &'a mut HitCooldownTable,
    pub combo: &'a mut ComboState,
}

/// Blocked iff the contact point lies within `max_angle` of the facing
/// direction, measured on the horizontal plane.
pub fn is_within_guard(transform: &Transform, point: Vec3, max_angle_degrees: f32) -> bool {
    let facing = flatten(transform.forward().as_vec3());
    let to_point = flatten(point - transform.translation);

    if to_point == Vec3::ZERO {
        return true; // Dead centre
    }
    if facing == Vec3::ZERO {
        return false;
    }

    facing.angle_between(to_point).to_degrees() < max_angle_degrees
}

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

/// Resolve one strike against one target.
///
/// Mutates the target's zone cooldowns and combo only on acceptance.
pub fn resolve_strike(
    input: &StrikeInput,
    target: StrikeTarget<'_>,
    thresholds: &StrikeThresholds,
    now: f32,
    rng: &mut impl RandomSource,
) -> Result<StrikeOutcome, StrikeRejection> {
    if input.force < thresholds.min_impact_force {
        return Err(StrikeRejection::BelowMinimumForce);
    }

    let (zone_index, _) = target
        .zones
        .nearest(target.transform, input.point, thresholds.zone_acceptance_radius)
        .ok_or(StrikeRejection::NoZoneInRange)?;
    let zone = &target.zones.zones[zone_index];

    if target.dodging {
        return Err(StrikeRejection::Dodged);
    }
    if !target.cooldowns.is_ready(&zone.name, now) {
        return Err(StrikeRejection::ZoneOnCooldown);
    }
    target.cooldowns.start(&zone.name, now, thresholds.zone_cooldown);

    let blocked = target.blocking
        && is_within_guard(target.transform, input.point, thresholds.block_angle_degrees);

    let base = input.base_damage.unwrap_or_else(|| input.force.round() as u32) as f32;
    let (kind, damage) = if blocked {
        let reduced = (base * zone.damage_multiplier * thresholds.blocked_damage_factor).round() as u32;
        if input.force > thresholds.heavy_threshold {
            (HitKind::GuardBreak, reduced)
        } else {
            (HitKind::Blocked, reduced)
        }
    } else {
        let tier = SeverityTier::classify(input.force, thresholds);
        (HitKind::Clean(tier), (base * zone.damage_multiplier).round() as u32)
    };

    let knockdown = kind == HitKind::Clean(SeverityTier::Critical)
        && rng.chance(thresholds.knockdown_chance);

    let knockback_magnitude = input.force * thresholds.knockback_multiplier * kind.knockback_factor();
    let knockback = input.direction.normalize_or_zero() * knockback_magnitude;

    let combo_count = target.combo.register_hit(now, thresholds.combo_window);
    target.combo.add_score(zone.score);

    let mut haptic_intensity = (input.force / thresholds.critical_threshold).clamp(0.0, 1.0);
    if kind == HitKind::Blocked {
        haptic_intensity *= 0.5;
    }

    Ok(StrikeOutcome {
        zone: zone.name.clone(),
        reaction_cue: zone.reaction_cue.clone(),
        score: zone.score,
        kind,
        damage,
        knockback,
        knockdown,
        combo_count,
        haptic_intensity,
    })
}

// ============================================================================
// System
// ============================================================================

/// System: resolve every registered strike and fan out its effects.
///
/// A strike that lands while the target's controller is attacking is
/// flagged as a counter hit for the stun roll in `apply_damage`.
#[allow(clippy::too_many_arguments)]
pub fn resolve_strikes(
    mut commands: Commands,
    mut strikes: EventReader<StrikeRegistered>,
    mut targets: Query<
        (
            &Transform,
            &HitZones,
            &mut HitCooldownTable,
            &mut ComboState,
            &mut DefenseState,
            &mut TimedTasks,
            Option<&mut OpponentState>,
            Has<Defeated>,
        ),
        With<Fighter>,
    >,
    config: Res<MatchConfig>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
    mut resolved_events: EventWriter<StrikeResolved>,
    mut damage_events: EventWriter<TakeDamage>,
    mut vulnerability_events: EventWriter<VulnerabilityOpened>,
    mut cues: EventWriter<FeedbackCue>,
    mut impulses: EventWriter<ImpulseRequested>,
    mut haptics: EventWriter<HapticPulse>,
) {
    let thresholds = &config.thresholds;
    let now = time.elapsed_secs();

    for strike in strikes.read() {
        let Ok((transform, zones, mut cooldowns, mut combo, mut defense, mut tasks, mut state, defeated)) =
            targets.get_mut(strike.target)
        else {
            crate::logger::log(&format!(
                "Strike on {:?} dropped: {:?}",
                strike.target,
                StrikeRejection::TargetMissing
            ));
            continue;
        };

        if defeated {
            crate::logger::log(&format!(
                "Strike on {:?} dropped: {:?}",
                strike.target,
                StrikeRejection::TargetDefeated
            ));
            continue;
        }

        let target = StrikeTarget {
            transform,
            zones,
            blocking: defense.blocking,
            dodging: defense.dodging,
            cooldowns: &mut cooldowns,
            combo: &mut combo,
        };

        let outcome = match resolve_strike(&StrikeInput::from(strike), target, thresholds, now, &mut *rng) {
            Ok(outcome) => outcome,
            Err(reason) => {
                crate::logger::log(&format!(
                    "Strike {:?} → {:?} dropped: {:?} (force {:.2})",
                    strike.source, strike.target, reason, strike.force
                ));
                continue;
            }
        };

        crate::logger::log_info(&format!(
            "🥊 {:?} → {:?}: {} {:?}, {} dmg, combo x{}",
            strike.source, strike.target, outcome.zone, outcome.kind, outcome.damage, outcome.combo_count
        ));

        let is_counter = matches!(state.as_deref(), Some(OpponentState::Attacking));
        damage_events.write(TakeDamage {
            target: strike.target,
            attacker: Some(strike.source),
            amount: outcome.damage,
            direction: strike.direction,
            is_counter,
            pre_mitigated: true,
            guard_broken: outcome.kind == HitKind::GuardBreak,
        });

        match outcome.kind {
            HitKind::Clean(_) => {
                cues.write(FeedbackCue::animation(strike.target, outcome.reaction_cue.clone()));
                cues.write(FeedbackCue::Sound {
                    entity: strike.target,
                    category: SoundCategory::Hit,
                    intensity: outcome.haptic_intensity,
                });
                cues.write(FeedbackCue::Effect {
                    kind: EffectKind::Impact,
                    point: strike.point,
                    direction: strike.direction,
                });
            }
            HitKind::Blocked => {
                cues.write(FeedbackCue::animation(strike.target, "Block"));
                cues.write(FeedbackCue::Sound {
                    entity: strike.target,
                    category: SoundCategory::Block,
                    intensity: outcome.haptic_intensity,
                });
                cues.write(FeedbackCue::Effect {
                    kind: EffectKind::Block,
                    point: strike.point,
                    direction: strike.direction,
                });
            }
            HitKind::GuardBreak => {
                defense.blocking = false;
                tasks.cancel(TaskKind::BlockEnd);
                // BlockEnd was the only way out of Blocking
                if let Some(state) = state.as_mut() {
                    if **state == OpponentState::Blocking {
                        **state = OpponentState::Circling;
                    }
                }
                defense.vulnerable = true;
                tasks.schedule(TaskKind::VulnerableEnd, thresholds.guard_break_vulnerability);
                vulnerability_events.write(VulnerabilityOpened {
                    fighter: strike.target,
                    duration: thresholds.guard_break_vulnerability,
                });

                cues.write(FeedbackCue::animation(strike.target, "GuardBreak"));
                cues.write(FeedbackCue::Sound {
                    entity: strike.target,
                    category: SoundCategory::GuardBreak,
                    intensity: outcome.haptic_intensity,
                });
                cues.write(FeedbackCue::Effect {
                    kind: EffectKind::GuardBreak,
                    point: strike.point,
                    direction: strike.direction,
                });
                crate::logger::log_info(&format!(
                    "💥 Guard break on {:?}, vulnerable for {:.1}s",
                    strike.target, thresholds.guard_break_vulnerability
                ));
            }
        }

        if outcome.knockdown {
            commands.entity(strike.target).insert(KnockedDown);
            tasks.cancel(TaskKind::AttackProbe);
            tasks.schedule(TaskKind::KnockdownEnd, thresholds.knockdown_duration);

            cues.write(FeedbackCue::animation(strike.target, "Knockdown"));
            cues.write(FeedbackCue::Sound {
                entity: strike.target,
                category: SoundCategory::Knockdown,
                intensity: 1.0,
            });
            cues.write(FeedbackCue::Effect {
                kind: EffectKind::Knockdown,
                point: strike.point,
                direction: strike.direction,
            });
            crate::logger::log_info(&format!("⬇️ {:?} knocked down", strike.target));
        }

        impulses.write(ImpulseRequested {
            target: strike.target,
            impulse: outcome.knockback,
        });
        haptics.write(HapticPulse {
            source: strike.source,
            intensity: outcome.haptic_intensity,
            duration: thresholds.haptic_duration,
        });

        resolved_events.write(StrikeResolved {
            target: strike.target,
            source: strike.source,
            outcome,
        });
    }
}
