//! Opponent reactions: notifications, timed task endings, target relays.

use bevy::prelude::*;

use crate::ai::{
    ControllerDisabled, FighterAttacking, Opponent, OpponentBrain, OpponentConfig, OpponentNotification,
    OpponentState, OpponentTarget, TargetSignals,
};
use crate::combat::{FighterDefeated, VulnerabilityOpened};
use crate::components::{Defeated, DefenseState};
use crate::feedback::FeedbackCue;
use crate::scheduling::{TaskKind, TimedTaskElapsed, TimedTasks};

/// System: turn fighter-level events into notifications for the opponents
/// boxing against that fighter.
///
/// - FighterAttacking → TargetAttacking
/// - VulnerabilityOpened → TargetVulnerable
/// - FighterDefeated → TargetKnockedOut
pub fn relay_target_events(
    mut attacking_events: EventReader<FighterAttacking>,
    mut vulnerability_events: EventReader<VulnerabilityOpened>,
    mut defeated_events: EventReader<FighterDefeated>,
    opponents: Query<(Entity, &OpponentTarget), With<Opponent>>,
    mut notifications: EventWriter<OpponentNotification>,
) {
    let watchers_of = |fighter: Entity| {
        opponents
            .iter()
            .filter(move |(_, target)| target.target == Some(fighter))
            .map(|(opponent, _)| opponent)
    };

    for event in attacking_events.read() {
        for opponent in watchers_of(event.fighter) {
            notifications.write(OpponentNotification::TargetAttacking { opponent });
        }
    }

    for event in vulnerability_events.read() {
        for opponent in watchers_of(event.fighter) {
            notifications.write(OpponentNotification::TargetVulnerable {
                opponent,
                duration: event.duration,
            });
        }
    }

    for event in defeated_events.read() {
        for opponent in watchers_of(event.fighter) {
            notifications.write(OpponentNotification::TargetKnockedOut { opponent });
        }
    }
}

/// System: apply inbound notifications
///
/// Defeated opponents ignore everything. Signals are debounced through
/// timed tasks: a repeated TargetAttacking extends the window.
#[allow(clippy::type_complexity)]
pub fn handle_notifications(
    mut commands: Commands,
    mut notifications: EventReader<OpponentNotification>,
    mut opponents: Query<
        (
            &mut OpponentState,
            &mut OpponentBrain,
            &mut TargetSignals,
            &mut TimedTasks,
            &mut DefenseState,
            &OpponentConfig,
        ),
        (With<Opponent>, Without<Defeated>),
    >,
    mut cues: EventWriter<FeedbackCue>,
) {
    for notification in notifications.read() {
        let opponent = notification.opponent();
        let Ok((mut state, mut brain, mut signals, mut tasks, mut defense, config)) = opponents.get_mut(opponent)
        else {
            continue;
        };

        match *notification {
            OpponentNotification::TargetAttacking { .. } => {
                signals.target_attacking = true;
                tasks.schedule(TaskKind::TargetAttackingEnd, config.target_attacking_window);
            }
            OpponentNotification::TargetVulnerable { duration, .. } => {
                signals.target_vulnerable = true;
                tasks.schedule(TaskKind::TargetVulnerableEnd, duration);
            }
            OpponentNotification::TargetKnockedOut { .. } => {
                signals.target_down = true;
                break_off_action(&mut brain, &mut tasks, &mut defense);
                *state = OpponentState::Celebrating;
                cues.write(FeedbackCue::animation(opponent, "Celebrate"));
                crate::logger::log_info(&format!("🏆 {:?} target knocked out, celebrating", opponent));
            }
            OpponentNotification::ForceRetreat { .. } => {
                if *state == OpponentState::Celebrating {
                    continue;
                }
                break_off_action(&mut brain, &mut tasks, &mut defense);
                defense.stunned = false;
                tasks.cancel(TaskKind::StunEnd);
                *state = OpponentState::Retreating;
                brain.decision_timer = config.reaction_time;
                crate::logger::log(&format!("AI: {:?} forced retreat", opponent));
            }
            OpponentNotification::Enable { .. } => {
                commands.entity(opponent).remove::<ControllerDisabled>();
                signals.target_down = false;
                if *state == OpponentState::Celebrating {
                    *state = OpponentState::Circling;
                }
                brain.decision_timer = 0.0;
                crate::logger::log(&format!("AI: {:?} enabled", opponent));
            }
            OpponentNotification::Disable { .. } => {
                commands.entity(opponent).insert(ControllerDisabled);
                break_off_action(&mut brain, &mut tasks, &mut defense);
                if state.is_busy() && *state != OpponentState::Celebrating {
                    *state = OpponentState::Circling;
                }
                crate::logger::log(&format!("AI: {:?} disabled", opponent));
            }
        }
    }
}

/// Abort whatever action is in progress (attack, block, dodge).
fn break_off_action(brain: &mut OpponentBrain, tasks: &mut TimedTasks, defense: &mut DefenseState) {
    brain.active_attack = None;
    tasks.cancel(TaskKind::AttackProbe);
    tasks.cancel(TaskKind::AttackRecovery);
    tasks.cancel(TaskKind::BlockEnd);
    tasks.cancel(TaskKind::DodgeEnd);
    defense.blocking = false;
    defense.dodging = false;
}

/// System: react to the controller's own timed tasks
///
/// - BlockEnd / DodgeEnd: drop the flag, back to Circling
/// - StunEnd: wake up and retreat
/// - TargetAttackingEnd / TargetVulnerableEnd: clear the signal
/// - AttackRecovery: attack path complete, back to Circling
/// - DefeatHandoff: controller disabled for good
pub fn handle_controller_tasks(
    mut commands: Commands,
    mut elapsed: EventReader<TimedTaskElapsed>,
    mut opponents: Query<
        (
            &mut OpponentState,
            &mut OpponentBrain,
            &mut TargetSignals,
            &mut DefenseState,
        ),
        With<Opponent>,
    >,
    mut cues: EventWriter<FeedbackCue>,
) {
    for event in elapsed.read() {
        let Ok((mut state, mut brain, mut signals, mut defense)) = opponents.get_mut(event.entity) else {
            continue;
        };

        let previous = *state;
        match event.kind {
            TaskKind::BlockEnd => {
                defense.blocking = false;
                if *state == OpponentState::Blocking {
                    *state = OpponentState::Circling;
                }
            }
            TaskKind::DodgeEnd => {
                defense.dodging = false;
                if *state == OpponentState::Dodging {
                    *state = OpponentState::Circling;
                }
            }
            TaskKind::StunEnd => {
                defense.stunned = false;
                brain.active_attack = None;
                if *state == OpponentState::Stunned {
                    *state = OpponentState::Retreating;
                    cues.write(FeedbackCue::animation(event.entity, "Recover"));
                }
            }
            TaskKind::TargetAttackingEnd => {
                signals.target_attacking = false;
            }
            TaskKind::TargetVulnerableEnd => {
                signals.target_vulnerable = false;
            }
            TaskKind::AttackRecovery => {
                brain.active_attack = None;
                if *state == OpponentState::Attacking {
                    *state = OpponentState::Circling;
                }
            }
            TaskKind::DefeatHandoff => {
                commands.entity(event.entity).insert(ControllerDisabled);
                crate::logger::log_info(&format!("AI: {:?} handed off after defeat", event.entity));
            }
            _ => {}
        }

        if previous != *state {
            crate::logger::log(&format!("AI: {:?} {:?} → {:?} ({:?})", event.entity, previous, *state, event.kind));
        }
    }
}
