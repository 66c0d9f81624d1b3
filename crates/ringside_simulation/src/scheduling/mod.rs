//! Timed deferred actions (block end, stun recovery, knockdown recovery, ...).
//!
//! Every fighter owns a slot table with one slot per [`TaskKind`].
//! Scheduling a kind overwrites the pending task of the same kind, so two
//! "stop blocking" tasks can never race to clear the flag at different
//! times. `tick_timed_tasks` counts the slots down on the fixed clock and
//! emits [`TimedTaskElapsed`]; the owning subsystem reacts to the event.

use bevy::prelude::*;

/// Kinds of deferred actions. The discriminant is the slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum TaskKind {
    /// Drop the guard after a held block
    BlockEnd,
    /// Leave the dodge (i-frames over)
    DodgeEnd,
    /// Wake up from a stun, then retreat
    StunEnd,
    /// Close the vulnerability window opened by a guard break
    VulnerableEnd,
    /// Debounce window of the "target is attacking" signal
    TargetAttackingEnd,
    /// Target's vulnerability window as seen by the controller
    TargetVulnerableEnd,
    /// Attack windup finished, probe for contact
    AttackProbe,
    /// Attack cooldown path finished, controller may decide again
    AttackRecovery,
    /// Get up after a knockdown
    KnockdownEnd,
    /// Hand the defeated fighter over to presentation and disable the controller
    DefeatHandoff,
}

impl TaskKind {
    pub const COUNT: usize = 10;

    pub const ALL: [TaskKind; Self::COUNT] = [
        TaskKind::BlockEnd,
        TaskKind::DodgeEnd,
        TaskKind::StunEnd,
        TaskKind::VulnerableEnd,
        TaskKind::TargetAttackingEnd,
        TaskKind::TargetVulnerableEnd,
        TaskKind::AttackProbe,
        TaskKind::AttackRecovery,
        TaskKind::KnockdownEnd,
        TaskKind::DefeatHandoff,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Remaining time below this counts as elapsed (fixed-step float drift).
const DEADLINE_EPSILON: f32 = 1e-4;

/// Per-fighter table of pending timed tasks (seconds remaining per slot).
#[derive(Component, Debug, Clone, Default)]
pub struct TimedTasks {
    slots: [Option<f32>; TaskKind::COUNT],
}

impl TimedTasks {
    /// Schedule `kind` to fire after `delay` seconds.
    ///
    /// Returns `true` if a pending task of the same kind was cancelled.
    pub fn schedule(&mut self, kind: TaskKind, delay: f32) -> bool {
        self.slots[kind.slot()]
            .replace(delay.max(0.0))
            .is_some()
    }

    /// Cancel `kind`. Returns `true` if something was pending.
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        self.slots[kind.slot()].take().is_some()
    }

    pub fn cancel_all(&mut self) {
        self.slots = [None; TaskKind::COUNT];
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn remaining(&self, kind: TaskKind) -> Option<f32> {
        self.slots[kind.slot()]
    }

    /// Count every pending slot down by `delta`.
    ///
    /// Returns the kinds that elapsed, in slot order, and frees their slots.
    pub fn advance(&mut self, delta: f32) -> Vec<TaskKind> {
        let mut fired = Vec::new();

        for kind in TaskKind::ALL {
            let slot = &mut self.slots[kind.slot()];
            let Some(remaining) = slot.as_mut() else {
                continue;
            };

            *remaining -= delta;
            if *remaining <= DEADLINE_EPSILON {
                *slot = None;
                fired.push(kind);
            }
        }

        fired
    }
}

/// Event: a timed task elapsed on `entity`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TimedTaskElapsed {
    pub entity: Entity,
    pub kind: TaskKind,
}

/// System: count all timed tasks down and announce the elapsed ones.
pub fn tick_timed_tasks(
    mut query: Query<(Entity, &mut TimedTasks)>,
    mut elapsed_events: EventWriter<TimedTaskElapsed>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut tasks) in query.iter_mut() {
        for kind in tasks.advance(delta) {
            elapsed_events.write(TimedTaskElapsed { entity, kind });
        }
    }
}
