//! Combo bookkeeping on the struck fighter.

use bevy::prelude::*;

/// Streak of accepted hits landed within `combo_window` of each other.
///
/// Invariant: a hit within the window of the previous one increments
/// `count`, otherwise the streak restarts at 1.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ComboState {
    pub count: u32,
    /// Fixed-clock time of the last accepted hit
    pub last_hit_time: Option<f32>,
    /// Longest streak this match
    pub best: u32,
    /// Sum of zone scores of all accepted hits
    pub total_score: u32,
}

impl ComboState {
    /// Record an accepted hit at `now`; returns the new streak length.
    pub fn register_hit(&mut self, now: f32, combo_window: f32) -> u32 {
        self.count = match self.last_hit_time {
            Some(last) if now - last <= combo_window => self.count + 1,
            _ => 1,
        };
        self.last_hit_time = Some(now);
        self.best = self.best.max(self.count);
        self.count
    }

    pub fn add_score(&mut self, score: u32) {
        self.total_score = self.total_score.saturating_add(score);
    }
}
