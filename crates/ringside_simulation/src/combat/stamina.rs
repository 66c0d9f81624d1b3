//! Stamina regeneration
//!
//! Runs every fixed tick on its own pulse clock (`Stamina::regen_interval`),
//! never suspended by the coarser decision cadence of the controller.
//! Spending happens at decision time (attack/dodge costs).

use bevy::prelude::*;

use crate::components::{Defeated, Stamina};

/// System: regenerate stamina for every fighter still in the match.
pub fn regenerate_stamina(
    mut query: Query<&mut Stamina, Without<Defeated>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for mut stamina in query.iter_mut() {
        stamina.regenerate(delta);
    }
}
