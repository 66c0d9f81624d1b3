//! ECS components shared across subsystems
//!
//! Organisation by domain:
//! - actor: fighter resources and defensive flags (Fighter, Health, Stamina, DefenseState)
//! - movement: movement intent consumed by navigation (MovementCommand)
//!
//! Controller, strike and detector components live next to their systems
//! (`ai`, `combat`, `motion`).

pub mod actor;
pub mod movement;

pub use actor::*;
pub use movement::*;
