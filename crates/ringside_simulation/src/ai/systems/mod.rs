//! Opponent controller systems

pub mod attack;
pub mod decision;
pub mod movement;
pub mod reactions;

// Re-export all systems
pub use attack::*;
pub use decision::*;
pub use movement::*;
pub use reactions::*;
