//! Movement intent: the controller decides, navigation executes.

use bevy::prelude::*;

/// Movement command for a fighter (executed by an external navigation layer).
///
/// - ECS writes MovementCommand (high-level intent)
/// - The presentation layer converts it into steering/path following
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub enum MovementCommand {
    /// Hold position (keep the previous navigation target untouched)
    #[default]
    Idle,
    /// Move toward a world point
    MoveToPosition { target: Vec3 },
    /// Stop immediately (drop velocity)
    Stop,
}

/// Movement speed in meters per second, read by the navigation layer.
#[derive(Component, Clone, Copy, Debug)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 1.5 }
    }
}
