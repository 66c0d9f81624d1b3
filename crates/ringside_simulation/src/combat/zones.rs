//! Hit zones and the per-zone hit cooldown table.
//!
//! A fighter carries a handful of zones (head, body, ...) anchored relative
//! to its transform. Contact points are matched to the nearest anchor with a
//! hard acceptance radius; a linear scan is enough for ≤10 zones.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named hit region with its own multiplier and reaction.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct HitZone {
    pub name: String,
    /// Anchor offset in the fighter's local space
    pub anchor: Vec3,
    pub damage_multiplier: f32,
    /// Animation trigger played on the struck fighter
    pub reaction_cue: String,
    pub score: u32,
}

impl HitZone {
    pub fn new(
        name: impl Into<String>,
        anchor: Vec3,
        damage_multiplier: f32,
        reaction_cue: impl Into<String>,
        score: u32,
    ) -> Self {
        Self {
            name: name.into(),
            anchor,
            damage_multiplier,
            reaction_cue: reaction_cue.into(),
            score,
        }
    }
}

/// Boxing preset: head and body.
pub fn default_hit_zones() -> Vec<HitZone> {
    vec![
        HitZone::new("head", Vec3::new(0.0, 1.65, 0.0), 1.5, "HitHead", 20),
        HitZone::new("body", Vec3::new(0.0, 1.25, 0.0), 1.0, "HitBody", 10),
    ]
}

/// Zones of a fighter.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct HitZones {
    pub zones: Vec<HitZone>,
}

impl HitZones {
    pub fn new(zones: Vec<HitZone>) -> Self {
        Self { zones }
    }

    /// World-space anchor of a zone.
    pub fn world_anchor(&self, transform: &Transform, index: usize) -> Option<Vec3> {
        self.zones
            .get(index)
            .map(|zone| transform.transform_point(zone.anchor))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.zones.iter().position(|zone| zone.name == name)
    }

    /// Nearest zone to `point`, if its anchor is within `max_distance`.
    ///
    /// Returns `(zone index, distance)`.
    pub fn nearest(
        &self,
        transform: &Transform,
        point: Vec3,
        max_distance: f32,
    ) -> Option<(usize, f32)> {
        let mut nearest: Option<(usize, f32)> = None;

        for (index, zone) in self.zones.iter().enumerate() {
            let distance = transform.transform_point(zone.anchor).distance(point);
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((index, distance)),
            }
        }

        nearest.filter(|(_, distance)| *distance <= max_distance)
    }
}

/// Next time (seconds of fixed clock) each zone may register a hit.
///
/// Stops one continuous swing from landing on every contact frame.
#[derive(Component, Debug, Clone, Default)]
pub struct HitCooldownTable {
    ready_at: HashMap<String, f32>,
}

impl HitCooldownTable {
    pub fn for_zones(zones: &[HitZone]) -> Self {
        let mut table = Self::default();
        table.register(zones);
        table
    }

    /// Create an entry (ready immediately) for every zone not yet present.
    pub fn register(&mut self, zones: &[HitZone]) {
        for zone in zones {
            self.ready_at.entry(zone.name.clone()).or_insert(0.0);
        }
    }

    pub fn ready_at(&self, zone: &str) -> f32 {
        self.ready_at.get(zone).copied().unwrap_or(0.0)
    }

    pub fn is_ready(&self, zone: &str, now: f32) -> bool {
        now >= self.ready_at(zone)
    }

    pub fn start(&mut self, zone: &str, now: f32, cooldown: f32) {
        self.ready_at.insert(zone.to_string(), now + cooldown);
    }

    pub fn len(&self) -> usize {
        self.ready_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready_at.is_empty()
    }
}

/// System: create cooldown entries for freshly spawned zone sets.
pub fn prepare_hit_cooldowns(
    mut query: Query<(&HitZones, &mut HitCooldownTable), Changed<HitZones>>,
) {
    for (zones, mut table) in query.iter_mut() {
        table.register(&zones.zones);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> HitZones {
        HitZones::new(default_hit_zones())
    }

    #[test]
    fn test_nearest_zone_picks_closest_anchor() {
        let transform = Transform::from_xyz(2.0, 0.0, 0.0);
        let zones = zones();

        let (head, _) = zones
            .nearest(&transform, Vec3::new(2.0, 1.7, 0.1), 0.35)
            .expect("head in range");
        assert_eq!(zones.zones[head].name, "head");

        let (body, _) = zones
            .nearest(&transform, Vec3::new(2.1, 1.2, 0.0), 0.35)
            .expect("body in range");
        assert_eq!(zones.zones[body].name, "body");
    }

    #[test]
    fn test_contact_outside_acceptance_radius_has_no_zone() {
        let transform = Transform::IDENTITY;
        let zones = zones();

        // Knee height, far from both anchors
        assert!(zones.nearest(&transform, Vec3::new(0.0, 0.5, 0.0), 0.35).is_none());
        // Over the head
        assert!(zones.nearest(&transform, Vec3::new(0.0, 2.5, 0.0), 0.35).is_none());
    }

    #[test]
    fn test_anchors_follow_rotation() {
        let zones = HitZones::new(vec![HitZone::new("lead_shoulder", Vec3::new(0.3, 1.4, 0.0), 0.8, "HitShoulder", 5)]);
        let transform = Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));

        let anchor = zones.world_anchor(&transform, 0).unwrap();
        assert!((anchor - Vec3::new(0.0, 1.4, -0.3)).length() < 1e-4, "anchor = {:?}", anchor);
    }

    #[test]
    fn test_cooldown_table_has_entry_per_zone() {
        let table = HitCooldownTable::for_zones(&default_hit_zones());
        assert_eq!(table.len(), 2);
        assert!(table.is_ready("head", 0.0));
    }

    #[test]
    fn test_cooldown_table_blocks_until_expiry() {
        let mut table = HitCooldownTable::for_zones(&default_hit_zones());
        table.start("head", 1.0, 0.5);

        assert!(!table.is_ready("head", 1.2));
        assert!(table.is_ready("body", 1.2)); // Other zones unaffected
        assert!(table.is_ready("head", 1.5));
    }
}
