use glam::DVec2;

use crate::narrowphase;
use crate::types::{Category, EntityId, GeometryType, HitscanImpact, HitscanResult};
use crate::world::PhysicsEngine;

impl PhysicsEngine {
    /// Combined scan from `origin` along the displacement `distance`.
    ///
    /// Resolves both the first eligible entity and the first solid geometry
    /// sample; when both lie along the ray, the earlier impact wins and the
    /// later entity hit is dropped.
    pub fn calculate_hitscan(
        &self,
        origin: DVec2,
        distance: DVec2,
        kind: Category,
    ) -> HitscanResult {
        let geometry_impact = self.hitscan_impact_geometry(origin, distance);
        let mut entity = self.hitscan_impact(origin, distance, kind);

        // Geometry impact on the same [0, 1] time scale, measured on the
        // major axis.
        let major = distance.x.abs().max(distance.y.abs());
        if major > 0.0 {
            let geo_time = geometry_impact.x.abs().max(geometry_impact.y.abs()) / major;
            if geo_time < 1.0 && entity.as_ref().is_some_and(|hit| geo_time < hit.time) {
                entity = None;
            }
        }
        HitscanResult {
            entity,
            geometry_impact,
        }
    }

    /// First entity struck by a zero-size point swept along `distance`.
    ///
    /// `kind` is the category of whatever fired the scan: player-side scans
    /// never hit players, enemy-side scans never hit enemies, and
    /// [`Category::Environment`] scans hit everyone. ENVIRONMENT entities are
    /// eligible targets for every scan; projectiles never are.
    pub fn hitscan_impact(
        &self,
        origin: DVec2,
        distance: DVec2,
        kind: Category,
    ) -> Option<HitscanImpact> {
        let skip_players = matches!(kind, Category::Player | Category::PlayerProjectile);
        let skip_enemies = matches!(kind, Category::Enemy | Category::EnemyProjectile);

        let mut best = None;
        if !skip_players {
            self.scan_entities(origin, distance, &self.players, &mut best);
        }
        if !skip_enemies {
            self.scan_entities(origin, distance, &self.enemies, &mut best);
        }
        self.scan_entities(origin, distance, &self.environment, &mut best);
        best
    }

    fn scan_entities(
        &self,
        origin: DVec2,
        distance: DVec2,
        ids: &[EntityId],
        best: &mut Option<HitscanImpact>,
    ) {
        for &id in ids {
            let Some(handle) = self.entity(id) else {
                continue;
            };
            let Ok(e) = handle.lock() else {
                continue;
            };
            let min = e.loc() - e.half_extents();
            let max = e.loc() + e.half_extents();
            if let Some((time, _)) = narrowphase::sweep_point_aabb(origin, distance, min, max)
                && time < 1.0
                && best.as_ref().is_none_or(|b| time < b.time)
            {
                *best = Some(HitscanImpact {
                    entity: id,
                    time,
                    point: origin + distance * time,
                });
            }
        }
    }

    /// Tile-imprecise geometry impact.
    ///
    /// Steps one tile at a time along the dominant axis of `distance`,
    /// sampling the tile under the stepped point; the first `Full` or
    /// out-of-bounds sample wins. One-way tiles are transparent to scans.
    /// Returns the offset from `origin` to the winning sample, or `distance`
    /// unchanged when nothing solid lies along the ray. The stepping
    /// overshoots the ray end by one sample.
    pub fn hitscan_impact_geometry(&self, origin: DVec2, distance: DVec2) -> DVec2 {
        let major = distance.x.abs().max(distance.y.abs());
        if major == 0.0 {
            return distance;
        }
        let step = distance / major;
        let steps = major as i32 + 1;
        for i in 0..=steps {
            let p = origin + step * i as f64;
            let tile = (p.x.floor() as i32, p.y.floor() as i32);
            if self.geometry_type(tile.0, tile.1) == GeometryType::Full {
                return p - origin;
            }
        }
        distance
    }
}
