use std::sync::{Arc, Mutex};

use glam::DVec2;

use crate::types::{MovingCollision, SweptCollision};

/// Shared handle to a simulated entity.
///
/// The engine keeps one clone in its arena; the host may keep others. The
/// per-entity lock is held for the duration of that entity's integration and
/// across both deliveries of a pair report, so host reads between ticks see a
/// consistent snapshot.
pub type EntityHandle = Arc<Mutex<dyn DynamicEntity>>;

/// Capability contract an entity must satisfy to be simulated.
///
/// The required methods expose kinematic state and the collision-report sink;
/// the provided methods are the kinematics every entity shares, expressed
/// through the accessors so an implementor may override any of them.
pub trait DynamicEntity: Send {
    // --- Required state ------------------------------------------------------

    /// Center of the entity's AABB, in tiles.
    fn loc(&self) -> DVec2;
    fn set_loc(&mut self, loc: DVec2);

    /// Velocity in tiles per second.
    fn speed(&self) -> DVec2;
    fn set_speed(&mut self, speed: DVec2);

    /// Half-extents of the centered AABB.
    fn half_extents(&self) -> DVec2;

    fn affected_by_gravity(&self) -> bool;

    /// Whether the integrator pushes this entity out of solid tiles. When
    /// false the entity only receives overlap reports.
    fn pushed_by_geometry(&self) -> bool;

    /// Integrate the entity's own acceleration state into its speed,
    /// including any self-supplied deceleration (friction), capped to the
    /// entity's own limits.
    fn apply_accelerations(&mut self, dt: f64);

    /// Sink for pairwise collision reports.
    fn moving_collision_occured(&mut self, collision: MovingCollision);

    // --- Provided kinematics -------------------------------------------------

    fn half_width(&self) -> f64 {
        self.half_extents().x
    }

    fn half_height(&self) -> f64 {
        self.half_extents().y
    }

    /// Full extent along X.
    fn width(&self) -> f64 {
        self.half_extents().x * 2.0
    }

    /// Full extent along Y.
    fn height(&self) -> f64 {
        self.half_extents().y * 2.0
    }

    /// Add a vertical impulse, clamped so downward speed never exceeds
    /// `terminal_velocity`.
    fn apply_gravity_impulse(&mut self, dv: f64, terminal_velocity: f64) {
        let mut speed = self.speed();
        speed.y = (speed.y + dv).min(terminal_velocity);
        self.set_speed(speed);
    }

    /// Advance the position by `speed * dt`.
    fn apply_speeds(&mut self, dt: f64) {
        let loc = self.loc() + self.speed() * dt;
        self.set_loc(loc);
    }

    /// React to a resolved swept collision: zero the speed component along
    /// the normal axis and snap that coordinate onto the Minkowski face of
    /// the blocking tile, leaving the entity exactly touching it.
    fn adjust_for_collision(&mut self, collision: &SweptCollision) {
        let mut speed = self.speed();
        let mut loc = self.loc();
        let (tx, ty) = collision.tile;
        if collision.normal.x != 0.0 {
            speed.x = 0.0;
            loc.x = if collision.normal.x < 0.0 {
                tx as f64 - self.half_width()
            } else {
                tx as f64 + 1.0 + self.half_width()
            };
        }
        if collision.normal.y != 0.0 {
            speed.y = 0.0;
            loc.y = if collision.normal.y < 0.0 {
                ty as f64 - self.half_height()
            } else {
                ty as f64 + 1.0 + self.half_height()
            };
        }
        self.set_speed(speed);
        self.set_loc(loc);
    }

    /// Minimum corner, in tile indices, of the AABB swept over `dt`.
    fn potential_collision_origin(&self, dt: f64) -> (i32, i32) {
        let disp = self.speed() * dt;
        let min = self.loc() - self.half_extents() + disp.min(DVec2::ZERO);
        (min.x.floor() as i32, min.y.floor() as i32)
    }

    /// Maximum corner, in tile indices, of the AABB swept over `dt`.
    fn potential_collision_end(&self, dt: f64) -> (i32, i32) {
        let disp = self.speed() * dt;
        let max = self.loc() + self.half_extents() + disp.max(DVec2::ZERO);
        (max.x.floor() as i32, max.y.floor() as i32)
    }

    /// Static AABB overlap against another entity.
    fn is_colliding(&self, other: &dyn DynamicEntity) -> bool {
        crate::narrowphase::overlap_aabb_aabb(
            self.loc(),
            self.half_extents(),
            other.loc(),
            other.half_extents(),
        )
    }
}
