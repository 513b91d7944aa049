use glam::DVec2;

use crate::api::DynamicEntity;
use crate::types::MovingCollision;

/// Ready-made box entity.
///
/// Carries the usual platformer kinematic state: gravity and geometry-push
/// flags, a host-set acceleration, friction expressed as per-axis
/// deceleration toward zero, per-axis speed caps, and a drainable log of
/// collision reports as its sink. Hosts with richer needs implement
/// [`DynamicEntity`] themselves.
#[derive(Clone, Debug)]
pub struct BoxBody {
    loc: DVec2,
    speed: DVec2,
    half_extents: DVec2,
    pub affected_by_gravity: bool,
    pub pushed_by_geometry: bool,
    /// Acceleration applied while set, in tiles/s².
    pub acceleration: DVec2,
    /// Deceleration toward zero, applied on an axis only while that axis has
    /// no acceleration.
    pub deceleration: DVec2,
    /// Per-axis speed cap; `f64::INFINITY` disables the cap.
    pub max_speed: DVec2,
    collisions: Vec<MovingCollision>,
}

impl BoxBody {
    pub fn new(loc: DVec2, half_extents: DVec2) -> Self {
        Self {
            loc,
            speed: DVec2::ZERO,
            half_extents,
            affected_by_gravity: false,
            pushed_by_geometry: false,
            acceleration: DVec2::ZERO,
            deceleration: DVec2::ZERO,
            max_speed: DVec2::INFINITY,
            collisions: Vec::new(),
        }
    }

    /// Collision reports accumulated since the last drain.
    pub fn collisions(&self) -> &[MovingCollision] {
        &self.collisions
    }

    /// Take and clear the accumulated collision reports.
    pub fn drain_collisions(&mut self) -> Vec<MovingCollision> {
        std::mem::take(&mut self.collisions)
    }
}

impl DynamicEntity for BoxBody {
    fn loc(&self) -> DVec2 {
        self.loc
    }

    fn set_loc(&mut self, loc: DVec2) {
        self.loc = loc;
    }

    fn speed(&self) -> DVec2 {
        self.speed
    }

    fn set_speed(&mut self, speed: DVec2) {
        self.speed = speed;
    }

    fn half_extents(&self) -> DVec2 {
        self.half_extents
    }

    fn affected_by_gravity(&self) -> bool {
        self.affected_by_gravity
    }

    fn pushed_by_geometry(&self) -> bool {
        self.pushed_by_geometry
    }

    fn apply_accelerations(&mut self, dt: f64) {
        let mut speed = self.speed + self.acceleration * dt;
        if self.acceleration.x == 0.0 {
            speed.x = decelerate(speed.x, self.deceleration.x * dt);
        }
        if self.acceleration.y == 0.0 {
            speed.y = decelerate(speed.y, self.deceleration.y * dt);
        }
        speed.x = speed.x.clamp(-self.max_speed.x, self.max_speed.x);
        speed.y = speed.y.clamp(-self.max_speed.y, self.max_speed.y);
        self.speed = speed;
    }

    fn moving_collision_occured(&mut self, collision: MovingCollision) {
        self.collisions.push(collision);
    }
}

/// Move `speed` toward zero by at most `drop`, never crossing it.
fn decelerate(speed: f64, drop: f64) -> f64 {
    if drop <= 0.0 || speed == 0.0 {
        return speed;
    }
    if speed.abs() <= drop {
        0.0
    } else {
        speed - drop * speed.signum()
    }
}
