use glam::DVec2;
use thiserror::Error;

/// Tile kinds making up the static geometry grid.
///
/// Directional variants are one-way blockers: they act solid only against an
/// entity whose velocity crosses the blocked face. With +Y pointing down,
/// `BlocksUp` stops entities moving upward (negative Y speed) and lets
/// everything else through.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GeometryType {
    #[default]
    Empty,
    Full,
    /// Solid only to entities with negative Y speed.
    BlocksUp,
    /// Solid only to entities with positive Y speed.
    BlocksDown,
    /// Solid only to entities with negative X speed.
    BlocksLeft,
    /// Solid only to entities with positive X speed.
    BlocksRight,
}

impl GeometryType {
    /// True when the tile can never take part in a collision.
    pub fn is_empty(self) -> bool {
        matches!(self, GeometryType::Empty)
    }

    /// Whether this tile acts solid against motion `vel`.
    pub fn blocks(self, vel: DVec2) -> bool {
        match self {
            GeometryType::Empty => false,
            GeometryType::Full => true,
            GeometryType::BlocksUp => vel.y < 0.0,
            GeometryType::BlocksDown => vel.y > 0.0,
            GeometryType::BlocksLeft => vel.x < 0.0,
            GeometryType::BlocksRight => vel.x > 0.0,
        }
    }
}

/// Interaction class of a dynamic entity.
///
/// Discriminants match the numeric list ids hosts may carry around
/// (`1..=5`); use [`Category::from_index`] at that seam.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Category {
    Player = 1,
    PlayerProjectile = 2,
    Enemy = 3,
    EnemyProjectile = 4,
    Environment = 5,
}

impl Category {
    /// Convert a raw numeric category id.
    pub fn from_index(index: i32) -> Result<Self, EngineError> {
        match index {
            1 => Ok(Self::Player),
            2 => Ok(Self::PlayerProjectile),
            3 => Ok(Self::Enemy),
            4 => Ok(Self::EnemyProjectile),
            5 => Ok(Self::Environment),
            _ => Err(EngineError::InvalidCategory { index }),
        }
    }
}

/// Opaque handle to an entity owned by the engine.
///
/// Handles are arena slots: stable for the lifetime of the entity, never
/// reused after removal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// Resolved swept collision of an entity against a single tile.
#[derive(Copy, Clone, Debug)]
pub struct SweptCollision {
    /// Entry time as a fraction of the timestep, in [0, 1].
    pub time: f64,
    /// Axis-aligned surface normal, one of (±1, 0) or (0, ±1), pointing
    /// against the entity's motion.
    pub normal: DVec2,
    /// Tile coordinates of the blocker.
    pub tile: (i32, i32),
}

/// Pairwise collision report delivered to an entity's sink.
///
/// `other` is `None` when the entity overlaps static geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MovingCollision {
    /// The entity receiving this report.
    pub entity: EntityId,
    /// The other party, if any.
    pub other: Option<EntityId>,
}

/// First entity struck by a hitscan.
#[derive(Copy, Clone, Debug)]
pub struct HitscanImpact {
    pub entity: EntityId,
    /// Fraction of the scan displacement travelled at impact, in [0, 1).
    pub time: f64,
    /// World-space point of impact.
    pub point: DVec2,
}

/// Combined hitscan answer.
///
/// `geometry_impact` is the offset from the scan origin to the first solid
/// tile sample; it equals the full scan displacement when nothing solid lies
/// along the ray. `entity` is dropped when geometry is struck first.
#[derive(Copy, Clone, Debug)]
pub struct HitscanResult {
    pub entity: Option<HitscanImpact>,
    pub geometry_impact: DVec2,
}

/// Errors surfaced to the host. The engine makes no attempt to recover from
/// these; they indicate a caller bug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("category index {index} out of range (expected 1..=5)")]
    InvalidCategory { index: i32 },
}
