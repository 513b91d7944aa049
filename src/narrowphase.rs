use glam::DVec2;

use crate::types::{GeometryType, SweptCollision};

/// Minkowski-expanded bounds of the unit tile at `tile` for an entity with
/// half-extents `half`. Sweeping the entity's center against this box is
/// equivalent to sweeping the full entity AABB against the tile.
pub fn tile_expanded_bounds(tile: (i32, i32), half: DVec2) -> (DVec2, DVec2) {
    let (tx, ty) = tile;
    let min = DVec2::new(tx as f64 - half.x, ty as f64 - half.y);
    let max = DVec2::new(tx as f64 + 1.0 + half.x, ty as f64 + 1.0 + half.y);
    (min, max)
}

/// Swept collision of a moving centered AABB against one grid tile.
///
/// One-way tiles only participate when the velocity sign matches the face
/// they block; everything else runs the slab test over the Minkowski-expanded
/// tile box.
pub fn sweep_entity_tile(
    center: DVec2,
    half: DVec2,
    vel: DVec2,
    dt: f64,
    tile: (i32, i32),
    kind: GeometryType,
) -> Option<SweptCollision> {
    if !kind.blocks(vel) {
        return None;
    }
    let (min, max) = tile_expanded_bounds(tile, half);
    sweep_point_aabb(center, vel * dt, min, max).map(|(time, normal)| SweptCollision {
        time,
        normal,
        tile,
    })
}

/// Slab entry of a point moving by `disp` through `[min, max]`.
///
/// Returns the entry time as a fraction of `disp` in [0, 1] and the
/// axis-aligned entry normal (sign opposite the displacement on the entry
/// axis). The axis with the larger entry time wins the normal; ties go to X.
/// A zero-displacement axis collides only if the point is strictly inside its
/// slab, and a point starting inside both slabs reports no collision.
pub fn sweep_point_aabb(
    origin: DVec2,
    disp: DVec2,
    min: DVec2,
    max: DVec2,
) -> Option<(f64, DVec2)> {
    let (x_enter, x_exit) = axis_slab(origin.x, disp.x, min.x, max.x)?;
    let (y_enter, y_exit) = axis_slab(origin.y, disp.y, min.y, max.y)?;

    let entry = x_enter.max(y_enter);
    let exit = x_exit.min(y_exit);
    if entry >= exit || entry < 0.0 || entry > 1.0 {
        return None;
    }

    // The winning axis always has nonzero displacement: a zero-displacement
    // axis contributes -inf and can only tie when the entry is rejected above.
    let normal = if x_enter >= y_enter {
        DVec2::new(-disp.x.signum(), 0.0)
    } else {
        DVec2::new(0.0, -disp.y.signum())
    };
    Some((entry, normal))
}

fn axis_slab(origin: f64, disp: f64, min: f64, max: f64) -> Option<(f64, f64)> {
    if disp == 0.0 {
        // Strict containment: face contact on a motionless axis stays open,
        // so an entity resting on a surface slides across tile seams.
        if origin <= min || origin >= max {
            return None;
        }
        return Some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let t1 = (min - origin) / disp;
    let t2 = (max - origin) / disp;
    Some((t1.min(t2), t1.max(t2)))
}

/// Static overlap of two centered AABBs. Face contact counts.
pub fn overlap_aabb_aabb(c0: DVec2, h0: DVec2, c1: DVec2, h1: DVec2) -> bool {
    let d = (c1 - c0).abs();
    d.x <= h0.x + h1.x && d.y <= h0.y + h1.y
}

/// Point containment in a centered AABB, boundary inclusive.
pub fn point_in_aabb(p: DVec2, c: DVec2, h: DVec2) -> bool {
    let min = c - h;
    let max = c + h;
    p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
}
