use std::sync::{Arc, Mutex};

use glam::DVec2;
use shove::*;

fn main() {
    // 16x4 corridor with a wall at x = 12.
    let grid = GeometryGrid::from_fn(16, 4, |x, _| {
        if x == 12 {
            GeometryType::Full
        } else {
            GeometryType::Empty
        }
    });
    let mut engine = PhysicsEngine::new();
    engine.set_geometry(grid);

    let enemy = Arc::new(Mutex::new(BoxBody::new(
        DVec2::new(8.0, 1.5),
        DVec2::new(0.5, 0.5),
    )));
    engine.add_with_category(enemy, Category::Enemy);

    let friendly = Arc::new(Mutex::new(BoxBody::new(
        DVec2::new(5.0, 1.5),
        DVec2::new(0.5, 0.5),
    )));
    engine.add_with_category(friendly, Category::Player);

    let origin = DVec2::new(1.0, 1.5);
    let distance = DVec2::new(14.0, 0.0);

    for kind in [Category::Player, Category::Enemy, Category::Environment] {
        let result = engine.calculate_hitscan(origin, distance, kind);
        print!("{kind:?} scan: ");
        match result.entity {
            Some(hit) => print!(
                "entity {:?} at t={:.3} point=({:.2},{:.2})",
                hit.entity, hit.time, hit.point.x, hit.point.y
            ),
            None => print!("no entity"),
        }
        println!(
            "; geometry impact offset=({:.2},{:.2})",
            result.geometry_impact.x, result.geometry_impact.y
        );
    }
}
