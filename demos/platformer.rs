use std::sync::{Arc, Mutex};

use glam::DVec2;
use shove::*;

fn main() {
    // A small room: solid walls and floor, a one-way platform halfway up.
    let grid = GeometryGrid::from_fn(12, 8, |x, y| {
        if y == 7 || x == 0 || x == 11 {
            GeometryType::Full
        } else if y == 4 && (3..=6).contains(&x) {
            GeometryType::BlocksDown
        } else {
            GeometryType::Empty
        }
    });

    let mut engine = PhysicsEngine::new();
    engine.set_geometry(grid);
    engine.set_gravity(25.0);
    engine.set_terminal_velocity(30.0);
    engine.set_run_flag(true);

    let mut hero = BoxBody::new(DVec2::new(2.0, 1.0), DVec2::new(0.4, 0.4));
    hero.affected_by_gravity = true;
    hero.pushed_by_geometry = true;
    hero.acceleration = DVec2::new(6.0, 0.0);
    hero.deceleration = DVec2::new(20.0, 0.0);
    hero.max_speed = DVec2::new(4.0, 30.0);
    let hero = Arc::new(Mutex::new(hero));
    let hero_id = engine.add_with_category(hero.clone(), Category::Player);

    for frame in 0..180 {
        engine.tick(16);

        if frame % 15 == 0 {
            let (loc, speed) = {
                let h = hero.lock().unwrap();
                (h.loc(), h.speed())
            };
            println!(
                "t={:>5}ms loc=({:5.2},{:5.2}) speed=({:5.2},{:5.2}) floor={} right_wall={}",
                frame * 16,
                loc.x,
                loc.y,
                speed.x,
                speed.y,
                engine.touching_floor(hero_id),
                engine.touching_right_wall(hero_id),
            );
        }

        // Once it lands, stop running and let friction bring it to rest.
        if engine.touching_floor(hero_id) {
            hero.lock().unwrap().acceleration = DVec2::ZERO;
        }
    }

    let h = hero.lock().unwrap();
    println!(
        "final: loc=({:.2},{:.2}) speed=({:.2},{:.2})",
        h.loc().x,
        h.loc().y,
        h.speed().x,
        h.speed().y
    );
}
