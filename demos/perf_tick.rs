use std::sync::{Arc, Mutex};
use std::time::Instant;

use glam::DVec2;
use shove::*;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f64 {
    lcg(seed) as f64 / u32::MAX as f64
}

fn main() {
    let ticks = 240;
    println!("bodies,ticks,total_ms,avg_us_per_tick");
    for &n in &[100usize, 500, 1000, 2000] {
        let grid = GeometryGrid::from_fn(64, 64, |x, y| {
            if (x * 31 + y * 17) % 11 == 0 {
                GeometryType::Full
            } else {
                GeometryType::Empty
            }
        });
        let mut engine = PhysicsEngine::new();
        engine.set_geometry(grid);
        engine.set_gravity(20.0);
        engine.set_terminal_velocity(25.0);
        engine.set_run_flag(true);

        let mut seed = 0xC0FF_EE00_u32 ^ n as u32;
        let categories = [
            Category::Player,
            Category::PlayerProjectile,
            Category::Enemy,
            Category::EnemyProjectile,
            Category::Environment,
        ];
        for i in 0..n {
            let mut body = BoxBody::new(
                DVec2::new(1.0 + unit(&mut seed) * 62.0, 1.0 + unit(&mut seed) * 62.0),
                DVec2::new(0.3, 0.3),
            );
            body.pushed_by_geometry = i % 3 != 0;
            body.affected_by_gravity = i % 2 == 0;
            body.set_speed(DVec2::new(
                unit(&mut seed) * 10.0 - 5.0,
                unit(&mut seed) * 10.0 - 5.0,
            ));
            engine.add_with_category(Arc::new(Mutex::new(body)), categories[i % 5]);
        }

        let t0 = Instant::now();
        for _ in 0..ticks {
            engine.tick(16);
        }
        let total_ms = t0.elapsed().as_secs_f64() * 1000.0;
        println!(
            "{n},{ticks},{total_ms:.2},{:.1}",
            total_ms * 1000.0 / ticks as f64
        );
    }
}
