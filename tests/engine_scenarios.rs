//! End-to-end scenarios for the tile physics engine, exercised through the
//! public API only: geometry pushing, one-way blockers, the category
//! collision matrix, hitscan, and tick determinism.

use std::sync::{Arc, Mutex};

use glam::DVec2;
use shove::{
    BoxBody, Category, DynamicEntity, GeometryGrid, GeometryType, MovingCollision, PhysicsEngine,
};

// ============================================================================
// Helpers
// ============================================================================

fn engine_with(grid: GeometryGrid) -> PhysicsEngine {
    let mut engine = PhysicsEngine::new();
    engine.set_geometry(grid);
    engine.set_run_flag(true);
    engine
}

fn shared(body: BoxBody) -> Arc<Mutex<BoxBody>> {
    Arc::new(Mutex::new(body))
}

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f64 {
    lcg(seed) as f64 / u32::MAX as f64
}

// ============================================================================
// Scenario 1 — Gravity drops a pushed body onto the floor
// ============================================================================

#[test]
fn scenario_gravity_and_floor() {
    let grid = GeometryGrid::from_fn(3, 3, |_, y| {
        if y == 2 {
            GeometryType::Full
        } else {
            GeometryType::Empty
        }
    });
    let mut engine = engine_with(grid);
    engine.set_gravity(10.0);
    engine.set_terminal_velocity(20.0);

    let mut hero = BoxBody::new(DVec2::new(1.0, 0.5), DVec2::new(0.4, 0.4));
    hero.affected_by_gravity = true;
    hero.pushed_by_geometry = true;
    let hero = shared(hero);
    let id = engine.add(hero.clone());

    engine.tick(500);

    {
        let h = hero.lock().unwrap();
        assert!((h.loc().y - 1.6).abs() < 1e-9, "resting on the floor face");
        assert_eq!(h.speed().y, 0.0);
    }
    assert!(engine.touching_floor(id));

    // Further ticks keep it settled.
    for _ in 0..20 {
        engine.tick(100);
    }
    assert!((hero.lock().unwrap().loc().y - 1.6).abs() < 1e-9);
}

// ============================================================================
// Scenario 2 — One-way blocker, both directions
// ============================================================================

#[test]
fn scenario_directional_one_way() {
    let mut grid = GeometryGrid::new(3, 3);
    grid.set(1, 1, GeometryType::BlocksUp);
    let mut engine = engine_with(grid);

    let mut body = BoxBody::new(DVec2::new(1.5, 2.5), DVec2::new(0.3, 0.3));
    body.pushed_by_geometry = true;
    body.set_speed(DVec2::new(0.0, -5.0));
    let body = shared(body);
    engine.add(body.clone());

    engine.tick(1000);

    {
        let b = body.lock().unwrap();
        assert!(
            (b.loc().y - 2.3).abs() < 1e-9,
            "blocked touching the tile's lower face"
        );
        assert_eq!(b.speed().y, 0.0);
    }

    // Reversed: the same tile is open going down. The body falls through it
    // and is only caught by the solid world edge below the grid.
    {
        let mut b = body.lock().unwrap();
        b.set_loc(DVec2::new(1.5, 0.5));
        b.set_speed(DVec2::new(0.0, 5.0));
    }
    engine.tick(1000);

    let b = body.lock().unwrap();
    assert!(b.loc().y > 2.3, "passed through the one-way tile");
    assert!((b.loc().y - 2.7).abs() < 1e-9);
}

// ============================================================================
// Scenario 3 — Corner tiebreak resolves the X axis
// ============================================================================

#[test]
fn scenario_corner_tiebreak() {
    // Grid kept large so the world edge stays out of the swept box and the
    // corner tile is the only candidate.
    let mut grid = GeometryGrid::new(5, 5);
    grid.set(1, 1, GeometryType::Full);
    let mut engine = engine_with(grid);

    let mut body = BoxBody::new(DVec2::new(0.5, 0.5), DVec2::new(0.4, 0.4));
    body.pushed_by_geometry = true;
    body.set_speed(DVec2::new(3.0, 3.0));
    let body = shared(body);
    engine.add(body.clone());

    engine.tick(1000);

    let b = body.lock().unwrap();
    assert!((b.loc().x - 0.6).abs() < 1e-9);
    assert_eq!(b.speed().x, 0.0);
    assert_eq!(b.speed().y, 3.0, "Y speed untouched by the X tiebreak");
    assert!((b.loc().y - 3.5).abs() < 1e-9);
}

// ============================================================================
// Scenario 4 — Player/enemy overlap reports both ways
// ============================================================================

#[test]
fn scenario_player_enemy_report() {
    let mut engine = engine_with(GeometryGrid::new(4, 4));

    let player = shared(BoxBody::new(DVec2::new(1.0, 1.0), DVec2::new(0.5, 0.5)));
    let enemy = shared(BoxBody::new(DVec2::new(1.1, 1.0), DVec2::new(0.5, 0.5)));
    let player_id = engine.add_with_category(player.clone(), Category::Player);
    let enemy_id = engine.add_with_category(enemy.clone(), Category::Enemy);

    engine.tick(16);

    assert_eq!(
        player.lock().unwrap().drain_collisions(),
        vec![MovingCollision {
            entity: player_id,
            other: Some(enemy_id)
        }]
    );
    assert_eq!(
        enemy.lock().unwrap().drain_collisions(),
        vec![MovingCollision {
            entity: enemy_id,
            other: Some(player_id)
        }]
    );

    // A second tick with unchanged positions reports the pair again.
    engine.tick(16);
    assert_eq!(player.lock().unwrap().drain_collisions().len(), 1);
    assert_eq!(enemy.lock().unwrap().drain_collisions().len(), 1);
}

// ============================================================================
// Scenario 5 — Environment vs environment, no duplicate pairs
// ============================================================================

#[test]
fn scenario_environment_no_duplicates() {
    let mut engine = engine_with(GeometryGrid::new(4, 4));

    let first = shared(BoxBody::new(DVec2::new(1.5, 1.5), DVec2::new(0.4, 0.4)));
    let second = shared(BoxBody::new(DVec2::new(1.7, 1.5), DVec2::new(0.4, 0.4)));
    let first_id = engine.add(first.clone());
    let second_id = engine.add(second.clone());

    engine.tick(16);

    // One report per entity: its own iteration's, never a reciprocal copy.
    assert_eq!(
        first.lock().unwrap().drain_collisions(),
        vec![MovingCollision {
            entity: first_id,
            other: Some(second_id)
        }]
    );
    assert_eq!(
        second.lock().unwrap().drain_collisions(),
        vec![MovingCollision {
            entity: second_id,
            other: Some(first_id)
        }]
    );
}

// ============================================================================
// Scenario 6 — Hitscan geometry in a corridor
// ============================================================================

#[test]
fn scenario_hitscan_corridor() {
    let mut grid = GeometryGrid::new(10, 1);
    grid.set(5, 0, GeometryType::Full);
    let mut engine = PhysicsEngine::new();
    engine.set_geometry(grid);

    let origin = DVec2::new(0.5, 0.5);
    let distance = DVec2::new(9.0, 0.0);
    let impact = engine.hitscan_impact_geometry(origin, distance);

    let hit_x = origin.x + impact.x;
    assert!(
        (5.0..6.0).contains(&hit_x),
        "impact lies within tile 5, got {hit_x}"
    );

    // An enemy standing before the wall shadows it; one behind it is
    // shadowed instead.
    let enemy = shared(BoxBody::new(DVec2::new(3.0, 0.5), DVec2::new(0.5, 0.5)));
    let enemy_id = engine.add_with_category(enemy, Category::Enemy);
    let result = engine.calculate_hitscan(origin, distance, Category::Player);
    let hit = result.entity.expect("enemy struck before the wall");
    assert_eq!(hit.entity, enemy_id);
    assert!(hit.time >= 0.0 && hit.time < 1.0);

    let behind = shared(BoxBody::new(DVec2::new(8.0, 0.5), DVec2::new(0.4, 0.4)));
    engine.add_with_category(behind, Category::Enemy);
    engine.remove(enemy_id);
    engine.set_run_flag(true);
    engine.tick(1);
    let result = engine.calculate_hitscan(origin, distance, Category::Player);
    assert!(result.entity.is_none(), "the wall shadows the far enemy");
}

// ============================================================================
// Determinism — identical inputs, bit-identical state
// ============================================================================

#[test]
fn scenario_insertion_order_determinism() {
    fn simulate() -> Vec<(DVec2, DVec2)> {
        let grid = GeometryGrid::from_fn(16, 16, |x, y| {
            if (x * 31 + y * 17) % 7 == 0 {
                GeometryType::Full
            } else {
                GeometryType::Empty
            }
        });
        let mut engine = engine_with(grid);
        engine.set_gravity(15.0);
        engine.set_terminal_velocity(25.0);

        let mut seed = 0xDEAD_BEEF_u32;
        let mut bodies = Vec::new();
        for i in 0..12 {
            let mut body = BoxBody::new(
                DVec2::new(2.0 + unit(&mut seed) * 10.0, 1.0 + unit(&mut seed) * 4.0),
                DVec2::new(0.3, 0.3),
            );
            body.pushed_by_geometry = true;
            body.affected_by_gravity = i % 2 == 0;
            body.set_speed(DVec2::new(
                unit(&mut seed) * 8.0 - 4.0,
                unit(&mut seed) * 8.0 - 4.0,
            ));
            let body = shared(body);
            let category = Category::from_index((i % 5) as i32 + 1).unwrap();
            engine.add_with_category(body.clone(), category);
            bodies.push(body);
        }

        for _ in 0..120 {
            engine.tick(16);
        }

        bodies
            .iter()
            .map(|b| {
                let b = b.lock().unwrap();
                (b.loc(), b.speed())
            })
            .collect()
    }

    let first = simulate();
    let second = simulate();
    // Bit-exact equality, not approximate.
    assert_eq!(first, second);
}

// ============================================================================
// Invariant — pushed bodies never penetrate solid tiles
// ============================================================================

#[test]
fn scenario_pushed_bodies_never_penetrate() {
    let grid = GeometryGrid::from_fn(16, 16, |x, y| {
        if (x * 13 + y * 29) % 9 == 0 {
            GeometryType::Full
        } else {
            GeometryType::Empty
        }
    });
    let mut engine = engine_with(grid);
    engine.set_gravity(20.0);
    engine.set_terminal_velocity(30.0);

    // Spawn bodies centered in empty tiles so nothing starts embedded.
    let mut seed = 4321_u32;
    let mut bodies = Vec::new();
    for y in 1..15 {
        for x in 1..15 {
            if engine.geometry_type(x, y) != GeometryType::Empty || (x + y) % 5 != 0 {
                continue;
            }
            let mut body = BoxBody::new(
                DVec2::new(x as f64 + 0.5, y as f64 + 0.5),
                DVec2::new(0.3, 0.3),
            );
            body.pushed_by_geometry = true;
            body.affected_by_gravity = x % 2 == 0;
            body.set_speed(DVec2::new(
                unit(&mut seed) * 12.0 - 6.0,
                unit(&mut seed) * 12.0 - 6.0,
            ));
            bodies.push(shared(body));
        }
    }
    assert!(bodies.len() > 10, "enough coverage for the sweep");
    for body in &bodies {
        engine.add(body.clone());
    }

    for _ in 0..200 {
        engine.tick(16);

        for body in &bodies {
            let b = body.lock().unwrap();
            let (loc, half) = (b.loc(), b.half_extents());
            let start_x = (loc.x - half.x).floor() as i32;
            let end_x = (loc.x + half.x).floor() as i32;
            let start_y = (loc.y - half.y).floor() as i32;
            let end_y = (loc.y + half.y).floor() as i32;
            for tx in start_x..=end_x {
                for ty in start_y..=end_y {
                    if engine.geometry_type(tx, ty) != GeometryType::Full {
                        continue;
                    }
                    // Open-interval overlap: face contact is allowed.
                    let depth_x =
                        (loc.x + half.x - tx as f64).min(tx as f64 + 1.0 - (loc.x - half.x));
                    let depth_y =
                        (loc.y + half.y - ty as f64).min(ty as f64 + 1.0 - (loc.y - half.y));
                    let penetration = depth_x.min(depth_y);
                    assert!(
                        penetration <= 1e-9,
                        "body at {loc:?} penetrates tile ({tx},{ty}) by {penetration}"
                    );
                }
            }
        }
    }
}

// ============================================================================
// Facade — numeric category seam and OOB boundary rule
// ============================================================================

#[test]
fn scenario_boundary_and_category_seam() {
    let engine = engine_with(GeometryGrid::new(4, 4));

    // Out of bounds always reads Full and swallows points.
    assert_eq!(engine.geometry_type(-1, 0), GeometryType::Full);
    assert_eq!(engine.geometry_type(0, 4), GeometryType::Full);
    assert!(!engine.is_in_bounds(4, 0));
    assert!(engine.point_collides_with_geometry(DVec2::new(-0.5, 1.0)));
    assert!(!engine.point_collides_with_geometry(DVec2::new(1.5, 1.5)));

    // The numeric category seam rejects anything outside 1..=5.
    assert!(Category::from_index(3).is_ok());
    assert!(Category::from_index(0).is_err());
    assert!(Category::from_index(9).is_err());
}
