use std::collections::HashSet;
use std::time::{Duration, Instant};

use glam::DVec2;

use crate::api::{DynamicEntity, EntityHandle};
use crate::grid::GeometryGrid;
use crate::narrowphase;
use crate::types::{Category, EntityId, GeometryType, MovingCollision};

/// Tile-pushing physics engine.
///
/// Owns a set of dynamic entities (shared with the host through
/// [`EntityHandle`] clones), integrates their motion against the geometry
/// grid each tick, then reports pairwise collisions between the category
/// lists. All distances are in tiles, speeds in tiles/s, accelerations in
/// tiles/s².
///
/// One tick is in flight at a time: [`PhysicsEngine::tick`] takes `&mut self`,
/// and the per-entity lock is held for the whole of that entity's integration
/// and for both sides of a pair report.
pub struct PhysicsEngine {
    gravity: f64,
    terminal_velocity: f64,
    geometry: GeometryGrid,
    run_flag: bool,

    // Arena slot per id; slots are never reused.
    entities: Vec<Option<EntityHandle>>,
    master: Vec<EntityId>,
    pub(crate) players: Vec<EntityId>,
    pub(crate) player_projectiles: Vec<EntityId>,
    pub(crate) enemies: Vec<EntityId>,
    pub(crate) enemy_projectiles: Vec<EntityId>,
    pub(crate) environment: Vec<EntityId>,
    pending_removal: HashSet<EntityId>,

    cps: u32,
    cycles_this_second: u32,
    second_start: Instant,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsEngine {
    pub fn new() -> Self {
        Self {
            gravity: 0.0,
            terminal_velocity: 0.0,
            geometry: GeometryGrid::new(1, 1),
            run_flag: false,
            entities: Vec::new(),
            master: Vec::new(),
            players: Vec::new(),
            player_projectiles: Vec::new(),
            enemies: Vec::new(),
            enemy_projectiles: Vec::new(),
            environment: Vec::new(),
            pending_removal: HashSet::new(),
            cps: 0,
            cycles_this_second: 0,
            second_start: Instant::now(),
        }
    }

    // --- Configuration -------------------------------------------------------

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: f64) {
        self.gravity = gravity;
    }

    pub fn terminal_velocity(&self) -> f64 {
        self.terminal_velocity
    }

    pub fn set_terminal_velocity(&mut self, terminal_velocity: f64) {
        self.terminal_velocity = terminal_velocity;
    }

    pub fn geometry(&self) -> &GeometryGrid {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut GeometryGrid {
        &mut self.geometry
    }

    pub fn set_geometry(&mut self, geometry: GeometryGrid) {
        self.geometry = geometry;
    }

    pub fn run_flag(&self) -> bool {
        self.run_flag
    }

    pub fn set_run_flag(&mut self, run_flag: bool) {
        self.run_flag = run_flag;
    }

    /// Cycles per second over the last completed 1-second window.
    pub fn cps(&self) -> u32 {
        self.cps
    }

    // --- Entity lifecycle ----------------------------------------------------

    /// Add an entity under the default [`Category::Environment`].
    pub fn add(&mut self, entity: EntityHandle) -> EntityId {
        self.add_with_category(entity, Category::Environment)
    }

    /// Add an entity to the master list and its category list. The returned
    /// id stays valid until the entity is removed. Each handle belongs in the
    /// engine once; the per-entity lock is not reentrant.
    pub fn add_with_category(&mut self, entity: EntityHandle, category: Category) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(Some(entity));
        self.master.push(id);
        self.category_list_mut(category).push(id);
        tracing::trace!(id = id.0, ?category, "entity added");
        id
    }

    /// Queue an entity for removal. The removal takes effect after the
    /// current tick's phases complete; list iteration is never mutated
    /// mid-tick.
    pub fn remove(&mut self, id: EntityId) {
        self.pending_removal.insert(id);
    }

    /// Shared handle to a live entity.
    pub fn entity(&self, id: EntityId) -> Option<EntityHandle> {
        self.entities.get(id.0 as usize).and_then(|slot| slot.clone())
    }

    /// Ids of all live entities, in insertion order.
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.master
    }

    /// Ids of the entities in one category, in insertion order.
    pub fn category_ids(&self, category: Category) -> &[EntityId] {
        match category {
            Category::Player => &self.players,
            Category::PlayerProjectile => &self.player_projectiles,
            Category::Enemy => &self.enemies,
            Category::EnemyProjectile => &self.enemy_projectiles,
            Category::Environment => &self.environment,
        }
    }

    fn category_list_mut(&mut self, category: Category) -> &mut Vec<EntityId> {
        match category {
            Category::Player => &mut self.players,
            Category::PlayerProjectile => &mut self.player_projectiles,
            Category::Enemy => &mut self.enemies,
            Category::EnemyProjectile => &mut self.enemy_projectiles,
            Category::Environment => &mut self.environment,
        }
    }

    // --- Tick ----------------------------------------------------------------

    /// Advance the simulation by `dt_millis`. A non-positive delta or a
    /// cleared run flag is a silent no-op.
    pub fn tick(&mut self, dt_millis: i64) {
        if dt_millis <= 0 || !self.run_flag {
            return;
        }
        let dt = dt_millis as f64 / 1000.0;
        self.step_physics(dt);
        self.run_collision_phase();
        self.drain_pending();
        self.note_cycle();
    }

    /// Motion integration over the master list in insertion order:
    /// accelerations, gravity impulse, geometry pushing, position advance.
    fn step_physics(&mut self, dt: f64) {
        let gravity_dv = self.gravity * dt;
        let terminal = self.terminal_velocity;
        let order = self.master.clone();
        for id in order {
            let Some(handle) = self.entity(id) else {
                continue;
            };
            let Ok(mut entity) = handle.lock() else {
                continue;
            };
            entity.apply_accelerations(dt);
            if entity.affected_by_gravity() {
                entity.apply_gravity_impulse(gravity_dv, terminal);
            }
            if entity.pushed_by_geometry() {
                resolve_geometry(&mut *entity, &self.geometry, dt);
            }
            entity.apply_speeds(dt);
        }
    }

    /// Pairwise reporting phase, after every entity has moved.
    ///
    /// Geometry overlap is only reported for entities the integrator does not
    /// push (pushed entities were already resolved). Pair cells follow the
    /// category matrix; each symmetric cell is visited from one side only and
    /// delivered reciprocally.
    fn run_collision_phase(&self) {
        let players = self.players.clone();
        let player_projectiles = self.player_projectiles.clone();
        let enemies = self.enemies.clone();
        let enemy_projectiles = self.enemy_projectiles.clone();
        let environment = self.environment.clone();
        let master = self.master.clone();

        for &id in &players {
            self.report_geometry_overlap(id);
            for &other in &enemies {
                self.report_pair(id, other, true);
            }
            for &other in &enemy_projectiles {
                self.report_pair(id, other, true);
            }
        }

        // Player-enemy pairs were caught above; enemies only add projectiles.
        for &id in &enemies {
            self.report_geometry_overlap(id);
            for &other in &player_projectiles {
                self.report_pair(id, other, true);
            }
        }

        // Projectiles have had all their entity pairs handled; geometry only.
        for &id in &player_projectiles {
            self.report_geometry_overlap(id);
        }
        for &id in &enemy_projectiles {
            self.report_geometry_overlap(id);
        }

        for &id in &environment {
            self.report_geometry_overlap(id);
            for &other in &master {
                if other == id {
                    continue;
                }
                // No reciprocal for another environment entity: its own
                // iteration emits the mirror report.
                let reciprocal = !environment.contains(&other);
                self.report_pair(id, other, reciprocal);
            }
        }
    }

    fn report_pair(&self, a: EntityId, b: EntityId, reciprocal: bool) {
        let (Some(ha), Some(hb)) = (self.entity(a), self.entity(b)) else {
            return;
        };
        let (Ok(mut ea), Ok(mut eb)) = (ha.lock(), hb.lock()) else {
            return;
        };
        if !ea.is_colliding(&*eb) {
            return;
        }
        ea.moving_collision_occured(MovingCollision {
            entity: a,
            other: Some(b),
        });
        if reciprocal {
            eb.moving_collision_occured(MovingCollision {
                entity: b,
                other: Some(a),
            });
        }
    }

    fn report_geometry_overlap(&self, id: EntityId) {
        let Some(handle) = self.entity(id) else {
            return;
        };
        let Ok(mut entity) = handle.lock() else {
            return;
        };
        if entity.pushed_by_geometry() || !self.entity_overlaps_geometry(&*entity) {
            return;
        }
        entity.moving_collision_occured(MovingCollision {
            entity: id,
            other: None,
        });
    }

    fn drain_pending(&mut self) {
        if self.pending_removal.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_removal);
        self.master.retain(|id| !pending.contains(id));
        self.players.retain(|id| !pending.contains(id));
        self.player_projectiles.retain(|id| !pending.contains(id));
        self.enemies.retain(|id| !pending.contains(id));
        self.enemy_projectiles.retain(|id| !pending.contains(id));
        self.environment.retain(|id| !pending.contains(id));
        for id in pending {
            if let Some(slot) = self.entities.get_mut(id.0 as usize) {
                *slot = None;
            }
        }
    }

    fn note_cycle(&mut self) {
        self.cycles_this_second += 1;
        if self.second_start.elapsed() >= Duration::from_secs(1) {
            self.cps = self.cycles_this_second;
            self.cycles_this_second = 0;
            self.second_start = Instant::now();
        }
    }

    // --- Geometry queries ----------------------------------------------------

    pub fn is_in_bounds(&self, x: i32, y: i32) -> bool {
        self.geometry.in_bounds(x, y)
    }

    /// Tile kind at `(x, y)`; out-of-bounds coordinates read as `Full`.
    pub fn geometry_type(&self, x: i32, y: i32) -> GeometryType {
        self.geometry.get(x, y)
    }

    /// Whether `point` lies inside a `Full` tile (or out of bounds).
    pub fn point_collides_with_geometry(&self, point: DVec2) -> bool {
        self.geometry.point_collides(point)
    }

    /// Whether the entity's AABB overlaps any tile solid to a stationary
    /// probe. One-way tiles are transparent here.
    pub fn is_colliding_with_geometry(&self, id: EntityId) -> bool {
        let Some(handle) = self.entity(id) else {
            return false;
        };
        let Ok(entity) = handle.lock() else {
            return false;
        };
        self.entity_overlaps_geometry(&*entity)
    }

    /// Is the entity resting against geometry in the +Y direction?
    pub fn touching_floor(&self, id: EntityId) -> bool {
        self.touching_y(id, 1.0)
    }

    /// Is the entity pressed against geometry in the -Y direction?
    pub fn touching_ceiling(&self, id: EntityId) -> bool {
        self.touching_y(id, -1.0)
    }

    /// Is the entity pressed against geometry in the -X direction?
    pub fn touching_left_wall(&self, id: EntityId) -> bool {
        self.touching_x(id, -1.0)
    }

    /// Is the entity pressed against geometry in the +X direction?
    pub fn touching_right_wall(&self, id: EntityId) -> bool {
        self.touching_x(id, 1.0)
    }

    /// Blockage summary of the four adjacent probe tiles, one component per
    /// axis, each in {-1, 0, +1} pointing away from the blocker. Samples a
    /// single tile per side, so results degrade for half-extents above 0.5.
    pub fn ortho_geometry_collision_normals(&self, id: EntityId) -> DVec2 {
        let Some(handle) = self.entity(id) else {
            return DVec2::ZERO;
        };
        let Ok(entity) = handle.lock() else {
            return DVec2::ZERO;
        };
        let e = &*entity;
        let loc = e.loc();
        let cx = loc.x.floor() as i32;
        let cy = loc.y.floor() as i32;
        let mut bump = DVec2::ZERO;
        let above = (loc.y - e.half_height()).floor() as i32;
        let below = (loc.y + e.half_height()).floor() as i32;
        let left = (loc.x - e.half_width()).floor() as i32;
        let right = (loc.x + e.half_width()).floor() as i32;
        if self.collision_check_geometry(cx, above, e, DVec2::new(0.0, -0.01)) {
            bump.y = 1.0;
        }
        if self.collision_check_geometry(cx, below, e, DVec2::new(0.0, 0.01)) {
            bump.y = -1.0;
        }
        if self.collision_check_geometry(left, cy, e, DVec2::new(-0.01, 0.0)) {
            bump.x = 1.0;
        }
        if self.collision_check_geometry(right, cy, e, DVec2::new(0.01, 0.0)) {
            bump.x = -1.0;
        }
        bump
    }

    fn touching_y(&self, id: EntityId, dir: f64) -> bool {
        let Some(handle) = self.entity(id) else {
            return false;
        };
        let Ok(entity) = handle.lock() else {
            return false;
        };
        let e = &*entity;
        let loc = e.loc();
        let y = (loc.y + dir * e.height()).floor() as i32;
        let start_x = (loc.x - e.half_width()).floor() as i32;
        let end_x = (loc.x + e.half_width()).floor() as i32;
        let shift = DVec2::new(0.0, dir * 0.01);
        (start_x..=end_x).any(|x| self.collision_check_geometry(x, y, e, shift))
    }

    fn touching_x(&self, id: EntityId, dir: f64) -> bool {
        let Some(handle) = self.entity(id) else {
            return false;
        };
        let Ok(entity) = handle.lock() else {
            return false;
        };
        let e = &*entity;
        let loc = e.loc();
        let x = (loc.x + dir * e.width()).floor() as i32;
        let start_y = (loc.y - e.half_height()).floor() as i32;
        let end_y = (loc.y + e.half_height()).floor() as i32;
        let shift = DVec2::new(dir * 0.01, 0.0);
        (start_y..=end_y).any(|y| self.collision_check_geometry(x, y, e, shift))
    }

    fn entity_overlaps_geometry(&self, e: &dyn DynamicEntity) -> bool {
        let loc = e.loc();
        let start_x = (loc.x - e.half_width()).floor() as i32;
        let end_x = (loc.x + e.half_width()).floor() as i32;
        let start_y = (loc.y - e.half_height()).floor() as i32;
        let end_y = (loc.y + e.half_height()).floor() as i32;
        for x in start_x..=end_x {
            for y in start_y..=end_y {
                if self.collision_check_geometry(x, y, e, DVec2::ZERO) {
                    return true;
                }
            }
        }
        false
    }

    /// Overlap test between an entity, optionally probe-shifted, and one
    /// tile. Out-of-bounds tiles always collide. One-way tiles engage only
    /// when the probe shift crosses the face they block, so a zero shift
    /// treats them as open.
    fn collision_check_geometry(
        &self,
        x: i32,
        y: i32,
        e: &dyn DynamicEntity,
        shift: DVec2,
    ) -> bool {
        if !self.geometry.in_bounds(x, y) {
            return true;
        }
        let kind = self.geometry.get(x, y);
        let solid = match kind {
            GeometryType::Empty => false,
            GeometryType::Full => true,
            _ => kind.blocks(shift),
        };
        if !solid {
            return false;
        }
        let (min, max) = narrowphase::tile_expanded_bounds((x, y), e.half_extents());
        let p = e.loc() + shift;
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }
}

/// Per-entity tile push. Candidates are culled from the swept tile AABB
/// (out-of-bounds coordinates stay in, acting as `Full`) and resolved nearest
/// tile center first, so a farther blocker is never consulted with a stale
/// speed.
fn resolve_geometry(entity: &mut dyn DynamicEntity, geometry: &GeometryGrid, dt: f64) {
    let (ox, oy) = entity.potential_collision_origin(dt);
    let (ex, ey) = entity.potential_collision_end(dt);
    let center = entity.loc();

    let mut candidates: Vec<(i32, i32, f64)> = Vec::new();
    for x in ox..=ex {
        for y in oy..=ey {
            if geometry.in_bounds(x, y) && geometry.get(x, y).is_empty() {
                continue;
            }
            let to_center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5) - center;
            candidates.push((x, y, to_center.length_squared()));
        }
    }
    // Stable sort: equidistant tiles keep scan order.
    candidates.sort_by(|a, b| a.2.total_cmp(&b.2));

    for (x, y, _) in candidates {
        let hit = narrowphase::sweep_entity_tile(
            entity.loc(),
            entity.half_extents(),
            entity.speed(),
            dt,
            (x, y),
            geometry.get(x, y),
        );
        if let Some(collision) = hit {
            entity.adjust_for_collision(&collision);
        }
    }
}
