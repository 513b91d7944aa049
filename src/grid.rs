use glam::DVec2;

use crate::types::GeometryType;

/// Rectangular grid of geometry tiles.
///
/// Indexed `(x, y)` with tile `(i, j)` occupying the box `[i, i+1] × [j, j+1]`
/// in world units. Anything outside the bounds reads as [`GeometryType::Full`]
/// so the world edge is always solid. The host mutates the grid between
/// ticks; a tick treats it as read-only.
#[derive(Clone, Debug)]
pub struct GeometryGrid {
    width: usize,
    height: usize,
    tiles: Vec<GeometryType>,
}

impl GeometryGrid {
    /// All-empty grid of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![GeometryType::Empty; width * height],
        }
    }

    /// Build a grid by sampling `f` at every tile coordinate.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> GeometryType,
    ) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.tiles[y * width + x] = f(x, y);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    /// Tile kind at `(x, y)`; out-of-bounds coordinates are `Full`.
    pub fn get(&self, x: i32, y: i32) -> GeometryType {
        if self.in_bounds(x, y) {
            self.tiles[y as usize * self.width + x as usize]
        } else {
            GeometryType::Full
        }
    }

    pub fn set(&mut self, x: usize, y: usize, kind: GeometryType) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = kind;
        }
    }

    /// Whether `point` lies inside a `Full` tile (or out of bounds). One-way
    /// tiles are transparent to points.
    pub fn point_collides(&self, point: DVec2) -> bool {
        self.get(point.x.floor() as i32, point.y.floor() as i32) == GeometryType::Full
    }
}
