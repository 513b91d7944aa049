//! shove: 2D tile-grid platformer physics (swept AABB geometry pushing,
//! categorized pairwise collision reports, hitscan queries)
//!
//! All distances are in tiles, speeds in tiles per second, accelerations in
//! tiles per second per second. +X is right, +Y is down.

pub mod api;
pub mod body;
pub mod driver;
pub mod grid;
pub mod hitscan;
pub mod narrowphase;
pub mod types;
pub mod world;

pub use crate::api::{DynamicEntity, EntityHandle};
pub use crate::body::BoxBody;
pub use crate::driver::EngineDriver;
pub use crate::grid::GeometryGrid;
pub use crate::types::*;
pub use crate::world::PhysicsEngine;
