//! Convenience re-exports — `use brandr::prelude::*` for the common items.

pub use crate::camera::Camera;
pub use crate::collider::HitBox;
pub use crate::math::{DVec2, Mat4, Matrix, Vec2, dvec2};
pub use crate::render2d::{
    Atlas, AtlasCell, NO_CELL, QuadBatch, QuadRenderer, QuadVertex, Sprite, UvRect,
    collect_sprites,
};
pub use crate::scene::{NodeKey, SceneError, SceneGraph};
pub use crate::tilemap::{
    EMPTY_TILE, TileCatalog, TileError, TileLayer, TileLayerData, TileRange, TileType,
};
