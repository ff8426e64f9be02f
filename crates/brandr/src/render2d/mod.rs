//! 2D batch rendering: quad accumulation, atlas UVs, and the GPU pipeline.
//!
//! Per-frame flow: game logic mutates the scene graph, then the render
//! pass clears the [`QuadBatch`], collects sprite quads and tile-layer
//! windows into it, and hands the accumulated vertex stream to the
//! [`QuadRenderer`] for a single indexed draw.

pub mod atlas;
pub mod batch;
pub mod pipeline;
pub mod vertex;

pub use atlas::{Atlas, AtlasCell, NO_CELL, UvRect};
pub use batch::{MAX_INDEXED_QUADS, QuadBatch, quad_vertices};
pub use pipeline::QuadRenderer;
pub use vertex::QuadVertex;

use crate::math::dvec2;
use crate::scene::{NodeKey, SceneGraph};

/// A textured quad attached to a scene node.
#[derive(Debug, Clone, Copy)]
pub struct Sprite {
    pub node: NodeKey,
    /// Atlas cell index; [`NO_CELL`] renders nothing.
    pub cell: i32,
    pub width: f64,
    pub height: f64,
    pub alpha: f32,
}

/// Append one quad per visible sprite to the batch.
///
/// Sprites with `alpha <= 0` are skipped before any matrix work, and cells
/// missing from the atlas are skipped silently — absence of art is not an
/// error at draw time.
pub fn collect_sprites(
    scene: &mut SceneGraph,
    sprites: &[Sprite],
    atlas: &Atlas,
    batch: &mut QuadBatch,
) {
    for sprite in sprites {
        if sprite.alpha <= 0.0 {
            continue;
        }
        let Some(cell) = atlas.cell(sprite.cell) else {
            continue;
        };
        let uv = atlas.uv_rect(&cell);
        let world = scene.world_matrix(sprite.node);
        let corners = [
            world.transform_point(dvec2(0.0, 0.0)),
            world.transform_point(dvec2(sprite.width, 0.0)),
            world.transform_point(dvec2(sprite.width, sprite.height)),
            world.transform_point(dvec2(0.0, sprite.height)),
        ];
        batch.add_quad(corners, uv, sprite.alpha);
    }
}
