//! # Visible-Range Query and Tile Emission
//!
//! Which tiles does a camera see? The answer has to respect the layer's
//! own transform (a rotated or scaled layer changes which cells fall
//! under the viewport), so the query runs entirely in *layer-local* space:
//!
//! 1. take the viewport's four stage-space corners
//! 2. map them to world space through the camera, then into layer-local
//!    space through the inverse of the layer's concatenated matrix
//! 3. take the axis-aligned bounding box of the four mapped corners and
//!    divide by the tile dimensions
//! 4. floor the minima; ceil the maxima and extend by one tile, so a tile
//!    half off the viewport edge still draws even when the view lands
//!    exactly on a grid line; then clamp to the layer's valid coordinate
//!    range
//!
//! Emission walks that window row-major, skips empty cells and invisible
//! types, maps each quad's corners back through the layer matrix, and
//! bulk-appends the whole window to the shared [`QuadBatch`] in one call.

use crate::camera::Camera;
use crate::math::{DVec2, dvec2};
use crate::render2d::{Atlas, NO_CELL, QuadBatch, QuadVertex, quad_vertices};
use crate::scene::SceneGraph;

use super::layer::TileLayer;
use super::TileCatalog;

/// Integer tile window, max exclusive. May be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl TileRange {
    pub const EMPTY: Self = Self {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    pub fn cols(&self) -> i64 {
        (self.max_x - self.min_x).max(0)
    }

    pub fn rows(&self) -> i64 {
        (self.max_y - self.min_y).max(0)
    }
}

impl TileLayer {
    /// The window of tiles the camera can see, clamped to the layer's
    /// coordinate range. `None` when the layer's transform is degenerate
    /// (nothing can be seen through a non-invertible matrix).
    pub fn visible_range(&self, scene: &mut SceneGraph, camera: &mut Camera) -> Option<TileRange> {
        let inverse = scene.world_matrix(self.node()).inverse()?;
        let (view_w, view_h) = camera.viewport();
        let corners = [
            dvec2(0.0, 0.0),
            dvec2(view_w, 0.0),
            dvec2(view_w, view_h),
            dvec2(0.0, view_h),
        ];

        let mut min = DVec2::INFINITY;
        let mut max = DVec2::NEG_INFINITY;
        for corner in corners {
            let mut p = corner;
            camera.transform_stage_to_world_in_place(scene, &mut p);
            inverse.transform_point_in_place(&mut p);
            min = min.min(p);
            max = max.max(p);
        }
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let (tile_w, tile_h) = self.tile_size();
        // Maxima get one extra tile past the ceiling: a view whose edge
        // sits exactly on a grid line still owes the next (clipped) column
        // and row.
        let raw_min_x = (min.x / tile_w).floor() as i64;
        let raw_min_y = (min.y / tile_h).floor() as i64;
        let raw_max_x = (max.x / tile_w).ceil() as i64 + 1;
        let raw_max_y = (max.y / tile_h).ceil() as i64 + 1;

        let Some((lo_x, lo_y, hi_x, hi_y)) = self.coord_bounds() else {
            return Some(TileRange::EMPTY);
        };
        let range = TileRange {
            min_x: raw_min_x.max(lo_x),
            min_y: raw_min_y.max(lo_y),
            max_x: raw_max_x.min(hi_x),
            max_y: raw_max_y.min(hi_y),
        };
        Some(if range.is_empty() {
            TileRange::EMPTY
        } else {
            range
        })
    }

    /// Emit quad geometry for every visible, non-empty tile into `batch`.
    ///
    /// Cells that are absent, hold the empty type, reference an unknown
    /// type, or whose type's cell is [`NO_CELL`] or missing from the atlas
    /// are skipped — the bulk renderer treats absence as "nothing to draw".
    pub fn emit(
        &self,
        scene: &mut SceneGraph,
        camera: &mut Camera,
        catalog: &TileCatalog,
        atlas: &Atlas,
        batch: &mut QuadBatch,
    ) {
        if self.alpha <= 0.0 {
            return;
        }
        let Some(range) = self.visible_range(scene, camera) else {
            return;
        };
        if range.is_empty() {
            return;
        }

        let world = scene.world_matrix(self.node());
        let (tile_w, tile_h) = self.tile_size();
        let mut records: Vec<QuadVertex> =
            Vec::with_capacity((range.cols() * range.rows()) as usize * 4);

        for y in range.min_y..range.max_y {
            for x in range.min_x..range.max_x {
                let Some(tile_type) = self.tile_at(x, y) else {
                    continue;
                };
                let Some(ty) = catalog.get(tile_type) else {
                    continue;
                };
                if ty.cell == NO_CELL {
                    continue;
                }
                let Some(cell) = atlas.cell(ty.cell) else {
                    continue;
                };

                let px = x as f64 * tile_w + ty.offset.x;
                let py = y as f64 * tile_h + ty.offset.y;
                let corners = [
                    world.transform_point(dvec2(px, py)),
                    world.transform_point(dvec2(px + tile_w, py)),
                    world.transform_point(dvec2(px + tile_w, py + tile_h)),
                    world.transform_point(dvec2(px, py + tile_h)),
                ];
                records.extend_from_slice(&quad_vertices(
                    corners,
                    atlas.uv_rect(&cell),
                    self.alpha,
                ));
            }
        }

        batch.extend_from(&records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render2d::AtlasCell;
    use crate::tilemap::TileType;

    fn fixture() -> (SceneGraph, Camera, TileCatalog, Atlas) {
        let mut scene = SceneGraph::new();
        let camera = Camera::new(&mut scene, 800.0, 600.0);
        let mut catalog = TileCatalog::new();
        let mut atlas = Atlas::new(256.0, 256.0);
        let cell = atlas.add_cell(AtlasCell {
            x: 0.0,
            y: 0.0,
            w: 32.0,
            h: 32.0,
        });
        catalog
            .register(TileType {
                cell,
                offset: DVec2::ZERO,
            })
            .unwrap();
        (scene, camera, catalog, atlas)
    }

    fn filled_dense(scene: &mut SceneGraph) -> TileLayer {
        let mut layer = TileLayer::dense(scene, 100, 100, 32.0, 32.0);
        layer.replace_region(0, 0, 100, 100, 1).unwrap();
        layer
    }

    #[test]
    fn origin_camera_selects_one_extra_edge_column_and_row() {
        let (mut scene, mut camera, _, _) = fixture();
        let layer = filled_dense(&mut scene);
        // 800/32 divides evenly: the +1 guard column past the ceiling is
        // what keeps a partially scrolled edge covered. 600/32 does not,
        // so the rows get both the ceiled partial row and the guard.
        let range = layer.visible_range(&mut scene, &mut camera).unwrap();
        assert!(range.cols() >= 26);
        assert!(range.rows() >= 20);
        assert_eq!((range.min_x, range.min_y), (0, 0));
        assert_eq!((range.max_x, range.max_y), (26, 20));
    }

    #[test]
    fn aligned_interior_view_keeps_its_edge_tiles() {
        let (mut scene, mut camera, _, _) = fixture();
        let layer = filled_dense(&mut scene);
        // View [1600,2400)×[1600,2200): both x edges sit on grid lines.
        scene.set_position(camera.node(), dvec2(1600.0, 1600.0));

        let range = layer.visible_range(&mut scene, &mut camera).unwrap();
        assert_eq!((range.min_x, range.max_x), (50, 76));
        assert_eq!((range.min_y, range.max_y), (50, 70));
        assert_eq!(range.cols(), 26);
        assert_eq!(range.rows(), 20);
    }

    #[test]
    fn range_clamps_to_the_layer_edges() {
        let (mut scene, mut camera, _, _) = fixture();
        let layer = filled_dense(&mut scene);
        // Part of the viewport hangs off the grid's top-left.
        scene.set_position(camera.node(), dvec2(-100.0, -100.0));
        let range = layer.visible_range(&mut scene, &mut camera).unwrap();
        assert_eq!((range.min_x, range.min_y), (0, 0));
        assert_eq!((range.max_x, range.max_y), (23, 17));

        // Far off the grid entirely: empty window.
        scene.set_position(camera.node(), dvec2(-10_000.0, 0.0));
        let range = layer.visible_range(&mut scene, &mut camera).unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn layer_scale_shrinks_the_window_in_tile_space() {
        let (mut scene, mut camera, _, _) = fixture();
        let layer = filled_dense(&mut scene);
        scene.set_position(camera.node(), dvec2(1600.0, 1600.0));
        // A layer drawn at 2x covers the same viewport with half the tiles.
        scene.set_scale_uniform(layer.node(), 2.0);

        let range = layer.visible_range(&mut scene, &mut camera).unwrap();
        assert_eq!((range.min_x, range.max_x), (25, 39));
        assert_eq!((range.min_y, range.max_y), (25, 36));
    }

    #[test]
    fn degenerate_layer_has_no_visible_range() {
        let (mut scene, mut camera, catalog, atlas) = fixture();
        let layer = filled_dense(&mut scene);
        scene.set_scale(layer.node(), dvec2(0.0, 1.0));

        assert!(layer.visible_range(&mut scene, &mut camera).is_none());

        let mut batch = QuadBatch::new(64);
        layer.emit(&mut scene, &mut camera, &catalog, &atlas, &mut batch);
        assert_eq!(batch.quad_count(), 0);
    }

    #[test]
    fn emit_covers_the_visible_window() {
        let (mut scene, mut camera, catalog, atlas) = fixture();
        let layer = filled_dense(&mut scene);
        scene.set_position(camera.node(), dvec2(1600.0, 1600.0));

        let mut batch = QuadBatch::new(1024);
        layer.emit(&mut scene, &mut camera, &catalog, &atlas, &mut batch);
        assert_eq!(batch.quad_count(), 26 * 20);
        assert_eq!(batch.index_count(), 26 * 20 * 6);

        // First record is the window's top-left tile corner in world space.
        let v = batch.vertices()[0];
        assert_eq!(v.position, [50.0 * 32.0, 50.0 * 32.0]);
    }

    #[test]
    fn emit_skips_empty_and_invisible_cells() {
        let (mut scene, mut camera, mut catalog, atlas) = fixture();
        // The whole 4x4 grid sits inside the origin camera's view.
        let mut layer = TileLayer::dense(&mut scene, 4, 4, 32.0, 32.0);

        let ghost = catalog
            .register(TileType {
                cell: NO_CELL,
                offset: DVec2::ZERO,
            })
            .unwrap();
        layer.set_tile(0, 0, 1).unwrap();
        layer.set_tile(1, 0, ghost).unwrap();
        layer.set_tile(2, 0, 99).unwrap(); // unknown type

        let mut batch = QuadBatch::new(64);
        layer.emit(&mut scene, &mut camera, &catalog, &atlas, &mut batch);
        assert_eq!(batch.quad_count(), 1);
    }

    #[test]
    fn per_type_offset_shifts_the_quad() {
        let (mut scene, mut camera, mut catalog, atlas) = fixture();
        let mut layer = TileLayer::dense(&mut scene, 4, 4, 32.0, 32.0);

        let bush = catalog
            .register(TileType {
                cell: 0,
                offset: dvec2(0.0, -8.0),
            })
            .unwrap();
        layer.set_tile(1, 1, bush).unwrap();

        let mut batch = QuadBatch::new(64);
        layer.emit(&mut scene, &mut camera, &catalog, &atlas, &mut batch);
        assert_eq!(batch.quad_count(), 1);
        assert_eq!(batch.vertices()[0].position, [32.0, 24.0]);
    }

    #[test]
    fn invisible_layer_emits_nothing() {
        let (mut scene, mut camera, catalog, atlas) = fixture();
        let mut layer = filled_dense(&mut scene);
        layer.alpha = 0.0;

        let mut batch = QuadBatch::new(64);
        layer.emit(&mut scene, &mut camera, &catalog, &atlas, &mut batch);
        assert_eq!(batch.quad_count(), 0);
    }
}
