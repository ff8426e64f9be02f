//! # TileLayer — Dense and Sparse Tile Grids
//!
//! A tile layer owns a scene node (so it scrolls, scales and rotates like
//! any other object) plus its grid data. Two storage variants form a
//! closed set:
//!
//! - **Dense**: a `width × height` row-major `Vec<i32>` of tile-type
//!   indices; coordinates outside `[0,w)×[0,h)` are absent.
//! - **Sparse**: an `FxHashMap` keyed by `(x, y)` with an arbitrary
//!   placement offset, supporting negative coordinates.
//!
//! Both expose the same capability set (`tile_at`, `set_tile`,
//! `count_tiles`, `indices_by_type`, bulk edits). Bulk edits are
//! implemented for dense layers; the sparse variant declares them on the
//! interface but answers [`TileError::Unsupported`] with a logged warning
//! so integrators can see the unfulfilled contract.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::scene::{NodeKey, SceneGraph};

use super::{EMPTY_TILE, TileError};

/// Serializable form of a layer's grid, e.g. for JSON map files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileLayerData {
    Dense {
        width: u32,
        height: u32,
        /// Row-major, `width × height` entries.
        tiles: Vec<i32>,
    },
    Sparse {
        /// Placement offset added to stored coordinates.
        origin: [i64; 2],
        /// `(x, y, tile_type)` placements in stored coordinates.
        tiles: Vec<(i64, i64, i32)>,
    },
}

/// In-memory grid storage.
pub enum TileData {
    Dense {
        width: u32,
        height: u32,
        tiles: Vec<i32>,
    },
    Sparse {
        origin: (i64, i64),
        tiles: FxHashMap<(i64, i64), i32>,
    },
}

pub struct TileLayer {
    node: NodeKey,
    tile_width: f64,
    tile_height: f64,
    /// Layer-wide opacity; `<= 0` renders nothing.
    pub alpha: f32,
    data: TileData,
}

impl TileLayer {
    /// Create an empty dense layer.
    pub fn dense(
        scene: &mut SceneGraph,
        width: u32,
        height: u32,
        tile_width: f64,
        tile_height: f64,
    ) -> Self {
        Self {
            node: scene.spawn(),
            tile_width,
            tile_height,
            alpha: 1.0,
            data: TileData::Dense {
                width,
                height,
                // Widen before multiplying: u32 x u32 can wrap for map
                // dimensions that are individually in range.
                tiles: vec![EMPTY_TILE; width as usize * height as usize],
            },
        }
    }

    /// Create an empty sparse layer with a placement offset.
    pub fn sparse(
        scene: &mut SceneGraph,
        origin: (i64, i64),
        tile_width: f64,
        tile_height: f64,
    ) -> Self {
        Self {
            node: scene.spawn(),
            tile_width,
            tile_height,
            alpha: 1.0,
            data: TileData::Sparse {
                origin,
                tiles: FxHashMap::default(),
            },
        }
    }

    /// Build a layer from its serializable form. Empty entries in sparse
    /// placement lists are dropped on load.
    pub fn from_data(
        scene: &mut SceneGraph,
        data: TileLayerData,
        tile_width: f64,
        tile_height: f64,
    ) -> Self {
        let data = match data {
            TileLayerData::Dense {
                width,
                height,
                mut tiles,
            } => {
                tiles.resize(width as usize * height as usize, EMPTY_TILE);
                TileData::Dense {
                    width,
                    height,
                    tiles,
                }
            }
            TileLayerData::Sparse { origin, tiles } => TileData::Sparse {
                origin: (origin[0], origin[1]),
                tiles: tiles
                    .into_iter()
                    .filter(|&(_, _, t)| t != EMPTY_TILE)
                    .map(|(x, y, t)| ((x, y), t))
                    .collect(),
            },
        };
        Self {
            node: scene.spawn(),
            tile_width,
            tile_height,
            alpha: 1.0,
            data,
        }
    }

    /// Snapshot the grid into its serializable form.
    pub fn to_data(&self) -> TileLayerData {
        match &self.data {
            TileData::Dense {
                width,
                height,
                tiles,
            } => TileLayerData::Dense {
                width: *width,
                height: *height,
                tiles: tiles.clone(),
            },
            TileData::Sparse { origin, tiles } => {
                let mut placements: Vec<_> =
                    tiles.iter().map(|(&(x, y), &t)| (x, y, t)).collect();
                placements.sort_unstable();
                TileLayerData::Sparse {
                    origin: [origin.0, origin.1],
                    tiles: placements,
                }
            }
        }
    }

    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn tile_size(&self) -> (f64, f64) {
        (self.tile_width, self.tile_height)
    }

    pub fn data(&self) -> &TileData {
        &self.data
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// The tile type at a layer coordinate, or `None` when the coordinate
    /// is outside the grid or holds the empty type. Absence is meaningful
    /// data for callers, never an error.
    pub fn tile_at(&self, x: i64, y: i64) -> Option<i32> {
        match &self.data {
            TileData::Dense {
                width,
                height,
                tiles,
            } => {
                if x < 0 || y < 0 || x >= *width as i64 || y >= *height as i64 {
                    return None;
                }
                let t = tiles[(x + y * *width as i64) as usize];
                (t != EMPTY_TILE).then_some(t)
            }
            TileData::Sparse { origin, tiles } => {
                tiles.get(&(x - origin.0, y - origin.1)).copied()
            }
        }
    }

    /// Place a tile type at a coordinate. Setting [`EMPTY_TILE`] clears the
    /// cell.
    pub fn set_tile(&mut self, x: i64, y: i64, tile_type: i32) -> Result<(), TileError> {
        match &mut self.data {
            TileData::Dense {
                width,
                height,
                tiles,
            } => {
                if x < 0 || y < 0 || x >= *width as i64 || y >= *height as i64 {
                    return Err(TileError::OutOfBounds { x, y });
                }
                tiles[(x + y * *width as i64) as usize] = tile_type;
                Ok(())
            }
            TileData::Sparse { origin, tiles } => {
                let key = (x - origin.0, y - origin.1);
                if tile_type == EMPTY_TILE {
                    tiles.remove(&key);
                } else {
                    tiles.insert(key, tile_type);
                }
                Ok(())
            }
        }
    }

    /// Count of non-empty cells.
    pub fn count_tiles(&self) -> usize {
        match &self.data {
            TileData::Dense { tiles, .. } => {
                tiles.iter().filter(|&&t| t != EMPTY_TILE).count()
            }
            TileData::Sparse { tiles, .. } => tiles.len(),
        }
    }

    /// All layer coordinates holding the given tile type.
    pub fn indices_by_type(&self, tile_type: i32) -> Vec<(i64, i64)> {
        match &self.data {
            TileData::Dense { width, tiles, .. } => tiles
                .iter()
                .enumerate()
                .filter(|&(_, &t)| t == tile_type && t != EMPTY_TILE)
                .map(|(i, _)| ((i % *width as usize) as i64, (i / *width as usize) as i64))
                .collect(),
            TileData::Sparse { origin, tiles } => tiles
                .iter()
                .filter(|&(_, &t)| t == tile_type)
                .map(|(&(x, y), _)| (x + origin.0, y + origin.1))
                .collect(),
        }
    }

    /// Valid coordinate range `(min_x, min_y, max_x, max_y)`, max exclusive.
    /// `None` when the layer holds no addressable cells.
    pub(crate) fn coord_bounds(&self) -> Option<(i64, i64, i64, i64)> {
        match &self.data {
            TileData::Dense { width, height, .. } => {
                Some((0, 0, *width as i64, *height as i64))
            }
            TileData::Sparse { origin, tiles } => {
                let mut keys = tiles.keys();
                let &(x0, y0) = keys.next()?;
                let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
                for &(x, y) in keys {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
                Some((
                    min_x + origin.0,
                    min_y + origin.1,
                    max_x + origin.0 + 1,
                    max_y + origin.1 + 1,
                ))
            }
        }
    }

    // ── Bulk edits ───────────────────────────────────────────────────────

    /// Fill every cell with a type drawn from `choices`.
    pub fn randomize(&mut self, choices: &[i32]) -> Result<(), TileError> {
        match &mut self.data {
            TileData::Dense { tiles, .. } => {
                if choices.is_empty() {
                    return Ok(());
                }
                for t in tiles.iter_mut() {
                    *t = choices[fastrand::usize(..choices.len())];
                }
                Ok(())
            }
            TileData::Sparse { .. } => {
                log::warn!("randomize called on a sparse tile layer: not supported");
                Err(TileError::Unsupported("randomize"))
            }
        }
    }

    /// Exchange every occurrence of `a` with `b` and vice versa.
    pub fn swap_types(&mut self, a: i32, b: i32) -> Result<(), TileError> {
        match &mut self.data {
            TileData::Dense { tiles, .. } => {
                for t in tiles.iter_mut() {
                    if *t == a {
                        *t = b;
                    } else if *t == b {
                        *t = a;
                    }
                }
                Ok(())
            }
            TileData::Sparse { .. } => {
                log::warn!("swap_types called on a sparse tile layer: not supported");
                Err(TileError::Unsupported("swap_types"))
            }
        }
    }

    /// Fill a rectangular region with one type. The whole region must lie
    /// inside the grid.
    pub fn replace_region(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        tile_type: i32,
    ) -> Result<(), TileError> {
        match &mut self.data {
            TileData::Dense {
                width,
                height,
                tiles,
            } => {
                if x < 0 || y < 0 || x + w > *width as i64 || y + h > *height as i64 {
                    return Err(TileError::OutOfBounds { x, y });
                }
                for row in y..y + h {
                    for col in x..x + w {
                        tiles[(col + row * *width as i64) as usize] = tile_type;
                    }
                }
                Ok(())
            }
            TileData::Sparse { .. } => {
                log::warn!("replace_region called on a sparse tile layer: not supported");
                Err(TileError::Unsupported("replace_region"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_set_get_round_trip() {
        let mut scene = SceneGraph::new();
        let mut layer = TileLayer::dense(&mut scene, 10, 8, 32.0, 32.0);

        layer.set_tile(3, 5, 7).unwrap();
        assert_eq!(layer.tile_at(3, 5), Some(7));
        assert_eq!(layer.tile_at(3, 4), None);
        assert_eq!(layer.count_tiles(), 1);

        layer.set_tile(3, 5, EMPTY_TILE).unwrap();
        assert_eq!(layer.tile_at(3, 5), None);
        assert_eq!(layer.count_tiles(), 0);
    }

    #[test]
    fn dense_out_of_range_is_absent_or_error() {
        let mut scene = SceneGraph::new();
        let mut layer = TileLayer::dense(&mut scene, 10, 8, 32.0, 32.0);

        assert_eq!(layer.tile_at(-1, 0), None);
        assert_eq!(layer.tile_at(10, 0), None);
        assert_eq!(layer.tile_at(0, 8), None);
        assert_eq!(
            layer.set_tile(10, 0, 1),
            Err(TileError::OutOfBounds { x: 10, y: 0 })
        );
    }

    #[test]
    fn sparse_supports_negative_coordinates_and_offset() {
        let mut scene = SceneGraph::new();
        let mut layer = TileLayer::sparse(&mut scene, (100, 200), 16.0, 16.0);

        layer.set_tile(-5, -9, 2).unwrap();
        assert_eq!(layer.tile_at(-5, -9), Some(2));
        assert_eq!(layer.tile_at(-5, -8), None);

        // Writing the empty type clears the cell.
        layer.set_tile(-5, -9, EMPTY_TILE).unwrap();
        assert_eq!(layer.count_tiles(), 0);
    }

    #[test]
    fn indices_by_type_reports_layer_coordinates() {
        let mut scene = SceneGraph::new();
        let mut layer = TileLayer::dense(&mut scene, 4, 4, 32.0, 32.0);
        layer.set_tile(1, 2, 9).unwrap();
        layer.set_tile(3, 0, 9).unwrap();
        layer.set_tile(0, 0, 5).unwrap();

        let mut hits = layer.indices_by_type(9);
        hits.sort_unstable();
        assert_eq!(hits, vec![(1, 2), (3, 0)]);
        assert!(layer.indices_by_type(EMPTY_TILE).is_empty());
    }

    #[test]
    fn dense_bulk_edits_apply() {
        let mut scene = SceneGraph::new();
        let mut layer = TileLayer::dense(&mut scene, 6, 6, 32.0, 32.0);

        layer.randomize(&[1, 2]).unwrap();
        assert_eq!(layer.count_tiles(), 36);

        layer.replace_region(0, 0, 6, 3, 3).unwrap();
        assert_eq!(layer.tile_at(5, 2), Some(3));
        assert_eq!(layer.indices_by_type(3).len(), 18);

        layer.swap_types(3, 1).unwrap();
        assert_eq!(layer.tile_at(5, 2), Some(1));

        assert_eq!(
            layer.replace_region(4, 4, 4, 4, 1),
            Err(TileError::OutOfBounds { x: 4, y: 4 })
        );
    }

    #[test]
    fn sparse_bulk_edits_fail_loudly() {
        let mut scene = SceneGraph::new();
        let mut layer = TileLayer::sparse(&mut scene, (0, 0), 32.0, 32.0);
        layer.set_tile(1, 1, 1).unwrap();

        assert_eq!(
            layer.randomize(&[1]),
            Err(TileError::Unsupported("randomize"))
        );
        assert_eq!(
            layer.swap_types(1, 2),
            Err(TileError::Unsupported("swap_types"))
        );
        assert_eq!(
            layer.replace_region(0, 0, 1, 1, 2),
            Err(TileError::Unsupported("replace_region"))
        );
        // The failed edits left the data untouched.
        assert_eq!(layer.tile_at(1, 1), Some(1));
    }

    #[test]
    fn dense_from_data_pads_to_the_full_grid() {
        let mut scene = SceneGraph::new();
        let data = TileLayerData::Dense {
            width: 4,
            height: 3,
            tiles: vec![7; 5],
        };
        let mut layer = TileLayer::from_data(&mut scene, data, 32.0, 32.0);

        assert_eq!(layer.count_tiles(), 5);
        assert_eq!(layer.tile_at(0, 1), Some(7));
        assert_eq!(layer.tile_at(1, 1), None);

        // Every cell up to width x height is addressable after the pad.
        layer.set_tile(3, 2, 9).unwrap();
        assert_eq!(layer.tile_at(3, 2), Some(9));
        assert_eq!(layer.count_tiles(), 6);
    }

    #[test]
    fn data_round_trips_through_json() {
        let mut scene = SceneGraph::new();
        let mut layer = TileLayer::sparse(&mut scene, (10, 10), 32.0, 32.0);
        layer.set_tile(12, 15, 4).unwrap();
        layer.set_tile(-3, 10, 2).unwrap();

        let json = serde_json::to_string(&layer.to_data()).unwrap();
        let data: TileLayerData = serde_json::from_str(&json).unwrap();
        let restored = TileLayer::from_data(&mut scene, data, 32.0, 32.0);

        assert_eq!(restored.tile_at(12, 15), Some(4));
        assert_eq!(restored.tile_at(-3, 10), Some(2));
        assert_eq!(restored.count_tiles(), 2);
    }
}
