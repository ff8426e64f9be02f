//! Tile layers: catalog of tile types, dense/sparse grids, and the
//! camera-driven visible-range renderer.
//!
//! A grid cell stores a *tile-type index* into the [`TileCatalog`]; the
//! type supplies the atlas cell and a per-type pixel offset at render
//! time. Index [`EMPTY_TILE`] (0) is reserved for "no tile here".

pub mod layer;
pub mod render;

pub use layer::{TileData, TileLayer, TileLayerData};
pub use render::TileRange;

use thiserror::Error;

use crate::math::DVec2;
use crate::render2d::NO_CELL;

/// Reserved tile-type index meaning "empty / no tile".
pub const EMPTY_TILE: i32 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileError {
    /// The operation is declared on the layer interface but this variant
    /// does not implement it. Callers get a loud failure, never a silent
    /// no-op.
    #[error("`{0}` is not supported on this layer variant")]
    Unsupported(&'static str),
    #[error("tile coordinate ({x}, {y}) is outside the layer")]
    OutOfBounds { x: i64, y: i64 },
    /// A tile type declared a cell index that cannot exist in any atlas.
    #[error("invalid atlas cell index {0} for tile type")]
    InvalidCell(i32),
}

/// Reusable tile descriptor shared by many grid cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileType {
    /// Atlas cell index, or [`NO_CELL`] for a type that renders nothing.
    pub cell: i32,
    /// Pixel offset applied to the quad at render time.
    pub offset: DVec2,
}

/// Registry mapping tile-type indices to their descriptors.
///
/// Slot 0 is the reserved empty type and never resolves; registered types
/// start at index 1.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    types: Vec<TileType>,
}

impl TileCatalog {
    pub fn new() -> Self {
        Self {
            types: vec![TileType {
                cell: NO_CELL,
                offset: DVec2::ZERO,
            }],
        }
    }

    /// Register a tile type and return its index.
    ///
    /// A negative cell index other than the [`NO_CELL`] sentinel is a
    /// programmer error and is refused rather than silently clamped.
    pub fn register(&mut self, tile_type: TileType) -> Result<i32, TileError> {
        if tile_type.cell < NO_CELL {
            return Err(TileError::InvalidCell(tile_type.cell));
        }
        self.types.push(tile_type);
        Ok((self.types.len() - 1) as i32)
    }

    /// Resolve a tile-type index. The empty type and unknown indices are
    /// absent, not errors.
    pub fn get(&self, index: i32) -> Option<&TileType> {
        if index <= EMPTY_TILE {
            return None;
        }
        self.types.get(index as usize)
    }

    /// Number of registered types, excluding the reserved empty slot.
    pub fn len(&self) -> usize {
        self.types.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TileCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_types_start_at_one() {
        let mut catalog = TileCatalog::new();
        let grass = catalog
            .register(TileType {
                cell: 3,
                offset: DVec2::ZERO,
            })
            .unwrap();
        assert_eq!(grass, 1);
        assert_eq!(catalog.get(grass).unwrap().cell, 3);
    }

    #[test]
    fn empty_and_unknown_indices_resolve_to_none() {
        let catalog = TileCatalog::new();
        assert!(catalog.get(EMPTY_TILE).is_none());
        assert!(catalog.get(-1).is_none());
        assert!(catalog.get(7).is_none());
    }

    #[test]
    fn negative_cell_other_than_sentinel_is_refused() {
        let mut catalog = TileCatalog::new();
        assert_eq!(
            catalog.register(TileType {
                cell: -2,
                offset: DVec2::ZERO,
            }),
            Err(TileError::InvalidCell(-2))
        );
        // The sentinel itself is a valid "invisible" type.
        assert!(
            catalog
                .register(TileType {
                    cell: NO_CELL,
                    offset: DVec2::ZERO,
                })
                .is_ok()
        );
    }
}
