//! Texture-atlas cell lookup and UV derivation.
//!
//! The atlas itself (image packing, upload) belongs to the texture
//! collaborator; this module only maps cell indices to pixel rectangles
//! and turns those into normalized UVs. The far edge of every cell is
//! inset by one texel so linear sampling at cell boundaries never bleeds
//! into the neighbor.

/// Cell index meaning "renders nothing".
pub const NO_CELL: i32 = -1;

/// A sub-rectangle of the atlas image, in atlas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasCell {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Normalized texture coordinates for one quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

/// Cell table for one atlas image.
#[derive(Debug, Clone)]
pub struct Atlas {
    width: f32,
    height: f32,
    cells: Vec<AtlasCell>,
}

impl Atlas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            cells: Vec::new(),
        }
    }

    /// Register a cell, returning its index.
    pub fn add_cell(&mut self, cell: AtlasCell) -> i32 {
        self.cells.push(cell);
        (self.cells.len() - 1) as i32
    }

    /// Look up a cell. [`NO_CELL`] and out-of-range indices are absent, not
    /// errors — the caller decides whether absence matters.
    pub fn cell(&self, index: i32) -> Option<AtlasCell> {
        usize::try_from(index).ok().and_then(|i| self.cells.get(i)).copied()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Normalized UVs for a cell, far edge inset by one texel.
    pub fn uv_rect(&self, cell: &AtlasCell) -> UvRect {
        UvRect {
            u0: cell.x / self.width,
            v0: cell.y / self.height,
            u1: (cell.x + cell.w - 1.0) / self.width,
            v1: (cell.y + cell.h - 1.0) / self.height,
        }
    }
}
