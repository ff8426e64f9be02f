//! # QuadBatch — Per-Frame Vertex Accumulation
//!
//! The CPU side of the batch renderer. Each frame:
//! 1. `clear()` resets the accumulator (capacity retained)
//! 2. sprites and tile layers append quads — four [`QuadVertex`] records
//!    each, in fixed winding (top-left, top-right, bottom-right,
//!    bottom-left)
//! 3. the pipeline uploads `vertices()` and draws `index_count()` indices
//!    from the shared index table
//!
//! ## The Shared Index Table
//!
//! Every quad uses the same six-index triangle pattern `(0,1,2, 0,2,3)`
//! relative to its base vertex, so the index buffer depends only on the
//! quad *count*, never on their content. It is generated once for a
//! maximum quad count and reused every frame.
//!
//! ## Overflow Policy
//!
//! A frame that emits more quads than the table covers grows the table to
//! match (logged at debug) rather than dropping geometry. Sixteen-bit
//! indices address at most [`MAX_INDEXED_QUADS`] quads per draw; frames
//! beyond that keep accumulating vertices and the pipeline issues chunked
//! draws with base-vertex offsets.

use crate::math::DVec2;

use super::atlas::UvRect;
use super::vertex::QuadVertex;

/// Most quads addressable by one 16-bit index range: 65536 vertices / 4.
pub const MAX_INDEXED_QUADS: usize = u16::MAX as usize / 4 + 1;

/// Growable accumulator of quad geometry plus the shared index table.
pub struct QuadBatch {
    vertices: Vec<QuadVertex>,
    indices: Vec<u16>,
    indexed_quads: usize,
}

/// Build one quad's four vertex records in canonical winding.
///
/// `corners` are world-space in the same order as the winding: top-left,
/// top-right, bottom-right, bottom-left.
pub fn quad_vertices(corners: [DVec2; 4], uv: UvRect, alpha: f32) -> [QuadVertex; 4] {
    let uvs = [
        [uv.u0, uv.v0],
        [uv.u1, uv.v0],
        [uv.u1, uv.v1],
        [uv.u0, uv.v1],
    ];
    std::array::from_fn(|i| QuadVertex {
        position: [corners[i].x as f32, corners[i].y as f32],
        uv: uvs[i],
        alpha,
    })
}

impl QuadBatch {
    /// Create a batch with an index table covering `max_quads` quads.
    pub fn new(max_quads: usize) -> Self {
        let indexed_quads = max_quads.min(MAX_INDEXED_QUADS);
        Self {
            vertices: Vec::with_capacity(max_quads * 4),
            indices: build_index_table(indexed_quads),
            indexed_quads,
        }
    }

    /// Reset the accumulator for a new frame. Allocations are retained.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Append one quad.
    pub fn add_quad(&mut self, corners: [DVec2; 4], uv: UvRect, alpha: f32) {
        self.vertices.extend_from_slice(&quad_vertices(corners, uv, alpha));
        self.ensure_indexed();
    }

    /// Bulk-append precomputed records — tile layers use this to append a
    /// whole visible window in one call instead of one call per tile.
    pub fn extend_from(&mut self, records: &[QuadVertex]) {
        debug_assert!(records.len() % 4 == 0, "records must be whole quads");
        self.vertices.extend_from_slice(records);
        self.ensure_indexed();
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Total indices the accumulated geometry requires: six per quad.
    pub fn index_count(&self) -> usize {
        (self.vertex_count() / 4) * 6
    }

    pub fn vertices(&self) -> &[QuadVertex] {
        &self.vertices
    }

    /// The live slice of the index table: six indices per accumulated quad,
    /// capped at the 16-bit addressing limit (the pipeline walks chunks
    /// past it).
    pub fn indices(&self) -> &[u16] {
        &self.indices[..self.quad_count().min(self.indexed_quads) * 6]
    }

    fn ensure_indexed(&mut self) {
        let quads = self.quad_count();
        if quads > self.indexed_quads && self.indexed_quads < MAX_INDEXED_QUADS {
            let grown = quads.min(MAX_INDEXED_QUADS);
            log::debug!(
                "quad batch exceeded its index table ({} > {}); growing to {}",
                quads,
                self.indexed_quads,
                grown
            );
            self.indices = build_index_table(grown);
            self.indexed_quads = grown;
        }
    }
}

fn build_index_table(quads: usize) -> Vec<u16> {
    let mut indices = Vec::with_capacity(quads * 6);
    for q in 0..quads {
        let base = (q * 4) as u16;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::dvec2;

    const UV: UvRect = UvRect {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    fn unit_quad() -> [DVec2; 4] {
        [
            dvec2(0.0, 0.0),
            dvec2(1.0, 0.0),
            dvec2(1.0, 1.0),
            dvec2(0.0, 1.0),
        ]
    }

    #[test]
    fn three_quads_need_eighteen_indices() {
        let mut batch = QuadBatch::new(64);
        for _ in 0..3 {
            batch.add_quad(unit_quad(), UV, 1.0);
        }
        assert_eq!(batch.vertex_count(), 12);
        assert_eq!(batch.index_count(), 18);
        assert_eq!(batch.indices().len(), 18);
    }

    #[test]
    fn index_pattern_is_two_triangles_per_quad() {
        let mut batch = QuadBatch::new(4);
        batch.add_quad(unit_quad(), UV, 1.0);
        batch.add_quad(unit_quad(), UV, 1.0);
        assert_eq!(
            batch.indices(),
            &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]
        );
    }

    #[test]
    fn clear_retains_capacity() {
        let mut batch = QuadBatch::new(8);
        for _ in 0..8 {
            batch.add_quad(unit_quad(), UV, 1.0);
        }
        let cap = batch.vertices.capacity();
        batch.clear();
        assert_eq!(batch.quad_count(), 0);
        assert_eq!(batch.index_count(), 0);
        assert_eq!(batch.vertices.capacity(), cap);
    }

    #[test]
    fn overflowing_the_table_grows_it() {
        let mut batch = QuadBatch::new(2);
        for _ in 0..5 {
            batch.add_quad(unit_quad(), UV, 1.0);
        }
        // Nothing dropped: all five quads are indexable.
        assert_eq!(batch.quad_count(), 5);
        assert_eq!(batch.indices().len(), 30);
        assert_eq!(batch.indices()[24..], [16, 17, 18, 16, 18, 19]);
    }

    #[test]
    fn bulk_append_matches_per_quad_append() {
        let records = quad_vertices(unit_quad(), UV, 0.5);
        let mut bulk = QuadBatch::new(4);
        bulk.extend_from(&records);

        let mut single = QuadBatch::new(4);
        single.add_quad(unit_quad(), UV, 0.5);

        assert_eq!(bulk.vertices(), single.vertices());
    }

    #[test]
    fn winding_is_tl_tr_br_bl() {
        let mut batch = QuadBatch::new(1);
        batch.add_quad(
            [
                dvec2(0.0, 0.0),
                dvec2(2.0, 0.0),
                dvec2(2.0, 3.0),
                dvec2(0.0, 3.0),
            ],
            UvRect {
                u0: 0.1,
                v0: 0.2,
                u1: 0.3,
                v1: 0.4,
            },
            1.0,
        );
        let v = batch.vertices();
        assert_eq!(v[0].position, [0.0, 0.0]);
        assert_eq!(v[0].uv, [0.1, 0.2]);
        assert_eq!(v[1].position, [2.0, 0.0]);
        assert_eq!(v[1].uv, [0.3, 0.2]);
        assert_eq!(v[2].position, [2.0, 3.0]);
        assert_eq!(v[2].uv, [0.3, 0.4]);
        assert_eq!(v[3].position, [0.0, 3.0]);
        assert_eq!(v[3].uv, [0.1, 0.4]);
    }
}
