//! # Brandr — 2D Scene-Graph Transform and Rendering Core
//!
//! The transform backbone of a 2D engine: a dirty-flag scene graph of 2×3
//! affine matrices, cameras that convert between stage and world space,
//! rectangular hit testing, dense/sparse tile layers with a camera-driven
//! visible-range query, and a batch renderer that turns all of it into a
//! single GPU vertex stream per frame.
//!
//! Start with `use brandr::prelude::*`.

pub mod camera;
pub mod collider;
pub mod math;
pub mod prelude;
pub mod render2d;
pub mod scene;
pub mod tilemap;

/// Initialize `env_logger` with info-level default filtering. Call once at
/// startup; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
