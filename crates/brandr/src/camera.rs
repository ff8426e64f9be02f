//! # Camera — Stage↔World Conversion Over a Viewport
//!
//! A camera is a transform node plus a viewport. Its concatenated matrix
//! maps **stage space** (viewport pixels, origin top-left) into world
//! space; the cached inverse maps the other way. The node's origin is
//! kept at half the viewport dimensions purely as the rotation/zoom
//! anchor: an unrotated camera at position `p` views the world rectangle
//! `[p.x, p.x+W) × [p.y, p.y+H)`, and rotation/zoom swing around the
//! viewport center without moving it.
//!
//! Both cached matrices follow the same lazy-clean discipline as the scene
//! graph: reads call [`refresh`](Camera::refresh), which recomputes only
//! when the node's world matrix actually changed since the last look.

use glam::Mat4;

use crate::math::{DVec2, Matrix, dvec2};
use crate::scene::{NodeKey, SceneGraph};

pub struct Camera {
    node: NodeKey,
    width: f64,
    height: f64,
    enabled: bool,
    /// Node world matrix at the last refresh (stage → world).
    stage_to_world: Matrix,
    /// Cached inverse (world → stage); `None` when degenerate.
    world_to_stage: Option<Matrix>,
    primed: bool,
}

impl Camera {
    /// Spawn a camera node in `scene` with the given viewport.
    ///
    /// The node's origin anchors rotation and zoom at the viewport center.
    /// The pivot stays zero: a pivot would shift the net translation, and
    /// the camera contract is that stage (0,0) maps to the node position.
    pub fn new(scene: &mut SceneGraph, width: f64, height: f64) -> Self {
        let node = scene.spawn();
        scene.set_origin(node, dvec2(width / 2.0, height / 2.0));
        Self {
            node,
            width,
            height,
            enabled: true,
            stage_to_world: Matrix::IDENTITY,
            world_to_stage: Some(Matrix::IDENTITY),
            primed: false,
        }
    }

    /// The camera's node, for positioning or parenting it like any other
    /// scene object.
    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Disabled cameras are skipped by the caller's render pass.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Apply a viewport resize: re-center the rotation/zoom anchor to half
    /// the new dimensions and dirty the node. The display collaborator
    /// pushes this to every camera when the stage resizes.
    pub fn set_viewport(&mut self, scene: &mut SceneGraph, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        scene.set_origin(self.node, dvec2(width / 2.0, height / 2.0));
    }

    /// Lazy clean: rebuild both cached matrices when the node's world
    /// matrix changed since the last refresh.
    pub fn refresh(&mut self, scene: &mut SceneGraph) {
        let world = scene.world_matrix(self.node);
        if self.primed && world == self.stage_to_world {
            return;
        }
        self.stage_to_world = world;
        self.world_to_stage = world.inverse();
        if self.world_to_stage.is_none() {
            log::warn!("camera transform is degenerate; world-to-stage mapping disabled");
        }
        self.primed = true;
    }

    /// Map a stage-space point (viewport pixels) into world space.
    pub fn transform_stage_to_world(&mut self, scene: &mut SceneGraph, point: DVec2) -> DVec2 {
        self.refresh(scene);
        self.stage_to_world.transform_point(point)
    }

    /// In-place variant for hot paths (per-frame input mapping).
    pub fn transform_stage_to_world_in_place(
        &mut self,
        scene: &mut SceneGraph,
        point: &mut DVec2,
    ) {
        self.refresh(scene);
        self.stage_to_world.transform_point_in_place(point);
    }

    /// Map a world-space point into stage space. A degenerate camera leaves
    /// the point unchanged — conversion runs every frame and must not halt
    /// the loop.
    pub fn transform_world_to_stage(&mut self, scene: &mut SceneGraph, point: DVec2) -> DVec2 {
        self.refresh(scene);
        match &self.world_to_stage {
            Some(inv) => inv.transform_point(point),
            None => point,
        }
    }

    /// In-place variant of [`transform_world_to_stage`](Self::transform_world_to_stage).
    pub fn transform_world_to_stage_in_place(
        &mut self,
        scene: &mut SceneGraph,
        point: &mut DVec2,
    ) {
        self.refresh(scene);
        if let Some(inv) = &self.world_to_stage {
            inv.transform_point_in_place(point);
        }
    }

    /// World→clip matrix for the GPU camera uniform: world→stage composed
    /// with a pixel-space orthographic projection (y-down).
    pub fn view_projection(&mut self, scene: &mut SceneGraph) -> Mat4 {
        self.refresh(scene);
        let ortho = Mat4::orthographic_rh(
            0.0,
            self.width as f32,
            self.height as f32,
            0.0,
            -1.0,
            1.0,
        );
        match &self.world_to_stage {
            Some(inv) => ortho * inv.to_mat4(),
            None => ortho,
        }
    }
}
