//! Host scene contract.
//!
//! The gizmo never owns scene nodes. Everything it needs from the renderer
//! (graph edits, matrices, masks, colour uniforms, ray casts, camera state)
//! goes through [`SceneHost`]. Node identity is an opaque [`NodeId`].

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::mask::PickMask;
use crate::shapes::HandleShape;

/// Opaque identity of a host scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors reported by a host scene graph.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unknown scene node {0}")]
    UnknownNode(NodeId),

    #[error("Node {child} cannot be parented under {parent}: would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Node {0} is not a transform node")]
    NotATransform(NodeId),
}

/// One ray/geometry intersection reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Intersection point in the local frame of the intersected geometry.
    pub point: Vec3,
    /// Position along the cast segment, 0 at the near plane and 1 at the far plane.
    pub ratio: f32,
    /// Nodes from the traversal root down to the intersected geometry.
    pub node_path: Vec<NodeId>,
}

impl Hit {
    /// The intersected geometry node.
    pub fn leaf(&self) -> Option<NodeId> {
        self.node_path.last().copied()
    }
}

/// Render-surface viewport in native pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Matrix mapping normalized device coordinates to window pixels and
    /// depth `[-1, 1]` to `[0, 1]`.
    pub fn window_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.x, self.y, 0.0))
            * Mat4::from_scale(Vec3::new(0.5 * self.width, 0.5 * self.height, 0.5))
            * Mat4::from_translation(Vec3::ONE)
    }
}

/// Camera state consumed by the projection math.
///
/// `projection` uses the OpenGL clip convention (depth in `[-1, 1]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub view: Mat4,
    pub projection: Mat4,
    pub viewport: Option<Viewport>,
    /// World-space eye position.
    pub eye: Vec3,
}

impl CameraState {
    /// Camera at `eye` looking at `target`, with a viewport covering the
    /// whole render surface.
    #[allow(clippy::too_many_arguments)]
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_radians: f32,
        surface_width: f32,
        surface_height: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, up),
            projection: Mat4::perspective_rh_gl(
                fov_y_radians,
                surface_width / surface_height,
                near,
                far,
            ),
            viewport: Some(Viewport::new(0.0, 0.0, surface_width, surface_height)),
            eye,
        }
    }

    /// world → window pixel matrix (view, then projection, then viewport).
    pub fn view_projection_window(&self) -> Mat4 {
        let window = self
            .viewport
            .map(|viewport| viewport.window_matrix())
            .unwrap_or(Mat4::IDENTITY);
        window * self.projection * self.view
    }

    /// Scale factor carried by the projection matrix (length of its first column).
    pub fn projection_scale(&self) -> f32 {
        self.projection.x_axis.truncate().length()
    }
}

/// Canvas geometry: CSS client size and native drawing-buffer size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    /// Drawing-buffer width in native pixels.
    pub width: f32,
    /// Drawing-buffer height in native pixels.
    pub height: f32,
    /// Displayed width in canvas (CSS) pixels.
    pub client_width: f32,
    /// Displayed height in canvas (CSS) pixels.
    pub client_height: f32,
}

impl CanvasSize {
    /// Canvas whose drawing buffer matches its client size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            client_width: width,
            client_height: height,
        }
    }

    pub fn min_client_dimension(&self) -> f32 {
        self.client_width.min(self.client_height)
    }
}

impl From<&nodegizmo_config::DisplayConfig> for CanvasSize {
    fn from(config: &nodegizmo_config::DisplayConfig) -> Self {
        Self {
            width: config.scaled_width() as f32,
            height: config.scaled_height() as f32,
            client_width: config.width_f32(),
            client_height: config.height_f32(),
        }
    }
}

/// Callback of a line traversal.
///
/// `enter` is called for every node whose mask passes the traversal mask,
/// with the segment expressed in the frame the node's own matrix is applied
/// in (its parent's frame). Returning `false` prunes the subtree.
pub trait LineVisitor {
    fn enter(&mut self, node: NodeId, start: Vec3, end: Vec3) -> bool;
}

/// Everything the gizmo consumes from the host renderer.
pub trait SceneHost {
    /// Create a detached transform node.
    fn create_transform(&mut self, matrix: Mat4) -> NodeId;

    /// Create a detached geometry node drawing or picking `shape`.
    fn create_geometry(&mut self, shape: HandleShape) -> NodeId;

    fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError>;

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError>;

    fn parents(&self, node: NodeId) -> Result<Vec<NodeId>, SceneError>;

    /// Local matrix of a transform node.
    fn matrix(&self, node: NodeId) -> Result<Mat4, SceneError>;

    fn set_matrix(&mut self, node: NodeId, matrix: Mat4) -> Result<(), SceneError>;

    /// World matrix along the node's first parent path, including its own matrix.
    fn world_matrix(&self, node: NodeId) -> Result<Mat4, SceneError>;

    fn node_mask(&self, node: NodeId) -> Result<PickMask, SceneError>;

    fn set_node_mask(&mut self, node: NodeId, mask: PickMask) -> Result<(), SceneError>;

    /// Colour uniform of a node, if it carries one.
    fn color(&self, node: NodeId) -> Result<Option<Vec4>, SceneError>;

    fn set_color(&mut self, node: NodeId, color: Vec4) -> Result<(), SceneError>;

    /// Exclude a node from drawing while keeping it pickable.
    fn set_cull_hidden(&mut self, node: NodeId, hidden: bool) -> Result<(), SceneError>;

    /// Tell the host the bounds below `node` changed.
    fn dirty_bound(&mut self, node: NodeId) -> Result<(), SceneError>;

    /// Root of the user scene.
    fn scene_root(&self) -> NodeId;

    /// Root of the camera traversal (parent of the scene root).
    fn camera_root(&self) -> NodeId;

    fn camera(&self) -> CameraState;

    fn canvas(&self) -> CanvasSize;

    /// Cast a ray through render-surface pixel `(x, y)` (Y up) and report
    /// every hit on nodes passing `mask`, in no particular order.
    fn compute_intersections(&self, x: f32, y: f32, mask: PickMask) -> Vec<Hit>;

    /// Traverse the camera graph with a window-space segment (pixels, depth
    /// `[0, 1]`), calling `visitor` on each node passing `mask`.
    fn visit_line(&self, start: Vec3, end: Vec3, mask: PickMask, visitor: &mut dyn LineVisitor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_matrix_maps_ndc_corners() {
        let viewport = Viewport::new(0.0, 0.0, 800.0, 600.0);
        let window = viewport.window_matrix();
        let low = window.transform_point3(Vec3::new(-1.0, -1.0, -1.0));
        let high = window.transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!(low.abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(high.abs_diff_eq(Vec3::new(800.0, 600.0, 1.0), 1e-3));
    }

    #[test]
    fn test_projection_scale_is_first_column_length() {
        let camera = CameraState::look_at(
            Vec3::new(0.0, 0.0, 20.0),
            Vec3::ZERO,
            Vec3::Y,
            std::f32::consts::FRAC_PI_4,
            800.0,
            600.0,
            0.1,
            1000.0,
        );
        let f = 1.0 / (std::f32::consts::FRAC_PI_8).tan();
        let expected = f / (800.0 / 600.0);
        assert!((camera.projection_scale() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_canvas_from_display_config() {
        let mut config = nodegizmo_config::DisplayConfig::new(400, 300);
        config.scale = 2.0;
        let canvas = CanvasSize::from(&config);
        assert_eq!(canvas.width, 800.0);
        assert_eq!(canvas.height, 600.0);
        assert_eq!(canvas.client_width, 400.0);
        assert_eq!(canvas.min_client_dimension(), 300.0);
    }
}
