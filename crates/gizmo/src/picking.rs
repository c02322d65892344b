//! Screen ⇄ world conversions and mask-restricted picking.
//!
//! Three coordinate spaces are involved:
//! - **canvas**: CSS pixels reported by mouse events, origin top-left, Y down
//! - **surface**: native drawing-buffer pixels, origin bottom-left, Y up
//! - **world**: scene space
//!
//! All conversions are pure functions of the camera and canvas state.

use std::ops::{Deref, DerefMut};

use glam::{Vec2, Vec3};

use crate::mask::PickMask;
use crate::scene::{CameraState, CanvasSize, Hit, NodeId, SceneError, SceneHost};

/// Canvas pixel to surface pixel (device pixel scaling and Y flip).
pub fn canvas_to_surface(canvas: &CanvasSize, point: Vec2) -> Vec2 {
    Vec2::new(
        point.x * (canvas.width / canvas.client_width),
        (canvas.client_height - point.y) * (canvas.height / canvas.client_height),
    )
}

/// Surface pixel back to canvas pixel; inverse of [`canvas_to_surface`].
pub fn surface_to_canvas(canvas: &CanvasSize, point: Vec2) -> Vec2 {
    Vec2::new(
        point.x / (canvas.width / canvas.client_width),
        canvas.client_height - point.y / (canvas.height / canvas.client_height),
    )
}

/// World-space segment through one surface pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Point on the near plane.
    pub start: Vec3,
    /// Point on the far plane.
    pub end: Vec3,
}

impl Ray {
    /// Point at parameter `t`, 0 at `start` and 1 at `end`.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start.lerp(self.end, t)
    }

    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or_zero()
    }
}

/// Ray through surface pixel `surface`, from window depth 0 to window depth 1.
pub fn screen_to_world_ray(camera: &CameraState, surface: Vec2) -> Ray {
    let inverse = camera.view_projection_window().inverse();
    Ray {
        start: inverse.project_point3(surface.extend(0.0)),
        end: inverse.project_point3(surface.extend(1.0)),
    }
}

/// Project a world point to canvas pixels.
///
/// Applies view, projection and (when present) the viewport window matrix,
/// then undoes the device pixel scaling and Y flip.
pub fn world_to_screen(camera: &CameraState, canvas: &CanvasSize, point: Vec3) -> Vec2 {
    let surface = camera.view_projection_window().project_point3(point);
    surface_to_canvas(canvas, surface.truncate())
}

/// Nearest hit under canvas pixel `canvas_point` on nodes passing `mask`.
///
/// Hits are ordered by their ratio along the picking segment; the smallest
/// wins. Returns `None` when nothing was hit.
pub fn pick_nearest<H: SceneHost + ?Sized>(
    host: &H,
    canvas_point: Vec2,
    mask: PickMask,
) -> Option<Hit> {
    let surface = canvas_to_surface(&host.canvas(), canvas_point);
    host.compute_intersections(surface.x, surface.y, mask)
        .into_iter()
        .min_by(|a, b| a.ratio.total_cmp(&b.ratio))
}

/// Scoped isolation in which only the gizmo subtree is pickable.
///
/// While the guard lives the gizmo root sits under the camera root with a
/// mask of [`PickMask::EVERYTHING`] and the scene root is masked out. Dropping
/// the guard detaches the gizmo, restores the scene root's previous mask and
/// returns the gizmo to [`PickMask::NO_PICK`].
///
/// The guard holds the host mutably, so isolations cannot nest.
pub struct GizmoOnlyPicking<'a, H: SceneHost + ?Sized> {
    host: &'a mut H,
    gizmo_root: NodeId,
    scene_mask: PickMask,
}

impl<'a, H: SceneHost + ?Sized> GizmoOnlyPicking<'a, H> {
    pub fn new(host: &'a mut H, gizmo_root: NodeId) -> Result<Self, SceneError> {
        let scene_root = host.scene_root();
        let camera_root = host.camera_root();
        let scene_mask = host.node_mask(scene_root)?;
        host.add_child(camera_root, gizmo_root)?;

        let guard = Self {
            host,
            gizmo_root,
            scene_mask,
        };
        guard.host.set_node_mask(scene_root, PickMask::empty())?;
        guard.host.set_node_mask(gizmo_root, PickMask::EVERYTHING)?;
        tracing::trace!("Gizmo-only picking enabled for {}", gizmo_root);
        Ok(guard)
    }

    /// Nearest gizmo hit under canvas pixel `canvas_point`.
    pub fn pick(&self, canvas_point: Vec2, mask: PickMask) -> Option<Hit> {
        pick_nearest(&*self.host, canvas_point, mask)
    }
}

impl<H: SceneHost + ?Sized> Deref for GizmoOnlyPicking<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: SceneHost + ?Sized> DerefMut for GizmoOnlyPicking<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: SceneHost + ?Sized> Drop for GizmoOnlyPicking<'_, H> {
    fn drop(&mut self) {
        let camera_root = self.host.camera_root();
        let scene_root = self.host.scene_root();
        let restored = self
            .host
            .remove_child(camera_root, self.gizmo_root)
            .and_then(|_| self.host.set_node_mask(scene_root, self.scene_mask))
            .and_then(|_| self.host.set_node_mask(self.gizmo_root, PickMask::NO_PICK));
        if let Err(e) = restored {
            tracing::warn!("Failed to restore scene picking: {}", e);
        }
    }
}
