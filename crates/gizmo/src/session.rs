//! Drag sessions.
//!
//! A session is captured once on mouse-down from the hovered handle and the
//! bound target, and only read afterwards. Rotation is pure screen-space
//! math; the translate modes cast the constrained mouse position through a
//! [`LineIntersector`] against the gizmo alone.

use glam::{Mat4, Vec2, Vec3};
use nodegizmo_config::GizmoConfig;
use nodegizmo_ipc::EditMode;

use crate::attach::TargetBinding;
use crate::hover::HoverState;
use crate::intersector::{IntersectMode, LineIntersector};
use crate::mask::{Axis, HandleKind, PickMask};
use crate::picking::{canvas_to_surface, world_to_screen, GizmoOnlyPicking};
use crate::rig::GizmoRig;
use crate::scene::{NodeId, SceneError, SceneHost};
use crate::tags::NodeTags;

/// Edit mode driven by a handle category.
pub fn edit_mode(kind: HandleKind) -> EditMode {
    match kind {
        HandleKind::Arc => EditMode::Rotate,
        HandleKind::Arrow => EditMode::TranslateAxis,
        HandleKind::Plane => EditMode::TranslatePlane,
    }
}

/// Screen-space reference captured at drag start, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragConstraint {
    /// Signed distance along `direction` from the grab point drives the angle.
    Rotate { origin: Vec2, direction: Vec2 },
    /// Mouse is projected on the screen image of the axis through `origin`.
    Axis {
        origin: Vec2,
        direction: Vec2,
        offset: Vec2,
    },
    /// Mouse minus the grab offset is cast onto the handle plane.
    Plane { offset: Vec2 },
    /// No reference could be found; moves are ignored until release.
    Inert,
}

/// State of one drag, from mouse-down to mouse-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditSession {
    pub mode: EditMode,
    pub axis: Axis,
    pub handle: NodeId,
    /// Target's local matrix at drag start.
    pub saved_local: Mat4,
    /// Translation-only matrix of the target's world position at drag start.
    pub saved_world_translation: Mat4,
    /// Inverse of the target's world rotation and scale at drag start.
    pub saved_inverse_world_rotation_scale: Mat4,
    pub constraint: DragConstraint,
}

/// Tangent of the ring at local point `point`, oriented so that a positive
/// drag along its screen image rotates positively around `axis`.
pub fn ring_tangent(axis: Axis, point: Vec3) -> Vec3 {
    let sign = if axis == Axis::X { -1.0 } else { 1.0 };
    Vec3::new(sign * point.y, -sign * point.x, point.z)
}

/// Rotation angle for a mouse at `mouse` given the drag reference.
pub fn rotation_angle(
    origin: Vec2,
    direction: Vec2,
    mouse: Vec2,
    sensitivity: f32,
    min_client_dimension: f32,
) -> f32 {
    let dist = (mouse - origin).dot(direction);
    sensitivity * dist / min_client_dimension
}

/// Project `mouse` (minus `offset`) onto the screen line through `origin`.
pub fn constrain_to_line(origin: Vec2, direction: Vec2, offset: Vec2, mouse: Vec2) -> Vec2 {
    let dist = (mouse - origin - offset).dot(direction);
    origin + direction * dist
}

impl EditSession {
    /// Capture a session for the hovered handle.
    ///
    /// The groups other than the hovered one are masked out for the whole
    /// drag.
    pub fn start<H: SceneHost + ?Sized>(
        host: &mut H,
        rig: &GizmoRig,
        target: &TargetBinding,
        hover: &HoverState,
        mouse: Vec2,
    ) -> Result<Self, SceneError> {
        let kind = hover.tag.kind;
        for group in rig.groups() {
            if group.kind != kind {
                host.set_node_mask(group.node, PickMask::empty())?;
            }
        }

        let world = host.world_matrix(target.node)?;
        let mut rotation_scale = world;
        rotation_scale.w_axis = Vec3::ZERO.extend(1.0);

        let constraint = match kind {
            HandleKind::Arc => start_rotate(host, rig, hover, mouse)?,
            HandleKind::Arrow => start_translate(host, rig, hover.tag.axis, mouse)?,
            HandleKind::Plane => start_plane(host, rig, mouse)?,
        };

        let session = Self {
            mode: edit_mode(kind),
            axis: hover.tag.axis,
            handle: hover.handle,
            saved_local: host.matrix(target.node)?,
            saved_world_translation: Mat4::from_translation(world.w_axis.truncate()),
            saved_inverse_world_rotation_scale: rotation_scale.inverse(),
            constraint,
        };
        tracing::info!(
            "Started {:?} edit on {:?} axis of {}",
            session.mode,
            session.axis,
            target.node
        );
        Ok(session)
    }

    /// New local matrix of the target for the mouse at `mouse`.
    ///
    /// Returns `None` when the move produces no transform (inert session, or
    /// the constraint has no solution).
    pub fn solve<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        rig: &GizmoRig,
        tags: &NodeTags,
        config: &GizmoConfig,
        mouse: Vec2,
    ) -> Result<Option<Mat4>, SceneError> {
        match self.constraint {
            DragConstraint::Rotate { origin, direction } => {
                let angle = rotation_angle(
                    origin,
                    direction,
                    mouse,
                    config.rotate_sensitivity,
                    host.canvas().min_client_dimension(),
                );
                tracing::trace!("Rotate angle {:.4}", angle);
                Ok(Some(
                    self.saved_local * Mat4::from_axis_angle(self.axis.unit(), angle),
                ))
            }
            DragConstraint::Axis {
                origin,
                direction,
                offset,
            } => {
                let point = constrain_to_line(origin, direction, offset, mouse);
                let mask = self.axis.pick_bit() | PickMask::PICK_ARROW;
                self.cast(host, rig, tags, config, IntersectMode::Axis, point, mask)
            }
            DragConstraint::Plane { offset } => {
                let mask = self.axis.pick_bit() | PickMask::PICK_PLANE;
                self.cast(host, rig, tags, config, IntersectMode::Plane, mouse - offset, mask)
            }
            DragConstraint::Inert => Ok(None),
        }
    }

    /// Solve the move and write the result into the target.
    pub fn update<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        rig: &GizmoRig,
        tags: &NodeTags,
        config: &GizmoConfig,
        target: NodeId,
        mouse: Vec2,
    ) -> Result<Option<Mat4>, SceneError> {
        let Some(local) = self.solve(host, rig, tags, config, mouse)? else {
            return Ok(None);
        };
        host.set_matrix(target, local)?;
        host.dirty_bound(target)?;
        Ok(Some(local))
    }

    /// Cast the canvas point through the gizmo and turn the constraint
    /// solution into a translated local matrix.
    #[allow(clippy::too_many_arguments)]
    fn cast<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        rig: &GizmoRig,
        tags: &NodeTags,
        config: &GizmoConfig,
        mode: IntersectMode,
        canvas_point: Vec2,
        mask: PickMask,
    ) -> Result<Option<Mat4>, SceneError> {
        let surface = canvas_to_surface(&host.canvas(), canvas_point);
        host.set_matrix(rig.root, self.saved_world_translation)?;

        let mut intersector = LineIntersector::new(mode, tags, config.parallel_epsilon);
        {
            let isolated = GizmoOnlyPicking::new(host, rig.root)?;
            isolated.visit_line(
                surface.extend(0.0),
                surface.extend(1.0),
                mask,
                &mut intersector,
            );
        }

        let Some(world_delta) = intersector.result() else {
            tracing::trace!("No {:?} intersection at {}", mode, canvas_point);
            return Ok(None);
        };
        let local_delta = self
            .saved_inverse_world_rotation_scale
            .transform_vector3(world_delta);
        tracing::trace!("Translate by {}", local_delta);
        Ok(Some(self.saved_local * Mat4::from_translation(local_delta)))
    }
}

fn start_rotate<H: SceneHost + ?Sized>(
    host: &mut H,
    rig: &GizmoRig,
    hover: &HoverState,
    mouse: Vec2,
) -> Result<DragConstraint, SceneError> {
    let camera = host.camera();
    let canvas = host.canvas();
    let gizmo = host.world_matrix(rig.rotate.node)?;
    let handle = host.matrix(hover.handle)?;
    let mask = host.node_mask(hover.handle)? | PickMask::PICK_ARC;

    let center = world_to_screen(&camera, &canvas, gizmo.transform_point3(Vec3::ZERO));

    let hit = GizmoOnlyPicking::new(host, rig.root)?.pick(mouse, mask);
    let Some(hit) = hit else {
        tracing::debug!("Rotate start found no ring under the cursor");
        return Ok(DragConstraint::Inert);
    };

    let tangent = ring_tangent(hover.tag.axis, hit.point);
    let arc = world_to_screen(
        &camera,
        &canvas,
        gizmo.transform_point3(handle.transform_point3(tangent)),
    );

    Ok(DragConstraint::Rotate {
        origin: mouse,
        direction: (arc - center).normalize_or_zero(),
    })
}

fn start_translate<H: SceneHost + ?Sized>(
    host: &mut H,
    rig: &GizmoRig,
    axis: Axis,
    mouse: Vec2,
) -> Result<DragConstraint, SceneError> {
    let camera = host.camera();
    let canvas = host.canvas();
    let center = host.world_matrix(rig.translate.node)?.w_axis.truncate();

    let origin = world_to_screen(&camera, &canvas, center);
    let tip = world_to_screen(&camera, &canvas, center + axis.unit());

    Ok(DragConstraint::Axis {
        origin,
        direction: (tip - origin).normalize_or_zero(),
        offset: mouse - origin,
    })
}

fn start_plane<H: SceneHost + ?Sized>(
    host: &mut H,
    rig: &GizmoRig,
    mouse: Vec2,
) -> Result<DragConstraint, SceneError> {
    let center = host.world_matrix(rig.plane.node)?.w_axis.truncate();
    let origin = world_to_screen(&host.camera(), &host.canvas(), center);
    Ok(DragConstraint::Plane {
        offset: mouse - origin,
    })
}
