//! Handle rig construction.
//!
//! ```text
//! gizmo root
//!  ├─ translate group ── X/Y/Z handle ── draw arrow (shaft + cone)
//!  │                                  └─ hidden holder ── pick cylinder
//!  ├─ plane group ────── X/Y/Z handle ── quad transform ── quad
//!  └─ rotate group ───── eye ring ────── full torus
//!                     └─ X/Y/Z handle ── half torus
//!                                     └─ hidden holder ── thick half torus
//! ```
//!
//! Draw geometry is masked [`PickMask::NO_PICK`]; pick geometry carries its
//! category bit and is cull-hidden. Geometry nodes are shared by the three
//! handles of a group.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Mat4, Vec3, Vec4};

use crate::mask::{Axis, HandleKind, PickMask};
use crate::scene::{NodeId, SceneError, SceneHost};
use crate::shapes::HandleShape;
use crate::tags::{HandleTag, NodeTags};

const ARROW_HEIGHT: f32 = 1.5;
const ARROW_CONE_HEIGHT: f32 = 0.3;
const ARROW_CONE_RADIUS: f32 = 0.07;
const ARROW_SHAFT_RADIUS: f32 = 0.01;
/// Where the pick cylinder starts along the arrow, clear of the plane quads.
const ARROW_PICK_START: f32 = 0.5;
const ARROW_PICK_HEIGHT: f32 = (ARROW_HEIGHT - ARROW_PICK_START + ARROW_CONE_HEIGHT) * 1.1;
const ARROW_PICK_RADIUS: f32 = 0.1;

const RING_RADIUS: f32 = 1.0;
const RING_DRAW_TUBE: f32 = 0.01;
const RING_PICK_TUBE: f32 = 0.1;

const PLANE_ALPHA: f32 = 0.3;
const EYE_RING_COLOR: Vec4 = Vec4::new(0.2, 0.2, 0.2, 1.0);

/// Base colour of an axis handle.
pub fn axis_color(axis: Axis, kind: HandleKind) -> Vec4 {
    let alpha = match kind {
        HandleKind::Plane => PLANE_ALPHA,
        HandleKind::Arc | HandleKind::Arrow => 1.0,
    };
    axis.unit().extend(alpha)
}

/// Rest orientation of an arrow handle; the arrow geometry points along +Z.
fn arrow_orientation(axis: Axis) -> Mat4 {
    match axis {
        Axis::X => Mat4::from_rotation_y(FRAC_PI_2),
        Axis::Y => Mat4::from_rotation_x(-FRAC_PI_2),
        Axis::Z => Mat4::IDENTITY,
    }
}

/// Rest orientation of a plane handle; the quad lies in XY with normal +Z.
fn plane_orientation(axis: Axis) -> Mat4 {
    match axis {
        Axis::X => Mat4::from_rotation_y(-FRAC_PI_2),
        Axis::Y => Mat4::from_rotation_x(FRAC_PI_2),
        Axis::Z => Mat4::IDENTITY,
    }
}

/// One category of handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleGroup {
    pub node: NodeId,
    pub kind: HandleKind,
    /// Per-axis handle transforms, indexed by [`Axis::index`].
    pub handles: [NodeId; 3],
}

impl HandleGroup {
    pub fn handle(&self, axis: Axis) -> NodeId {
        self.handles[axis.index()]
    }
}

/// Node ids of the whole gizmo subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GizmoRig {
    pub root: NodeId,
    pub translate: HandleGroup,
    pub plane: HandleGroup,
    pub rotate: HandleGroup,
    /// Screen-facing full ring of the rotate group.
    pub eye_ring: NodeId,
}

impl GizmoRig {
    /// Build the gizmo subtree in `host` and tag every axis handle.
    ///
    /// The root is left detached and hidden (empty mask).
    pub fn build<H: SceneHost + ?Sized>(
        host: &mut H,
        tags: &mut NodeTags,
    ) -> Result<Self, SceneError> {
        let root = host.create_transform(Mat4::IDENTITY);
        let translate = build_translate(host, tags)?;
        let plane = build_plane(host, tags)?;
        let (rotate, eye_ring) = build_rotate(host, tags)?;

        host.add_child(root, translate.node)?;
        host.add_child(root, plane.node)?;
        host.add_child(root, rotate.node)?;
        host.set_node_mask(root, PickMask::empty())?;

        tracing::debug!("Built gizmo rig under {}", root);
        Ok(Self {
            root,
            translate,
            plane,
            rotate,
            eye_ring,
        })
    }

    pub fn group(&self, kind: HandleKind) -> &HandleGroup {
        match kind {
            HandleKind::Arc => &self.rotate,
            HandleKind::Arrow => &self.translate,
            HandleKind::Plane => &self.plane,
        }
    }

    pub fn groups(&self) -> [&HandleGroup; 3] {
        [&self.rotate, &self.translate, &self.plane]
    }
}

/// Create the group node and its three tagged, coloured axis handles.
fn build_group<H: SceneHost + ?Sized>(
    host: &mut H,
    tags: &mut NodeTags,
    kind: HandleKind,
    orientation: fn(Axis) -> Mat4,
) -> Result<HandleGroup, SceneError> {
    let node = host.create_transform(Mat4::IDENTITY);
    host.set_node_mask(node, kind.category_bit())?;

    let mut handles = [node; 3];
    for axis in Axis::ALL {
        let handle = host.create_transform(orientation(axis));
        host.set_node_mask(handle, axis.pick_bit())?;
        host.set_color(handle, axis_color(axis, kind))?;
        host.add_child(node, handle)?;
        tags.tag_handle(handle, HandleTag { axis, kind });
        handles[axis.index()] = handle;
    }

    Ok(HandleGroup {
        node,
        kind,
        handles,
    })
}

/// Transform node holding `shape`, cull-hidden so only picking sees it.
fn hidden_holder<H: SceneHost + ?Sized>(
    host: &mut H,
    matrix: Mat4,
    shape: HandleShape,
    mask: PickMask,
) -> Result<NodeId, SceneError> {
    let holder = host.create_transform(matrix);
    host.set_cull_hidden(holder, true)?;
    let geometry = host.create_geometry(shape);
    host.set_node_mask(geometry, mask)?;
    host.add_child(holder, geometry)?;
    Ok(holder)
}

fn build_translate<H: SceneHost + ?Sized>(
    host: &mut H,
    tags: &mut NodeTags,
) -> Result<HandleGroup, SceneError> {
    let group = build_group(host, tags, HandleKind::Arrow, arrow_orientation)?;

    let shaft = host.create_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, ARROW_HEIGHT * 0.5)));
    let shaft_geometry = host.create_geometry(HandleShape::Cylinder {
        radius: ARROW_SHAFT_RADIUS,
        height: ARROW_HEIGHT,
    });
    host.add_child(shaft, shaft_geometry)?;

    let cone = host.create_transform(Mat4::from_translation(Vec3::new(
        0.0,
        0.0,
        ARROW_HEIGHT + ARROW_CONE_HEIGHT * 0.5,
    )));
    let cone_geometry = host.create_geometry(HandleShape::Cone {
        radius: ARROW_CONE_RADIUS,
        height: ARROW_CONE_HEIGHT,
    });
    host.add_child(cone, cone_geometry)?;

    let draw = host.create_transform(Mat4::IDENTITY);
    host.set_node_mask(draw, PickMask::NO_PICK)?;
    host.add_child(draw, shaft)?;
    host.add_child(draw, cone)?;

    let pick = hidden_holder(
        host,
        Mat4::from_translation(Vec3::new(
            0.0,
            0.0,
            ARROW_PICK_START + ARROW_PICK_HEIGHT * 0.5,
        )),
        HandleShape::Cylinder {
            radius: ARROW_PICK_RADIUS,
            height: ARROW_PICK_HEIGHT,
        },
        PickMask::PICK_ARROW,
    )?;

    for handle in group.handles {
        host.add_child(handle, draw)?;
        host.add_child(handle, pick)?;
    }
    Ok(group)
}

fn build_plane<H: SceneHost + ?Sized>(
    host: &mut H,
    tags: &mut NodeTags,
) -> Result<HandleGroup, SceneError> {
    let group = build_group(host, tags, HandleKind::Plane, plane_orientation)?;

    // Unit quad moved into the positive quadrant of the handle frame
    let quad = host.create_transform(
        Mat4::from_translation(Vec3::new(0.5, 0.5, 0.0)) * Mat4::from_scale(Vec3::new(0.5, 0.5, 1.0)),
    );
    host.set_node_mask(quad, PickMask::PICK_PLANE)?;
    let geometry = host.create_geometry(HandleShape::Quad { half_extent: 1.0 });
    host.add_child(quad, geometry)?;

    for handle in group.handles {
        host.add_child(handle, quad)?;
    }
    Ok(group)
}

fn build_rotate<H: SceneHost + ?Sized>(
    host: &mut H,
    tags: &mut NodeTags,
) -> Result<(HandleGroup, NodeId), SceneError> {
    let group = build_group(host, tags, HandleKind::Arc, |_| Mat4::IDENTITY)?;

    let eye_ring = host.create_transform(Mat4::IDENTITY);
    host.set_color(eye_ring, EYE_RING_COLOR)?;
    let full_ring = host.create_geometry(HandleShape::Torus {
        radius: RING_RADIUS,
        tube: RING_DRAW_TUBE,
        arc: TAU,
    });
    host.set_node_mask(full_ring, PickMask::NO_PICK)?;
    host.add_child(eye_ring, full_ring)?;
    host.add_child(group.node, eye_ring)?;

    let half_ring = host.create_geometry(HandleShape::Torus {
        radius: RING_RADIUS,
        tube: RING_DRAW_TUBE,
        arc: PI,
    });
    host.set_node_mask(half_ring, PickMask::NO_PICK)?;

    let pick = hidden_holder(
        host,
        Mat4::IDENTITY,
        HandleShape::Torus {
            radius: RING_RADIUS,
            tube: RING_PICK_TUBE,
            arc: PI,
        },
        PickMask::PICK_ARC,
    )?;

    for handle in group.handles {
        host.add_child(handle, half_ring)?;
        host.add_child(handle, pick)?;
    }
    Ok((group, eye_ring))
}
