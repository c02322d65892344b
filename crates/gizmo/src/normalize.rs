//! Per-frame size and orientation normalization.
//!
//! Keeps the gizmo at a constant apparent size on screen, aligned with the
//! target's world rotation, with every ring turned so its visible half faces
//! the eye.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Quat, Vec3};

use crate::mask::Axis;
use crate::rig::GizmoRig;
use crate::scene::{SceneError, SceneHost};

const DEGENERATE_EPSILON: f32 = 1e-6;

/// Uniform gizmo scale for a target at `translation`.
pub fn gizmo_scale(eye: Vec3, translation: Vec3, projection_scale: f32, divisor: f32) -> f32 {
    eye.distance(translation) / (divisor * projection_scale)
}

/// Column lengths of the upper 3×3 of `matrix`.
fn axis_scale(matrix: &Mat4) -> Vec3 {
    Vec3::new(
        matrix.x_axis.truncate().length(),
        matrix.y_axis.truncate().length(),
        matrix.z_axis.truncate().length(),
    )
}

/// Rotation of the full eye-facing ring for eye direction `eye`.
pub fn eye_ring_rotation(eye: Vec3) -> Quat {
    let q = Quat::from_xyzw(-eye.y, eye.x, 0.0, 1.0 + eye.z);
    if q.length_squared() < DEGENERATE_EPSILON {
        // Looking straight down -Z: half turn around any axis in the XY plane
        return Quat::from_rotation_x(PI);
    }
    q.normalize()
}

/// Rotation of the half ring around `axis` for eye direction `eye`.
pub fn axis_ring_rotation(axis: Axis, eye: Vec3) -> Quat {
    match axis {
        Axis::X => Quat::from_rotation_x(eye.z.atan2(eye.y)) * Quat::from_rotation_y(-FRAC_PI_2),
        Axis::Y => {
            Quat::from_rotation_y((-eye.x).atan2(-eye.z)) * Quat::from_rotation_x(-FRAC_PI_2)
        }
        Axis::Z => Quat::from_rotation_z((-eye.x).atan2(eye.y)),
    }
}

/// Place, scale and orient the gizmo for a target whose world matrix is `world`.
pub fn normalize_gizmo<H: SceneHost + ?Sized>(
    host: &mut H,
    rig: &GizmoRig,
    world: Mat4,
    screen_size_divisor: f32,
) -> Result<(), SceneError> {
    let camera = host.camera();
    let translation = world.w_axis.truncate();

    let k = gizmo_scale(
        camera.eye,
        translation,
        camera.projection_scale(),
        screen_size_divisor,
    );
    host.set_matrix(
        rig.root,
        Mat4::from_translation(translation) * Mat4::from_scale(Vec3::splat(k)),
    )?;

    // World rotation only
    let mut rotation = world * Mat4::from_scale(axis_scale(&world).recip());
    rotation.w_axis = Vec3::ZERO.extend(1.0);
    host.set_matrix(rig.rotate.node, rotation)?;

    let eye = rotation
        .inverse()
        .transform_vector3((camera.eye - translation).normalize_or_zero());

    host.set_matrix(rig.eye_ring, Mat4::from_quat(eye_ring_rotation(eye)))?;
    for axis in Axis::ALL {
        let handle = rig.rotate.handle(axis);
        host.set_matrix(handle, Mat4::from_quat(axis_ring_rotation(axis, eye)))?;
        host.dirty_bound(handle)?;
    }

    for group in rig.groups() {
        host.dirty_bound(group.node)?;
    }
    tracing::trace!("Gizmo at {} scaled by {:.4}", translation, k);
    Ok(())
}
