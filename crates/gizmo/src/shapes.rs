//! Analytic handle shapes and their segment intersections.
//!
//! Mesh generation for the handles belongs to the host renderer; the gizmo
//! only describes each drawable or pickable part as a [`HandleShape`]. The
//! intersection tests here let a host (and the reference [`SceneGraph`])
//! pick those parts without building meshes.
//!
//! All tests take a segment `origin + dir * t` with `dir` not necessarily
//! normalized, and return the smallest `t` in `(0, 1]`.
//!
//! [`SceneGraph`]: crate::scene_graph::SceneGraph

use glam::{Quat, Vec3};

const EPSILON: f32 = 1e-6;

/// Number of capsule segments used to approximate a full torus turn.
const TORUS_SEGMENTS: u32 = 64;

/// Shape of a geometry node, in its own local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandleShape {
    /// Torus in the XY plane around +Z, swept from angle 0 to `arc`.
    Torus { radius: f32, tube: f32, arc: f32 },
    /// Open cylinder along Z, centered on the origin.
    Cylinder { radius: f32, height: f32 },
    /// Cone along Z centered on the origin, apex at `+height/2`.
    Cone { radius: f32, height: f32 },
    /// Square in the XY plane covering `[-half_extent, half_extent]²`.
    Quad { half_extent: f32 },
    Sphere { radius: f32 },
}

impl HandleShape {
    /// Smallest segment parameter at which the segment hits this shape.
    pub fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let t = match *self {
            HandleShape::Torus { radius, tube, arc } => {
                segment_torus_intersection(origin, dir, radius, tube, arc)
            }
            HandleShape::Cylinder { radius, height } => {
                segment_z_tube_intersection(origin, dir, radius, -height * 0.5, height * 0.5)
            }
            HandleShape::Cone { radius, height } => {
                segment_z_cone_intersection(origin, dir, radius, height)
            }
            HandleShape::Quad { half_extent } => segment_quad_intersection(origin, dir, half_extent),
            HandleShape::Sphere { radius } => segment_sphere_intersection(origin, dir, Vec3::ZERO, radius),
        }?;
        (t <= 1.0).then_some(t)
    }
}

/// Nearest root of `a t² + b t + c` beyond [`EPSILON`] accepted by `accept`.
fn nearest_root(a: f32, b: f32, c: f32, accept: impl Fn(f32) -> bool) -> Option<f32> {
    if a.abs() < EPSILON {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);
    [t1.min(t2), t1.max(t2)]
        .into_iter()
        .find(|&t| t > EPSILON && accept(t))
}

pub fn segment_sphere_intersection(
    origin: Vec3,
    dir: Vec3,
    center: Vec3,
    radius: f32,
) -> Option<f32> {
    let oc = origin - center;
    nearest_root(
        dir.length_squared(),
        2.0 * oc.dot(dir),
        oc.length_squared() - radius * radius,
        |_| true,
    )
}

/// Side wall of a tube around the Z axis between `z_min` and `z_max`.
fn segment_z_tube_intersection(
    origin: Vec3,
    dir: Vec3,
    radius: f32,
    z_min: f32,
    z_max: f32,
) -> Option<f32> {
    let o = origin.truncate();
    let d = dir.truncate();
    nearest_root(
        d.length_squared(),
        2.0 * o.dot(d),
        o.length_squared() - radius * radius,
        |t| (z_min..=z_max).contains(&(origin.z + dir.z * t)),
    )
}

/// Cone around the Z axis, apex at `+height/2`, base of `radius` at `-height/2`.
fn segment_z_cone_intersection(origin: Vec3, dir: Vec3, radius: f32, height: f32) -> Option<f32> {
    let apex = Vec3::new(0.0, 0.0, height * 0.5);
    let o = origin - apex;
    // Squared cosine of the half-angle
    let cos_sq = height * height / (height * height + radius * radius);

    nearest_root(
        dir.z * dir.z - cos_sq * dir.length_squared(),
        2.0 * (dir.z * o.z - cos_sq * o.dot(dir)),
        o.z * o.z - cos_sq * o.length_squared(),
        |t| (-height..=0.0).contains(&(o.z + dir.z * t)),
    )
}

/// Capsule from `from` to `to`, tested in a frame where its axis is +Z.
fn segment_capsule_intersection(
    origin: Vec3,
    dir: Vec3,
    from: Vec3,
    to: Vec3,
    radius: f32,
) -> Option<f32> {
    let axis = to - from;
    let length = axis.length();
    if length < EPSILON {
        return segment_sphere_intersection(origin, dir, from, radius);
    }

    let to_local = Quat::from_rotation_arc(axis / length, Vec3::Z);
    let tube = segment_z_tube_intersection(
        to_local * (origin - from),
        to_local * dir,
        radius,
        0.0,
        length,
    );
    [
        tube,
        segment_sphere_intersection(origin, dir, from, radius),
        segment_sphere_intersection(origin, dir, to, radius),
    ]
    .into_iter()
    .flatten()
    .min_by(f32::total_cmp)
}

/// Torus swept over `[0, arc]`, approximated with capsule segments.
fn segment_torus_intersection(
    origin: Vec3,
    dir: Vec3,
    major_radius: f32,
    minor_radius: f32,
    arc: f32,
) -> Option<f32> {
    let turns = (arc / std::f32::consts::TAU).clamp(0.0, 1.0);
    let segments = ((TORUS_SEGMENTS as f32 * turns).ceil() as u32).max(1);
    let ring_point = |i: u32| {
        let angle = arc * i as f32 / segments as f32;
        Vec3::new(angle.cos(), angle.sin(), 0.0) * major_radius
    };

    (0..segments)
        .filter_map(|i| {
            segment_capsule_intersection(origin, dir, ring_point(i), ring_point(i + 1), minor_radius)
        })
        .min_by(f32::total_cmp)
}

/// Square in the XY plane.
fn segment_quad_intersection(origin: Vec3, dir: Vec3, half_extent: f32) -> Option<f32> {
    if dir.z.abs() < EPSILON {
        return None;
    }
    let t = -origin.z / dir.z;
    if t <= EPSILON {
        return None;
    }
    let p = origin + dir * t;
    (p.x.abs() <= half_extent && p.y.abs() <= half_extent).then_some(t)
}
