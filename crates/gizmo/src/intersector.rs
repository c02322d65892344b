//! Line traversal that solves the drag constraint instead of hitting geometry.
//!
//! During a translate drag the mouse ray is intersected with the handle's
//! axis line (arrow) or with the plane orthogonal to that axis (plane quad).
//! Both are evaluated in the frame of the handle's parent group, where the
//! axis is a unit basis vector through the origin.

use glam::Vec3;

use crate::mask::Axis;
use crate::scene::{LineVisitor, NodeId};
use crate::tags::NodeTags;

/// Constraint solved by a [`LineIntersector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectMode {
    /// Closest point on the handle's axis line.
    Axis,
    /// Intersection with the plane whose normal is the handle's axis.
    Plane,
}

impl IntersectMode {
    /// Solve the constraint for the segment `start..end`.
    pub fn solve(self, axis: Axis, start: Vec3, end: Vec3, parallel_epsilon: f32) -> Option<Vec3> {
        match self {
            IntersectMode::Axis => axis_intersection(axis, start, end, parallel_epsilon),
            IntersectMode::Plane => plane_intersection(axis, start, end, parallel_epsilon),
        }
    }
}

/// Point on the `axis` line closest to the line through `start` and `end`.
///
/// Returns `None` when the two lines are parallel within `parallel_epsilon`.
pub fn axis_intersection(axis: Axis, start: Vec3, end: Vec3, parallel_epsilon: f32) -> Option<Vec3> {
    let a = axis.unit();
    let dir = (end - start).normalize_or_zero();

    let a01 = -dir.dot(a);
    let b0 = start.dot(dir);
    let b1 = -start.dot(a);
    let det = (1.0 - a01 * a01).abs();
    if det < parallel_epsilon {
        return None;
    }

    Some(a * ((a01 * b0 - b1) / det))
}

/// Intersection of the line through `start` and `end` with the plane through
/// the origin whose normal is `axis`.
///
/// Returns `None` when the line is parallel to the plane.
pub fn plane_intersection(axis: Axis, start: Vec3, end: Vec3, parallel_epsilon: f32) -> Option<Vec3> {
    let n = axis.unit();
    let dist1 = start.dot(n);
    let dist2 = end.dot(n);
    if (dist2 - dist1).abs() <= parallel_epsilon {
        return None;
    }

    let t = -dist1 / (dist2 - dist1);
    Some(start.lerp(end, t))
}

/// [`LineVisitor`] that stops at the first axis-tagged node and records the
/// constraint solution in that node's parent frame.
pub struct LineIntersector<'t> {
    mode: IntersectMode,
    tags: &'t NodeTags,
    parallel_epsilon: f32,
    result: Option<Vec3>,
}

impl<'t> LineIntersector<'t> {
    pub fn new(mode: IntersectMode, tags: &'t NodeTags, parallel_epsilon: f32) -> Self {
        Self {
            mode,
            tags,
            parallel_epsilon,
            result: None,
        }
    }

    /// Solution of the last axis-tagged node entered, if any.
    pub fn result(&self) -> Option<Vec3> {
        self.result
    }
}

impl LineVisitor for LineIntersector<'_> {
    fn enter(&mut self, node: NodeId, start: Vec3, end: Vec3) -> bool {
        let Some(tag) = self.tags.handle(node) else {
            return true;
        };
        self.result = self.mode.solve(tag.axis, start, end, self.parallel_epsilon);
        false
    }
}
