//! Pick masks, handle categories and axis identity.
//!
//! A single [`PickMask`] says both *which kind* of handle a node belongs to
//! (arc, arrow, plane) and *which axis* it edits. Scene traversals only enter
//! nodes whose mask intersects the traversal mask, so the same bits drive
//! visibility, picking and the editable capabilities of a target node.

use bitflags::bitflags;
use glam::Vec3;
use nodegizmo_ipc::GizmoAxis;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Node / traversal mask bits.
    ///
    /// The bit layout is public and stable: host code that marks scene nodes
    /// editable stores these values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PickMask: u32 {
        /// Drawn but never picked by gizmo queries.
        const NO_PICK = 1 << 0;
        /// Rotation rings.
        const PICK_ARC = 1 << 1;
        /// Axis translation arrows.
        const PICK_ARROW = 1 << 2;
        /// Plane translation quads.
        const PICK_PLANE = 1 << 3;
        /// X axis handle.
        const PICK_X = 1 << 4;
        /// Y axis handle.
        const PICK_Y = 1 << 5;
        /// Z axis handle.
        const PICK_Z = 1 << 6;

        const PICK_XYZ = Self::PICK_X.bits() | Self::PICK_Y.bits() | Self::PICK_Z.bits();
        const PICK_GIZMO = Self::PICK_ARC.bits() | Self::PICK_ARROW.bits() | Self::PICK_PLANE.bits();
    }
}

impl PickMask {
    /// Mask of a node that every traversal enters.
    pub const EVERYTHING: Self = Self::from_bits_retain(u32::MAX);

    /// The category bits of this mask.
    pub fn categories(self) -> Self {
        self & Self::PICK_GIZMO
    }

    /// The axis bits of this mask.
    pub fn axes(self) -> Self {
        self & Self::PICK_XYZ
    }

    /// The single axis named by this mask, if exactly one axis bit is set.
    pub fn axis(self) -> Option<Axis> {
        let axes = self.axes();
        Axis::ALL.into_iter().find(|axis| axes == axis.pick_bit())
    }

    /// Whether a traversal with `traversal` enters a node carrying `self`.
    pub fn passes(self, traversal: PickMask) -> bool {
        self.intersects(traversal)
    }
}

/// Handle axis, with the index used throughout the math (x=0, y=1, z=2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Axis> {
        Axis::ALL.get(index).copied()
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn pick_bit(self) -> PickMask {
        match self {
            Axis::X => PickMask::PICK_X,
            Axis::Y => PickMask::PICK_Y,
            Axis::Z => PickMask::PICK_Z,
        }
    }
}

impl From<Axis> for GizmoAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => GizmoAxis::X,
            Axis::Y => GizmoAxis::Y,
            Axis::Z => GizmoAxis::Z,
        }
    }
}

/// Handle category. Each category owns one handle group on the gizmo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Rotation ring.
    Arc,
    /// Axis translation arrow.
    Arrow,
    /// Plane translation quad.
    Plane,
}

impl HandleKind {
    pub const ALL: [HandleKind; 3] = [HandleKind::Arc, HandleKind::Arrow, HandleKind::Plane];

    pub fn category_bit(self) -> PickMask {
        match self {
            HandleKind::Arc => PickMask::PICK_ARC,
            HandleKind::Arrow => PickMask::PICK_ARROW,
            HandleKind::Plane => PickMask::PICK_PLANE,
        }
    }

    /// First category present in `mask`, checked in arc, arrow, plane order.
    pub fn from_mask(mask: PickMask) -> Option<HandleKind> {
        HandleKind::ALL
            .into_iter()
            .find(|kind| mask.contains(kind.category_bit()))
    }

    /// Pickability of this category's group for a target with `editable` mask.
    ///
    /// Axis bits of `editable` never influence the result.
    pub fn group_mask(self, editable: PickMask) -> PickMask {
        editable & self.category_bit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_layout_is_stable() {
        assert_eq!(PickMask::NO_PICK.bits(), 1);
        assert_eq!(PickMask::PICK_ARC.bits(), 2);
        assert_eq!(PickMask::PICK_ARROW.bits(), 4);
        assert_eq!(PickMask::PICK_PLANE.bits(), 8);
        assert_eq!(PickMask::PICK_X.bits(), 16);
        assert_eq!(PickMask::PICK_Y.bits(), 32);
        assert_eq!(PickMask::PICK_Z.bits(), 64);
        assert_eq!(PickMask::PICK_XYZ.bits(), 0b111_0000);
        assert_eq!(PickMask::PICK_GIZMO.bits(), 0b1110);
    }

    #[test]
    fn test_axis_requires_exactly_one_bit() {
        assert_eq!(PickMask::PICK_Y.axis(), Some(Axis::Y));
        assert_eq!((PickMask::PICK_Z | PickMask::PICK_ARROW).axis(), Some(Axis::Z));
        assert_eq!((PickMask::PICK_X | PickMask::PICK_Y).axis(), None);
        assert_eq!(PickMask::PICK_ARC.axis(), None);
    }

    #[test]
    fn test_group_mask_ignores_axis_bits() {
        // Every combination of the seven defined bits
        for bits in 0u32..(1 << 7) {
            let editable = PickMask::from_bits_retain(bits);
            for kind in HandleKind::ALL {
                let expected = PickMask::from_bits_retain(bits & kind.category_bit().bits());
                assert_eq!(kind.group_mask(editable), expected);
                assert_eq!(kind.group_mask(editable | PickMask::PICK_XYZ), expected);
            }
        }
    }

    #[test]
    fn test_everything_passes_any_traversal() {
        assert!(PickMask::EVERYTHING.passes(PickMask::NO_PICK));
        assert!(PickMask::EVERYTHING.passes(PickMask::PICK_Z));
        assert!(!PickMask::empty().passes(PickMask::EVERYTHING));
        assert!(!PickMask::NO_PICK.passes(PickMask::PICK_XYZ | PickMask::PICK_GIZMO));
    }

    #[test]
    fn test_axis_index_round_trip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
            assert_eq!(axis.unit()[axis.index()], 1.0);
        }
        assert_eq!(Axis::from_index(3), None);
    }

    #[test]
    fn test_kind_from_mask() {
        assert_eq!(HandleKind::from_mask(PickMask::PICK_ARC), Some(HandleKind::Arc));
        assert_eq!(
            HandleKind::from_mask(PickMask::PICK_PLANE | PickMask::PICK_X),
            Some(HandleKind::Plane)
        );
        assert_eq!(HandleKind::from_mask(PickMask::PICK_XYZ), None);
    }
}
