//! Message enums exchanged between the host application and the gizmo.

use serde::{Deserialize, Serialize};

use crate::input::MouseEvent;

/// Messages from the host to the gizmo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum HostToGizmo {
    /// Canvas mouse input
    Mouse(MouseEvent),

    /// Attach to a node (`None` detaches)
    AttachNode { node: Option<u64> },

    /// Attach to the nearest editable node of a picked node path
    AttachPath { path: Vec<u64> },

    /// Mark a node editable with the given capability mask bits
    SetEditable { node: u64, mask: u32 },

    /// Insert a transform above picked nodes that have no editable ancestor
    SetAutoInsert { enabled: bool },

    /// Run the per-frame update
    Frame,
}

/// Notifications from the gizmo to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GizmoToHost {
    /// Gizmo bound to a node
    Attached { node: u64, mask: u32 },

    /// Gizmo no longer bound to any node
    Detached,

    /// Hovered handle changed (`None` when nothing is hovered)
    HoverChanged { handle: Option<HoveredHandle> },

    /// A drag started on a handle
    EditStarted {
        node: u64,
        mode: EditMode,
        axis: GizmoAxis,
    },

    /// The bound node's local matrix changed (column-major)
    TransformChanged { node: u64, matrix: [f32; 16] },

    /// The drag ended
    EditFinished { node: u64 },
}

/// Handle under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoveredHandle {
    pub axis: GizmoAxis,
    pub mode: EditMode,
}

/// Kind of edit a handle performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditMode {
    /// Rotation around one axis (rings)
    Rotate,
    /// Translation along one axis (arrows)
    TranslateAxis,
    /// Translation in the plane orthogonal to one axis (quads)
    TranslatePlane,
}

/// Axis of a gizmo handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}
