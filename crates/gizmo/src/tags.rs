//! Side table of gizmo metadata keyed by scene node.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::mask::{Axis, HandleKind, PickMask};
use crate::scene::NodeId;

/// Identity of one per-axis handle node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleTag {
    pub axis: Axis,
    pub kind: HandleKind,
}

/// Editable masks of target nodes and axis tags of the gizmo's own handles.
#[derive(Debug, Clone, Default)]
pub struct NodeTags {
    editable: HashMap<NodeId, PickMask>,
    handles: HashMap<NodeId, HandleTag>,
}

impl NodeTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `node` as editable with the handle categories in `mask`.
    pub fn set_editable(&mut self, node: NodeId, mask: PickMask) {
        self.editable.insert(node, mask);
    }

    pub fn clear_editable(&mut self, node: NodeId) -> Option<PickMask> {
        self.editable.remove(&node)
    }

    /// Editable mask of `node`; untagged nodes report an empty mask.
    pub fn editable(&self, node: NodeId) -> PickMask {
        self.editable.get(&node).copied().unwrap_or_else(PickMask::empty)
    }

    pub(crate) fn tag_handle(&mut self, node: NodeId, tag: HandleTag) {
        self.handles.insert(node, tag);
    }

    pub fn handle(&self, node: NodeId) -> Option<HandleTag> {
        self.handles.get(&node).copied()
    }
}
