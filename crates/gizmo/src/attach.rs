//! Target discovery, transform insertion and mask propagation.

use glam::Mat4;

use crate::error::GizmoError;
use crate::mask::PickMask;
use crate::rig::GizmoRig;
use crate::scene::{NodeId, SceneError, SceneHost};
use crate::tags::NodeTags;

/// Node currently edited by the gizmo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBinding {
    pub node: NodeId,
    /// Editable capabilities of `node`.
    pub mask: PickMask,
    /// Last known world matrix of `node`, refreshed every frame.
    pub world: Mat4,
}

impl TargetBinding {
    pub fn new<H: SceneHost + ?Sized>(
        host: &H,
        tags: &NodeTags,
        node: NodeId,
    ) -> Result<Self, SceneError> {
        Ok(Self {
            node,
            mask: tags.editable(node),
            world: host.world_matrix(node)?,
        })
    }
}

fn is_editable(tags: &NodeTags, node: NodeId) -> bool {
    tags.editable(node).intersects(PickMask::PICK_GIZMO)
}

/// Nearest editable node of `path`, scanning from the leaf towards the root.
pub fn find_in_path(tags: &NodeTags, path: &[NodeId]) -> Option<NodeId> {
    path.iter().rev().copied().find(|&node| is_editable(tags, node))
}

/// Nearest editable node among `node` and its first-parent ancestors.
pub fn find_in_ancestors<H: SceneHost + ?Sized>(
    host: &H,
    tags: &NodeTags,
    node: NodeId,
) -> Result<Option<NodeId>, SceneError> {
    let mut current = node;
    let mut depth = 0;
    loop {
        if is_editable(tags, current) {
            return Ok(Some(current));
        }
        let parents = host.parents(current)?;
        match parents.first() {
            // Bounded walk on hosts that report cyclic parents
            Some(&parent) if depth < MAX_ANCESTOR_DEPTH => {
                current = parent;
                depth += 1;
            }
            _ => return Ok(None),
        }
    }
}

const MAX_ANCESTOR_DEPTH: usize = 4096;

/// Insert a new editable transform between `node` and every one of its parents.
///
/// The transform is tagged with [`PickMask::PICK_GIZMO`] and returned.
pub fn insert_editable_transform<H: SceneHost + ?Sized>(
    host: &mut H,
    tags: &mut NodeTags,
    node: NodeId,
) -> Result<NodeId, GizmoError> {
    let parents = host.parents(node)?;
    if parents.is_empty() {
        return Err(GizmoError::Orphan(node));
    }

    let inserted = host.create_transform(Mat4::IDENTITY);
    for parent in parents {
        host.add_child(parent, inserted)?;
        host.remove_child(parent, node)?;
    }
    host.add_child(inserted, node)?;
    tags.set_editable(inserted, PickMask::PICK_GIZMO);

    tracing::debug!("Inserted editable transform {} above {}", inserted, node);
    Ok(inserted)
}

/// Apply the bound target's capabilities to the gizmo groups.
///
/// With a target the gizmo root becomes drawable ([`PickMask::NO_PICK`]) and
/// each group is pickable only if the target allows that category. Without a
/// target the gizmo root is hidden.
pub fn propagate_mask<H: SceneHost + ?Sized>(
    host: &mut H,
    rig: &GizmoRig,
    target: Option<PickMask>,
) -> Result<(), SceneError> {
    let Some(mask) = target else {
        return host.set_node_mask(rig.root, PickMask::empty());
    };

    host.set_node_mask(rig.root, PickMask::NO_PICK)?;
    for group in rig.groups() {
        host.set_node_mask(group.node, group.kind.group_mask(mask))?;
    }
    Ok(())
}
