//! Error types for gizmo operations.

use crate::scene::{NodeId, SceneError};

/// Errors that can occur while attaching or driving the gizmo.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GizmoError {
    #[error("Scene operation failed: {0}")]
    Scene(#[from] SceneError),

    #[error("Cannot insert an editable transform above {0}: node has no parent")]
    Orphan(NodeId),
}
