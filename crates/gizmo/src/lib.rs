//! Node gizmo - interactive translate/rotate handles for scene nodes
//!
//! This crate provides the interaction engine behind the gizmo:
//! - [`mask`] - Pick mask bits, handle categories and axes
//! - [`scene`] - The [`SceneHost`] trait the engine drives, plus camera types
//! - [`scene_graph`] - A reference in-memory [`SceneHost`]
//! - [`rig`] - Construction of the gizmo subtree
//! - [`picking`] - Screen/world projection and gizmo-only picking
//! - [`intersector`] - Axis and plane constraint solving along a pick ray
//! - [`attach`] - Target discovery and mask propagation
//! - [`hover`] - Hovered handle tracking and highlight
//! - [`session`] - Rotate and translate drag sessions
//! - [`normalize`] - Constant screen size and eye-facing rings
//! - [`gizmo`] - [`NodeGizmo`], the event-driven facade

pub mod attach;
pub mod error;
pub mod gizmo;
pub mod hover;
pub mod intersector;
pub mod mask;
pub mod normalize;
pub mod picking;
pub mod rig;
pub mod scene;
pub mod scene_graph;
pub mod session;
pub mod shapes;
pub mod tags;

pub use attach::TargetBinding;
pub use error::GizmoError;
pub use gizmo::{InputGrab, NodeGizmo};
pub use hover::HoverState;
pub use intersector::{IntersectMode, LineIntersector};
pub use mask::{Axis, HandleKind, PickMask};
pub use rig::{GizmoRig, HandleGroup};
pub use scene::{CameraState, CanvasSize, Hit, LineVisitor, NodeId, SceneError, SceneHost, Viewport};
pub use scene_graph::SceneGraph;
pub use session::{DragConstraint, EditSession};
pub use shapes::HandleShape;
pub use tags::{HandleTag, NodeTags};

pub use nodegizmo_config::{DisplayConfig, GizmoConfig};
pub use nodegizmo_ipc::{
    EditMode, GizmoAxis, GizmoToHost, HostToGizmo, HoveredHandle, MouseButton, MouseEvent,
};
