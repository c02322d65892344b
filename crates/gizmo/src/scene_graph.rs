//! In-memory reference host.
//!
//! A minimal retained scene graph implementing [`SceneHost`] so the gizmo can
//! be driven without a renderer: transform and geometry nodes, multi-parent
//! DAG edges, per-node masks and colours, and analytic picking through
//! [`HandleShape`]. Nothing is drawn.

use std::collections::{HashMap, HashSet};

use glam::{Mat4, Vec3, Vec4};

use crate::mask::PickMask;
use crate::scene::{
    CameraState, CanvasSize, Hit, LineVisitor, NodeId, SceneError, SceneHost,
};
use crate::shapes::HandleShape;

#[derive(Debug, Clone)]
enum NodeKind {
    Transform(Mat4),
    Geometry(HandleShape),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parents: Vec<NodeId>,
    children: Vec<NodeId>,
    mask: PickMask,
    color: Option<Vec4>,
    hidden: bool,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parents: Vec::new(),
            children: Vec::new(),
            mask: PickMask::EVERYTHING,
            color: None,
            hidden: false,
        }
    }

    fn local_matrix(&self) -> Mat4 {
        match self.kind {
            NodeKind::Transform(matrix) => matrix,
            NodeKind::Geometry(_) => Mat4::IDENTITY,
        }
    }
}

/// Reference scene graph with a camera root above the scene root.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, NodeData>,
    next_id: u64,
    camera_root: NodeId,
    scene_root: NodeId,
    camera: CameraState,
    canvas: CanvasSize,
    dirty: HashSet<NodeId>,
}

impl SceneGraph {
    /// Create a graph whose camera root already holds an empty scene root.
    pub fn new(camera: CameraState, canvas: CanvasSize) -> Self {
        let mut graph = Self {
            nodes: HashMap::new(),
            next_id: 0,
            camera_root: NodeId(0),
            scene_root: NodeId(0),
            camera,
            canvas,
            dirty: HashSet::new(),
        };
        graph.camera_root = graph.insert(NodeKind::Transform(Mat4::IDENTITY));
        graph.scene_root = graph.insert(NodeKind::Transform(Mat4::IDENTITY));
        graph.link(graph.camera_root, graph.scene_root);
        graph
    }

    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = camera;
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        Ok(self.get(node)?.children.clone())
    }

    pub fn is_cull_hidden(&self, node: NodeId) -> Result<bool, SceneError> {
        Ok(self.get(node)?.hidden)
    }

    /// Whether `node` was marked with [`SceneHost::dirty_bound`] since the
    /// last [`SceneGraph::clear_dirty`].
    pub fn is_bound_dirty(&self, node: NodeId) -> bool {
        self.dirty.contains(&node)
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, NodeData::new(kind));
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(data) = self.nodes.get_mut(&parent) {
            data.children.push(child);
        }
        if let Some(data) = self.nodes.get_mut(&child) {
            data.parents.push(parent);
        }
    }

    fn get(&self, node: NodeId) -> Result<&NodeData, SceneError> {
        self.nodes.get(&node).ok_or(SceneError::UnknownNode(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut NodeData, SceneError> {
        self.nodes.get_mut(&node).ok_or(SceneError::UnknownNode(node))
    }

    /// Whether `ancestor` is reachable from `node` by walking parent edges.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut stack = vec![node];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(data) = self.nodes.get(&current) {
                stack.extend(data.parents.iter().copied());
            }
        }
        false
    }

    /// Window-space point to world space.
    fn unproject(&self, window: Vec3) -> Vec3 {
        self.camera
            .view_projection_window()
            .inverse()
            .project_point3(window)
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_hits(
        &self,
        node: NodeId,
        parent_world: Mat4,
        start: Vec3,
        end: Vec3,
        mask: PickMask,
        path: &mut Vec<NodeId>,
        hits: &mut Vec<Hit>,
    ) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        if !data.mask.passes(mask) {
            return;
        }

        path.push(node);
        let world = parent_world * data.local_matrix();
        match data.kind {
            NodeKind::Geometry(shape) => {
                let to_local = world.inverse();
                let origin = to_local.transform_point3(start);
                let dir = to_local.transform_point3(end) - origin;
                if let Some(ratio) = shape.intersect(origin, dir) {
                    hits.push(Hit {
                        point: origin + dir * ratio,
                        ratio,
                        node_path: path.clone(),
                    });
                }
            }
            NodeKind::Transform(_) => {
                for &child in &data.children {
                    self.collect_hits(child, world, start, end, mask, path, hits);
                }
            }
        }
        path.pop();
    }

    fn visit(
        &self,
        node: NodeId,
        start: Vec3,
        end: Vec3,
        mask: PickMask,
        visitor: &mut dyn LineVisitor,
    ) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        if !data.mask.passes(mask) {
            return;
        }
        if !visitor.enter(node, start, end) {
            return;
        }

        let to_local = data.local_matrix().inverse();
        let local_start = to_local.transform_point3(start);
        let local_end = to_local.transform_point3(end);
        for &child in &data.children {
            self.visit(child, local_start, local_end, mask, visitor);
        }
    }
}

impl SceneHost for SceneGraph {
    fn create_transform(&mut self, matrix: Mat4) -> NodeId {
        self.insert(NodeKind::Transform(matrix))
    }

    fn create_geometry(&mut self, shape: HandleShape) -> NodeId {
        self.insert(NodeKind::Geometry(shape))
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.get(child)?;
        if matches!(self.get(parent)?.kind, NodeKind::Geometry(_)) {
            return Err(SceneError::NotATransform(parent));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }
        if self.get(parent)?.children.contains(&child) {
            return Ok(());
        }
        self.link(parent, child);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.get(child)?;
        self.get_mut(parent)?.children.retain(|&c| c != child);
        self.get_mut(child)?.parents.retain(|&p| p != parent);
        Ok(())
    }

    fn parents(&self, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        Ok(self.get(node)?.parents.clone())
    }

    fn matrix(&self, node: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.get(node)?.local_matrix())
    }

    fn set_matrix(&mut self, node: NodeId, matrix: Mat4) -> Result<(), SceneError> {
        match &mut self.get_mut(node)?.kind {
            NodeKind::Transform(current) => {
                *current = matrix;
                Ok(())
            }
            NodeKind::Geometry(_) => Err(SceneError::NotATransform(node)),
        }
    }

    fn world_matrix(&self, node: NodeId) -> Result<Mat4, SceneError> {
        let mut data = self.get(node)?;
        let mut world = data.local_matrix();
        let mut seen = HashSet::from([node]);
        while let Some(&parent) = data.parents.first() {
            if !seen.insert(parent) {
                break;
            }
            data = self.get(parent)?;
            world = data.local_matrix() * world;
        }
        Ok(world)
    }

    fn node_mask(&self, node: NodeId) -> Result<PickMask, SceneError> {
        Ok(self.get(node)?.mask)
    }

    fn set_node_mask(&mut self, node: NodeId, mask: PickMask) -> Result<(), SceneError> {
        self.get_mut(node)?.mask = mask;
        Ok(())
    }

    fn color(&self, node: NodeId) -> Result<Option<Vec4>, SceneError> {
        Ok(self.get(node)?.color)
    }

    fn set_color(&mut self, node: NodeId, color: Vec4) -> Result<(), SceneError> {
        self.get_mut(node)?.color = Some(color);
        Ok(())
    }

    fn set_cull_hidden(&mut self, node: NodeId, hidden: bool) -> Result<(), SceneError> {
        self.get_mut(node)?.hidden = hidden;
        Ok(())
    }

    fn dirty_bound(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.get(node)?;
        self.dirty.insert(node);
        Ok(())
    }

    fn scene_root(&self) -> NodeId {
        self.scene_root
    }

    fn camera_root(&self) -> NodeId {
        self.camera_root
    }

    fn camera(&self) -> CameraState {
        self.camera
    }

    fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    fn compute_intersections(&self, x: f32, y: f32, mask: PickMask) -> Vec<Hit> {
        let start = self.unproject(Vec3::new(x, y, 0.0));
        let end = self.unproject(Vec3::new(x, y, 1.0));
        let mut hits = Vec::new();
        let mut path = Vec::new();
        self.collect_hits(
            self.camera_root,
            Mat4::IDENTITY,
            start,
            end,
            mask,
            &mut path,
            &mut hits,
        );
        hits
    }

    fn visit_line(&self, start: Vec3, end: Vec3, mask: PickMask, visitor: &mut dyn LineVisitor) {
        let start = self.unproject(start);
        let end = self.unproject(end);
        self.visit(self.camera_root, start, end, mask, visitor);
    }
}
