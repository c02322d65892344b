//! The node gizmo: attachment, hover, drag sessions and per-frame update.

use glam::{Mat4, Vec2, Vec4};
use nodegizmo_config::GizmoConfig;
use nodegizmo_ipc::{GizmoToHost, HostToGizmo, HoveredHandle, MouseButton, MouseEvent};

use crate::attach::{
    TargetBinding, find_in_ancestors, find_in_path, insert_editable_transform, propagate_mask,
};
use crate::error::GizmoError;
use crate::hover::{self, HoverState};
use crate::mask::PickMask;
use crate::normalize::normalize_gizmo;
use crate::picking::{GizmoOnlyPicking, pick_nearest};
use crate::rig::GizmoRig;
use crate::scene::{NodeId, SceneHost};
use crate::session::{EditSession, edit_mode};
use crate::tags::NodeTags;

/// Proof that a drag suspended the host's own input handling.
///
/// Returned by [`NodeGizmo::on_mouse_down`] when a drag starts; hand it back
/// to [`NodeGizmo::on_mouse_up`] or [`NodeGizmo::on_mouse_out`] to resume.
#[must_use = "pass the grab back to on_mouse_up or on_mouse_out to resume host input"]
#[derive(Debug)]
pub struct InputGrab {
    _private: (),
}

/// Interactive transform gizmo bound to at most one scene node.
pub struct NodeGizmo {
    config: GizmoConfig,
    tags: NodeTags,
    rig: GizmoRig,
    target: Option<TargetBinding>,
    hover: Option<HoverState>,
    session: Option<EditSession>,
    outbox: Vec<GizmoToHost>,
}

impl NodeGizmo {
    /// Build the gizmo subtree in `host`. The gizmo starts detached.
    pub fn new<H: SceneHost + ?Sized>(host: &mut H, config: GizmoConfig) -> Result<Self, GizmoError> {
        let mut tags = NodeTags::new();
        let rig = GizmoRig::build(host, &mut tags)?;
        Ok(Self {
            config,
            tags,
            rig,
            target: None,
            hover: None,
            session: None,
            outbox: Vec::new(),
        })
    }

    pub fn config(&self) -> &GizmoConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GizmoConfig {
        &mut self.config
    }

    pub fn rig(&self) -> &GizmoRig {
        &self.rig
    }

    /// Root node of the gizmo subtree, for the host to draw.
    pub fn root(&self) -> NodeId {
        self.rig.root
    }

    pub fn target(&self) -> Option<&TargetBinding> {
        self.target.as_ref()
    }

    pub fn hovered(&self) -> Option<&HoverState> {
        self.hover.as_ref()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    pub fn tags(&self) -> &NodeTags {
        &self.tags
    }

    /// Side table used to mark scene nodes editable.
    pub fn tags_mut(&mut self) -> &mut NodeTags {
        &mut self.tags
    }

    /// Take every notification queued since the last call.
    pub fn drain_messages(&mut self) -> Vec<GizmoToHost> {
        std::mem::take(&mut self.outbox)
    }

    /// Mark `node` editable and refresh the gizmo if it is the bound target.
    pub fn set_editable<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        node: NodeId,
        mask: PickMask,
    ) -> Result<(), GizmoError> {
        self.tags.set_editable(node, mask);
        let Some(target) = self.target.as_mut().filter(|target| target.node == node) else {
            return Ok(());
        };
        target.mask = mask;
        if self.session.is_none() {
            propagate_mask(host, &self.rig, Some(mask))?;
        }
        Ok(())
    }

    /// Bind to `node`, or to its nearest editable first-parent ancestor.
    ///
    /// When nothing editable is found, a new editable transform is inserted
    /// between `node` and its parents and bound instead. `None` detaches the
    /// gizmo. Returns the bound node.
    pub fn attach_node<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        node: Option<NodeId>,
    ) -> Result<Option<NodeId>, GizmoError> {
        let resolved = match node {
            None => None,
            Some(node) => match find_in_ancestors(host, &self.tags, node)? {
                Some(found) => Some(found),
                None => Some(insert_editable_transform(host, &mut self.tags, node)?),
            },
        };
        self.bind(host, resolved)?;
        Ok(resolved)
    }

    /// Bind to the nearest editable node of `path`, scanning from its leaf.
    pub fn attach_path<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        path: &[NodeId],
    ) -> Result<Option<NodeId>, GizmoError> {
        let resolved = find_in_path(&self.tags, path);
        self.bind(host, resolved)?;
        Ok(resolved)
    }

    pub fn detach<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> Result<(), GizmoError> {
        self.bind(host, None)
    }

    fn bind<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        node: Option<NodeId>,
    ) -> Result<(), GizmoError> {
        self.session = None;
        if let Some(previous) = self.hover.take() {
            hover::restore(host, &previous)?;
            self.outbox.push(GizmoToHost::HoverChanged { handle: None });
        }

        let Some(node) = node else {
            propagate_mask(host, &self.rig, None)?;
            if let Some(previous) = self.target.take() {
                tracing::info!("Gizmo detached from {}", previous.node);
                self.outbox.push(GizmoToHost::Detached);
            }
            return Ok(());
        };

        let target = TargetBinding::new(host, &self.tags, node)?;
        propagate_mask(host, &self.rig, Some(target.mask))?;
        self.target = Some(target);

        tracing::info!("Gizmo attached to {} with mask {:?}", node, target.mask);
        self.outbox.push(GizmoToHost::Attached {
            node: node.raw(),
            mask: target.mask.bits(),
        });
        Ok(())
    }

    /// Re-pick the scene under `mouse` and attach to what was hit.
    ///
    /// A miss detaches the gizmo.
    pub fn on_double_click<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        mouse: Vec2,
    ) -> Result<(), GizmoError> {
        host.set_node_mask(self.rig.root, PickMask::empty())?;
        let hit = pick_nearest(host, mouse, PickMask::NO_PICK);
        host.set_node_mask(self.rig.root, PickMask::NO_PICK)?;

        tracing::debug!(
            "Double click at {} hit {:?}",
            mouse,
            hit.as_ref().and_then(|hit| hit.leaf())
        );
        if self.config.auto_insert_transform {
            self.attach_node(host, hit.and_then(|hit| hit.leaf()))?;
        } else {
            let path = hit.map(|hit| hit.node_path).unwrap_or_default();
            self.attach_path(host, &path)?;
        }
        Ok(())
    }

    /// Update the hover while idle, or the bound target while dragging.
    pub fn on_mouse_move<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        mouse: Vec2,
    ) -> Result<(), GizmoError> {
        let Some(target) = self.target else {
            return Ok(());
        };

        let Some(session) = self.session else {
            let hit = GizmoOnlyPicking::new(host, self.rig.root)?
                .pick(mouse, PickMask::PICK_XYZ | PickMask::PICK_GIZMO);
            let previous = self.hover.take();
            let highlight = Vec4::from_array(self.config.highlight_color);
            self.hover = hover::update_hover(host, &self.tags, previous, hit.as_ref(), highlight)?;

            let before = previous.map(|state| state.handle);
            let after = self.hover.map(|state| state.handle);
            if before != after {
                tracing::debug!("Hovered handle changed from {:?} to {:?}", before, after);
                self.outbox.push(GizmoToHost::HoverChanged {
                    handle: self.hover.map(|state| HoveredHandle {
                        axis: state.tag.axis.into(),
                        mode: edit_mode(state.tag.kind),
                    }),
                });
            }
            return Ok(());
        };

        if let Some(local) =
            session.update(host, &self.rig, &self.tags, &self.config, target.node, mouse)?
        {
            self.push_transform(target.node, local);
        }
        Ok(())
    }

    /// Start a drag on the hovered handle.
    ///
    /// Only the left button (or an unknown button) starts a drag, and only
    /// while a handle is hovered and a target is bound.
    pub fn on_mouse_down<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        button: Option<MouseButton>,
        mouse: Vec2,
    ) -> Result<Option<InputGrab>, GizmoError> {
        if !matches!(button, None | Some(MouseButton::Left)) || self.session.is_some() {
            return Ok(None);
        }
        let (Some(target), Some(hover)) = (self.target, self.hover) else {
            return Ok(None);
        };

        let session = EditSession::start(host, &self.rig, &target, &hover, mouse)?;
        self.outbox.push(GizmoToHost::EditStarted {
            node: target.node.raw(),
            mode: session.mode,
            axis: session.axis.into(),
        });
        self.session = Some(session);
        Ok(Some(InputGrab { _private: () }))
    }

    /// End the drag, if any. Returns whether host input was resumed.
    pub fn on_mouse_up<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        grab: Option<InputGrab>,
    ) -> Result<bool, GizmoError> {
        let resumed = grab.is_some();

        if let Some(session) = self.session.take() {
            tracing::info!("Finished {:?} edit", session.mode);
            if let Some(target) = self.target {
                self.outbox.push(GizmoToHost::EditFinished {
                    node: target.node.raw(),
                });
            }
        }
        if let Some(target) = self.target {
            propagate_mask(host, &self.rig, Some(target.mask))?;
        }
        Ok(resumed)
    }

    /// Leaving the canvas ends a drag exactly like releasing the button.
    pub fn on_mouse_out<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        grab: Option<InputGrab>,
    ) -> Result<bool, GizmoError> {
        self.on_mouse_up(host, grab)
    }

    /// Dispatch a mouse event. `grab` holds the drag's [`InputGrab`] between
    /// events.
    ///
    /// Returns whether the host should also handle the event itself, which
    /// is the case whenever no drag holds the input.
    pub fn handle_event<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        grab: &mut Option<InputGrab>,
        event: &MouseEvent,
    ) -> Result<bool, GizmoError> {
        let [x, y] = event.position();
        let mouse = Vec2::new(x, y);
        match *event {
            MouseEvent::Move { .. } => self.on_mouse_move(host, mouse)?,
            MouseEvent::ButtonDown { button, .. } => {
                if let Some(new_grab) = self.on_mouse_down(host, Some(button), mouse)? {
                    *grab = Some(new_grab);
                }
            }
            MouseEvent::ButtonUp { .. } => {
                self.on_mouse_up(host, grab.take())?;
            }
            MouseEvent::Out { .. } => {
                self.on_mouse_out(host, grab.take())?;
            }
            MouseEvent::DoubleClick { .. } => self.on_double_click(host, mouse)?,
            MouseEvent::Scroll { .. } => {}
        }
        Ok(grab.is_none())
    }

    /// Apply a host message. Mouse messages return the same flag as
    /// [`NodeGizmo::handle_event`]; other messages return `false`.
    pub fn handle_message<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        grab: &mut Option<InputGrab>,
        message: HostToGizmo,
    ) -> Result<bool, GizmoError> {
        match message {
            HostToGizmo::Mouse(event) => return self.handle_event(host, grab, &event),
            HostToGizmo::AttachNode { node } => {
                self.attach_node(host, node.map(NodeId))?;
            }
            HostToGizmo::AttachPath { path } => {
                let path: Vec<NodeId> = path.into_iter().map(NodeId).collect();
                self.attach_path(host, &path)?;
            }
            HostToGizmo::SetEditable { node, mask } => {
                self.set_editable(host, NodeId(node), PickMask::from_bits_retain(mask))?;
            }
            HostToGizmo::SetAutoInsert { enabled } => {
                self.config.auto_insert_transform = enabled;
            }
            HostToGizmo::Frame => self.update(host)?,
        }
        Ok(false)
    }

    /// Per-frame update: follow the target and keep the gizmo's screen size.
    pub fn update<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> Result<(), GizmoError> {
        let Some(target) = self.target.as_mut() else {
            return Ok(());
        };
        target.world = host.world_matrix(target.node)?;
        normalize_gizmo(host, &self.rig, target.world, self.config.screen_size_divisor)?;
        Ok(())
    }

    fn push_transform(&mut self, node: NodeId, local: Mat4) {
        self.outbox.push(GizmoToHost::TransformChanged {
            node: node.raw(),
            matrix: local.to_cols_array(),
        });
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};
    use nodegizmo_ipc::{EditMode, GizmoAxis};

    use super::*;
    use crate::mask::{Axis, HandleKind};
    use crate::picking::world_to_screen;
    use crate::scene::{CameraState, CanvasSize};
    use crate::scene_graph::SceneGraph;
    use crate::session::DragConstraint;
    use crate::shapes::HandleShape;

    const YELLOW: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);

    struct Fixture {
        graph: SceneGraph,
        gizmo: NodeGizmo,
        target: NodeId,
        mesh: NodeId,
    }

    /// Camera 20 units up +Z looking at the origin, 800×600 canvas, an
    /// editable transform at the origin holding a small sphere.
    fn fixture(config: GizmoConfig) -> Fixture {
        let mut graph = SceneGraph::new(
            CameraState::look_at(
                Vec3::new(0.0, 0.0, 20.0),
                Vec3::ZERO,
                Vec3::Y,
                std::f32::consts::FRAC_PI_4,
                800.0,
                600.0,
                0.1,
                1000.0,
            ),
            CanvasSize::new(800.0, 600.0),
        );
        let target = graph.create_transform(Mat4::IDENTITY);
        let mesh = graph.create_geometry(HandleShape::Sphere { radius: 0.5 });
        graph.add_child(graph.scene_root(), target).unwrap();
        graph.add_child(target, mesh).unwrap();

        let mut gizmo = NodeGizmo::new(&mut graph, config).unwrap();
        gizmo.tags_mut().set_editable(target, PickMask::PICK_GIZMO);
        Fixture {
            graph,
            gizmo,
            target,
            mesh,
        }
    }

    fn screen(f: &Fixture, point: Vec3) -> Vec2 {
        world_to_screen(&f.graph.camera(), &f.graph.canvas(), point)
    }

    #[test]
    fn test_new_gizmo_is_detached_and_hidden() {
        let f = fixture(GizmoConfig::default());
        assert!(f.gizmo.target().is_none());
        assert_eq!(f.graph.node_mask(f.gizmo.root()).unwrap(), PickMask::empty());
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut f = fixture(GizmoConfig::default());
        let path = [f.graph.camera_root(), f.graph.scene_root(), f.target, f.mesh];

        let first = f.gizmo.attach_path(&mut f.graph, &path).unwrap();
        let binding = *f.gizmo.target().unwrap();
        let masks: Vec<PickMask> = f
            .gizmo
            .rig()
            .groups()
            .iter()
            .map(|group| f.graph.node_mask(group.node).unwrap())
            .collect();

        let second = f.gizmo.attach_path(&mut f.graph, &path).unwrap();
        assert_eq!(first, Some(f.target));
        assert_eq!(first, second);
        assert_eq!(*f.gizmo.target().unwrap(), binding);
        let again: Vec<PickMask> = f
            .gizmo
            .rig()
            .groups()
            .iter()
            .map(|group| f.graph.node_mask(group.node).unwrap())
            .collect();
        assert_eq!(masks, again);
        assert_eq!(f.graph.node_mask(f.gizmo.root()).unwrap(), PickMask::NO_PICK);

        // Direct-node variant lands on the same target without inserting
        let nodes = f.graph.len();
        f.gizmo.attach_node(&mut f.graph, Some(f.mesh)).unwrap();
        f.gizmo.attach_node(&mut f.graph, Some(f.mesh)).unwrap();
        assert_eq!(f.gizmo.target().map(|t| t.node), Some(f.target));
        assert_eq!(f.graph.len(), nodes);
    }

    #[test]
    fn test_double_click_on_empty_space_detaches() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.attach_node(&mut f.graph, Some(f.target)).unwrap();
        f.gizmo.drain_messages();

        f.gizmo
            .on_double_click(&mut f.graph, Vec2::new(5.0, 5.0))
            .unwrap();

        assert!(f.gizmo.target().is_none());
        assert_eq!(f.graph.node_mask(f.gizmo.root()).unwrap(), PickMask::empty());
        assert_eq!(f.gizmo.drain_messages(), vec![GizmoToHost::Detached]);
    }

    #[test]
    fn test_double_click_on_object_attaches_to_editable_ancestor() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo
            .on_double_click(&mut f.graph, Vec2::new(400.0, 300.0))
            .unwrap();
        assert_eq!(f.gizmo.target().map(|t| t.node), Some(f.target));
        assert_eq!(
            f.gizmo.drain_messages(),
            vec![GizmoToHost::Attached {
                node: f.target.raw(),
                mask: PickMask::PICK_GIZMO.bits(),
            }]
        );
    }

    #[test]
    fn test_double_click_auto_inserts_transform() {
        let config = GizmoConfig {
            auto_insert_transform: true,
            ..GizmoConfig::default()
        };
        let mut f = fixture(config);
        f.gizmo.tags_mut().clear_editable(f.target);

        f.gizmo
            .on_double_click(&mut f.graph, Vec2::new(400.0, 300.0))
            .unwrap();

        let bound = f.gizmo.target().unwrap().node;
        assert_ne!(bound, f.target);
        assert_eq!(f.graph.parents(f.mesh).unwrap(), vec![bound]);
        assert_eq!(f.graph.parents(bound).unwrap(), vec![f.target]);
        assert_eq!(f.gizmo.tags().editable(bound), PickMask::PICK_GIZMO);
    }

    #[test]
    fn test_attach_node_inserts_transform_without_editable_ancestor() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.tags_mut().clear_editable(f.target);

        let bound = f.gizmo.attach_node(&mut f.graph, Some(f.mesh)).unwrap().unwrap();
        assert_ne!(bound, f.target);
        assert_eq!(f.graph.parents(f.mesh).unwrap(), vec![bound]);
        assert_eq!(f.gizmo.tags().editable(bound), PickMask::PICK_GIZMO);
        assert_eq!(f.graph.node_mask(f.gizmo.root()).unwrap(), PickMask::NO_PICK);

        // The inserted transform is found again instead of stacking another one
        let nodes = f.graph.len();
        assert_eq!(f.gizmo.attach_node(&mut f.graph, Some(f.mesh)).unwrap(), Some(bound));
        assert_eq!(f.graph.len(), nodes);
    }

    #[test]
    fn test_double_click_without_auto_insert_stays_inert() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.tags_mut().clear_editable(f.target);
        let nodes = f.graph.len();

        f.gizmo
            .on_double_click(&mut f.graph, Vec2::new(400.0, 300.0))
            .unwrap();

        assert!(f.gizmo.target().is_none());
        assert_eq!(f.graph.len(), nodes);
        assert_eq!(f.graph.node_mask(f.gizmo.root()).unwrap(), PickMask::empty());
        assert!(f.gizmo.drain_messages().is_empty());
    }

    #[test]
    fn test_update_scales_gizmo_with_eye_distance() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.attach_node(&mut f.graph, Some(f.target)).unwrap();
        f.gizmo.update(&mut f.graph).unwrap();

        let k = 20.0 / (10.0 * f.graph.camera().projection_scale());
        let (scale, _, translation) = f
            .graph
            .matrix(f.gizmo.root())
            .unwrap()
            .to_scale_rotation_translation();
        assert!(scale.abs_diff_eq(Vec3::splat(k), 1e-5));
        assert_eq!(translation, Vec3::ZERO);
    }

    #[test]
    fn test_x_arrow_drag_translates_along_world_x() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.attach_node(&mut f.graph, Some(f.target)).unwrap();
        f.gizmo.update(&mut f.graph).unwrap();
        f.gizmo.drain_messages();

        // On the X arrow's pick cylinder, clear of the rings and quads
        let grab_at = screen(&f, Vec3::new(1.8, 0.05, 0.0));
        f.gizmo.on_mouse_move(&mut f.graph, grab_at).unwrap();
        let hover = *f.gizmo.hovered().unwrap();
        assert_eq!(hover.tag.axis, Axis::X);
        assert_eq!(hover.tag.kind, HandleKind::Arrow);
        assert_eq!(f.graph.color(hover.handle).unwrap(), Some(YELLOW));

        let grab = f
            .gizmo
            .on_mouse_down(&mut f.graph, Some(MouseButton::Left), grab_at)
            .unwrap();
        assert!(grab.is_some());
        assert_eq!(
            f.graph.node_mask(f.gizmo.rig().rotate.node).unwrap(),
            PickMask::empty()
        );

        f.gizmo
            .on_mouse_move(&mut f.graph, grab_at + Vec2::new(100.0, 0.0))
            .unwrap();
        let local = f.graph.matrix(f.target).unwrap();
        let translation = local.w_axis.truncate();
        let m00 = f.graph.camera().projection.x_axis.x;
        let expected = 0.25 * 20.0 / m00;
        assert!((translation.x - expected).abs() < 1e-2, "{translation}");
        assert!(translation.y.abs() < 1e-3);
        assert!(translation.z.abs() < 1e-3);

        // Off-axis mouse paths still only move along X
        for delta in [Vec2::new(-60.0, 45.0), Vec2::new(30.0, -80.0)] {
            f.gizmo.on_mouse_move(&mut f.graph, grab_at + delta).unwrap();
            let translation = f.graph.matrix(f.target).unwrap().w_axis.truncate();
            assert!(translation.y.abs() < 1e-3 && translation.z.abs() < 1e-3);
        }

        assert!(f.gizmo.on_mouse_up(&mut f.graph, grab).unwrap());
        assert!(!f.gizmo.is_editing());
        assert_eq!(
            f.graph.node_mask(f.gizmo.rig().rotate.node).unwrap(),
            PickMask::PICK_ARC
        );

        let messages = f.gizmo.drain_messages();
        assert!(matches!(
            messages.first(),
            Some(GizmoToHost::HoverChanged {
                handle: Some(HoveredHandle {
                    axis: GizmoAxis::X,
                    mode: EditMode::TranslateAxis,
                })
            })
        ));
        assert!(messages.contains(&GizmoToHost::EditFinished {
            node: f.target.raw()
        }));
    }

    /// Hover the first of `points` that lands on the `axis` ring, drag 60px
    /// along the session's reference direction and release. Returns the
    /// target's rotation.
    fn drag_ring(f: &mut Fixture, axis: Axis, points: &[Vec3]) -> Quat {
        let mut grab_at = None;
        for &point in points {
            let at = screen(f, point);
            f.gizmo.on_mouse_move(&mut f.graph, at).unwrap();
            let hovered = f.gizmo.hovered().map(|hover| hover.tag);
            if hovered.is_some_and(|tag| tag.axis == axis && tag.kind == HandleKind::Arc) {
                grab_at = Some(at);
                break;
            }
        }
        let grab_at = grab_at.unwrap_or_else(|| panic!("no point hovered the {axis:?} ring"));

        let grab = f
            .gizmo
            .on_mouse_down(&mut f.graph, Some(MouseButton::Left), grab_at)
            .unwrap();
        let Some(DragConstraint::Rotate { origin, direction }) =
            f.gizmo.session().map(|session| session.constraint)
        else {
            panic!("expected a rotate session");
        };
        assert_eq!(origin, grab_at);
        assert!((direction.length() - 1.0).abs() < 1e-5);

        // 60px along the reference direction on a 600px-tall canvas
        f.gizmo
            .on_mouse_move(&mut f.graph, grab_at + direction * 60.0)
            .unwrap();
        let (_, rotation, translation) = f
            .graph
            .matrix(f.target)
            .unwrap()
            .to_scale_rotation_translation();
        assert!(translation.abs_diff_eq(Vec3::ZERO, 1e-6));

        assert!(f.gizmo.on_mouse_out(&mut f.graph, grab).unwrap());
        assert!(!f.gizmo.is_editing());
        rotation
    }

    fn attached_fixture() -> (Fixture, f32) {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.attach_node(&mut f.graph, Some(f.target)).unwrap();
        f.gizmo.update(&mut f.graph).unwrap();
        let k = 20.0 / (10.0 * f.graph.camera().projection_scale());
        (f, k)
    }

    #[test]
    fn test_z_ring_drag_rotates_about_z() {
        let (mut f, k) = attached_fixture();
        let angle = 120f32.to_radians();
        let on_ring = Vec3::new(angle.cos(), angle.sin(), 0.0) * k;
        let rotation = drag_ring(&mut f, Axis::Z, &[on_ring]);
        assert!(rotation.abs_diff_eq(Quat::from_rotation_z(0.4), 1e-4));
    }

    #[test]
    fn test_x_ring_drag_rotates_about_x() {
        let (mut f, k) = attached_fixture();
        // The visible half of the X ring faces the eye on +Z
        let points: Vec<Vec3> = [40f32, 60.0, 120.0, 140.0]
            .iter()
            .map(|deg| Vec3::new(0.0, deg.to_radians().cos(), deg.to_radians().sin()) * k)
            .collect();
        let rotation = drag_ring(&mut f, Axis::X, &points);
        assert!(rotation.abs_diff_eq(Quat::from_rotation_x(4.0 * 60.0 / 600.0), 1e-4));
    }

    #[test]
    fn test_y_ring_drag_rotates_about_y() {
        let (mut f, k) = attached_fixture();
        let points: Vec<Vec3> = [40f32, 60.0, 120.0, 140.0]
            .iter()
            .map(|deg| Vec3::new(deg.to_radians().cos(), 0.0, deg.to_radians().sin()) * k)
            .collect();
        let rotation = drag_ring(&mut f, Axis::Y, &points);
        assert!(rotation.abs_diff_eq(Quat::from_rotation_y(4.0 * 60.0 / 600.0), 1e-4));
    }

    #[test]
    fn test_z_plane_drag_translates_in_xy() {
        let (mut f, k) = attached_fixture();
        let grab_point = Vec3::new(0.5, 0.5, 0.0) * k;
        let grab_at = screen(&f, grab_point);
        f.gizmo.on_mouse_move(&mut f.graph, grab_at).unwrap();
        let hover = *f.gizmo.hovered().unwrap();
        assert_eq!(hover.tag.axis, Axis::Z);
        assert_eq!(hover.tag.kind, HandleKind::Plane);

        let grab = f
            .gizmo
            .on_mouse_down(&mut f.graph, Some(MouseButton::Left), grab_at)
            .unwrap();
        assert_eq!(
            f.gizmo.session().map(|session| session.mode),
            Some(EditMode::TranslatePlane)
        );

        let delta = Vec2::new(80.0, -40.0);
        f.gizmo.on_mouse_move(&mut f.graph, grab_at + delta).unwrap();
        let translation = f.graph.matrix(f.target).unwrap().w_axis.truncate();

        let projection = f.graph.camera().projection;
        let expected = Vec3::new(
            80.0 / 400.0 * 20.0 / projection.x_axis.x,
            40.0 / 300.0 * 20.0 / projection.y_axis.y,
            0.0,
        );
        assert!(translation.abs_diff_eq(expected, 1e-2), "{translation}");
        assert!(translation.z.abs() < 1e-4);

        // The grabbed point stays under the cursor
        let moved = screen(&f, grab_point + translation);
        assert!(moved.abs_diff_eq(grab_at + delta, 0.5), "{moved}");

        assert!(f.gizmo.on_mouse_up(&mut f.graph, grab).unwrap());
    }

    #[test]
    fn test_right_button_does_not_start_drag() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.attach_node(&mut f.graph, Some(f.target)).unwrap();
        f.gizmo.update(&mut f.graph).unwrap();
        let grab_at = screen(&f, Vec3::new(1.8, 0.05, 0.0));
        f.gizmo.on_mouse_move(&mut f.graph, grab_at).unwrap();

        let grab = f
            .gizmo
            .on_mouse_down(&mut f.graph, Some(MouseButton::Right), grab_at)
            .unwrap();
        assert!(grab.is_none());
        assert!(!f.gizmo.on_mouse_up(&mut f.graph, grab).unwrap());
    }

    #[test]
    fn test_hover_leaves_handle_colour_intact_on_miss() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.attach_node(&mut f.graph, Some(f.target)).unwrap();
        f.gizmo.update(&mut f.graph).unwrap();
        let handle = f.gizmo.rig().translate.handle(Axis::X);
        let original = f.graph.color(handle).unwrap();

        let on_arrow = screen(&f, Vec3::new(1.8, 0.05, 0.0));
        f.gizmo.on_mouse_move(&mut f.graph, on_arrow).unwrap();
        f.gizmo
            .on_mouse_move(&mut f.graph, Vec2::new(10.0, 10.0))
            .unwrap();

        assert!(f.gizmo.hovered().is_none());
        assert_eq!(f.graph.color(handle).unwrap(), original);
    }

    #[test]
    fn test_handle_event_tracks_grab() {
        let mut f = fixture(GizmoConfig::default());
        let mut grab = None;
        f.gizmo
            .handle_message(&mut f.graph, &mut grab, HostToGizmo::AttachNode {
                node: Some(f.target.raw()),
            })
            .unwrap();
        f.gizmo
            .handle_message(&mut f.graph, &mut grab, HostToGizmo::Frame)
            .unwrap();

        let at = screen(&f, Vec3::new(1.8, 0.05, 0.0));
        let forward = f
            .gizmo
            .handle_event(&mut f.graph, &mut grab, &MouseEvent::Move { x: at.x, y: at.y })
            .unwrap();
        assert!(forward);

        let down = MouseEvent::ButtonDown {
            button: MouseButton::Left,
            x: at.x,
            y: at.y,
        };
        assert!(!f.gizmo.handle_event(&mut f.graph, &mut grab, &down).unwrap());
        assert!(grab.is_some());

        let out = MouseEvent::Out { x: 0.0, y: 0.0 };
        assert!(f.gizmo.handle_event(&mut f.graph, &mut grab, &out).unwrap());
        assert!(grab.is_none());
        assert!(!f.gizmo.is_editing());
    }

    #[test]
    fn test_set_editable_refreshes_bound_target() {
        let mut f = fixture(GizmoConfig::default());
        f.gizmo.attach_node(&mut f.graph, Some(f.target)).unwrap();
        f.gizmo
            .set_editable(&mut f.graph, f.target, PickMask::PICK_PLANE)
            .unwrap();
        assert_eq!(f.gizmo.target().unwrap().mask, PickMask::PICK_PLANE);
        assert_eq!(
            f.graph.node_mask(f.gizmo.rig().plane.node).unwrap(),
            PickMask::PICK_PLANE
        );
        assert_eq!(
            f.graph.node_mask(f.gizmo.rig().translate.node).unwrap(),
            PickMask::empty()
        );
    }
}
