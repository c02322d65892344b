//! Hovered handle tracking and highlight colour.

use glam::Vec4;

use crate::scene::{Hit, NodeId, SceneError, SceneHost};
use crate::tags::{HandleTag, NodeTags};

/// The axis handle under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverState {
    pub handle: NodeId,
    pub tag: HandleTag,
    /// Colour the handle had before it was highlighted.
    pub saved_color: Option<Vec4>,
}

/// First axis-tagged node of `path`, scanning from the leaf towards the root.
pub fn handle_in_path(tags: &NodeTags, path: &[NodeId]) -> Option<(NodeId, HandleTag)> {
    path.iter()
        .rev()
        .find_map(|&node| tags.handle(node).map(|tag| (node, tag)))
}

/// Give the previously hovered handle its colour back.
pub fn restore<H: SceneHost + ?Sized>(
    host: &mut H,
    hover: &HoverState,
) -> Result<(), SceneError> {
    match hover.saved_color {
        Some(color) => host.set_color(hover.handle, color),
        None => Ok(()),
    }
}

/// Move the hover to the handle found in `hit`.
///
/// Restores the old handle's colour, then saves and highlights the new one.
/// A miss, or a hit without any axis-tagged node, clears the hover. Returns
/// the new hover state.
pub fn update_hover<H: SceneHost + ?Sized>(
    host: &mut H,
    tags: &NodeTags,
    previous: Option<HoverState>,
    hit: Option<&Hit>,
    highlight: Vec4,
) -> Result<Option<HoverState>, SceneError> {
    if let Some(previous) = &previous {
        restore(host, previous)?;
    }

    let Some((handle, tag)) = hit.and_then(|hit| handle_in_path(tags, &hit.node_path)) else {
        return Ok(None);
    };

    let saved_color = host.color(handle)?;
    host.set_color(handle, highlight)?;
    Ok(Some(HoverState {
        handle,
        tag,
        saved_color,
    }))
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::mask::{Axis, HandleKind};
    use crate::scene::{CameraState, CanvasSize};
    use crate::scene_graph::SceneGraph;

    const YELLOW: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);

    fn setup() -> (SceneGraph, NodeTags, NodeId, NodeId) {
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
        let mut tags = NodeTags::new();
        let x = graph.create_transform(Mat4::IDENTITY);
        let y = graph.create_transform(Mat4::IDENTITY);
        graph.set_color(x, Vec4::new(1.0, 0.0, 0.0, 1.0)).unwrap();
        graph.set_color(y, Vec4::new(0.0, 1.0, 0.0, 1.0)).unwrap();
        tags.tag_handle(
            x,
            HandleTag {
                axis: Axis::X,
                kind: HandleKind::Arrow,
            },
        );
        tags.tag_handle(
            y,
            HandleTag {
                axis: Axis::Y,
                kind: HandleKind::Arrow,
            },
        );
        (graph, tags, x, y)
    }

    fn hit_through(path: Vec<NodeId>) -> Hit {
        Hit {
            point: Vec3::ZERO,
            ratio: 0.5,
            node_path: path,
        }
    }

    #[test]
    fn test_hover_highlights_and_restores() {
        let (mut graph, tags, x, y) = setup();

        let hover = update_hover(
            &mut graph,
            &tags,
            None,
            Some(&hit_through(vec![NodeId(0), x, NodeId(99)])),
            YELLOW,
        )
        .unwrap();
        let hover = hover.unwrap();
        assert_eq!(hover.handle, x);
        assert_eq!(graph.color(x).unwrap(), Some(YELLOW));

        let hover = update_hover(
            &mut graph,
            &tags,
            Some(hover),
            Some(&hit_through(vec![y])),
            YELLOW,
        )
        .unwrap();
        assert_eq!(hover.map(|h| h.tag.axis), Some(Axis::Y));
        assert_eq!(graph.color(x).unwrap(), Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(graph.color(y).unwrap(), Some(YELLOW));

        let cleared = update_hover(&mut graph, &tags, hover, None, YELLOW).unwrap();
        assert_eq!(cleared, None);
        assert_eq!(graph.color(y).unwrap(), Some(Vec4::new(0.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_hit_without_tagged_node_clears() {
        let (mut graph, tags, _, _) = setup();
        let hover = update_hover(
            &mut graph,
            &tags,
            None,
            Some(&hit_through(vec![NodeId(0), NodeId(1)])),
            YELLOW,
        )
        .unwrap();
        assert_eq!(hover, None);
    }

    #[test]
    fn test_handle_in_path_takes_deepest_tag() {
        let (_, tags, x, y) = setup();
        assert_eq!(handle_in_path(&tags, &[x, y]).map(|(node, _)| node), Some(y));
    }
}
