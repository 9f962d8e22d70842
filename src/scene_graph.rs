//! Scene graph of the robot figure and its depth first traversal.
//!
//! Nodes live in a flat arena and are linked as a first-child / next-sibling tree. The
//! traversal keeps the accumulated transform on a matrix stack: a node is drawn with
//! `parent_world * local`, its child subtree continues from there, and its next sibling
//! continues from the parent transform again.
//!
//! The graph is rebuilt every frame from [`AnimationState`]; nodes are never patched
//! in place.

use nalgebra::Matrix4;
use crate::animation_error::AnimationError;
use crate::palette::Palette;
use crate::parts::{PartId, PartRender, PART_COUNT};
use crate::render_traits::DrawTarget;
use crate::state::AnimationState;
use crate::transform::{root_transform, rotate_x, rotate_z, scale, translate, Transform};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Transform relative to the parent node.
    pub local: Transform,
    pub render: PartRender,
    pub sibling: Option<usize>,
    pub child: Option<usize>,
}

/// Accumulated transform plus the saved transforms of the enclosing nodes.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    pub current: Transform,
    saved: Vec<Transform>,
}

impl MatrixStack {
    pub fn new(initial: Transform) -> Self {
        MatrixStack { current: initial, saved: Vec::with_capacity(PART_COUNT) }
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the last pushed transform. Popping an empty stack keeps the current one.
    pub fn pop(&mut self) {
        if let Some(m) = self.saved.pop() {
            self.current = m;
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root: usize,
}

impl SceneGraph {
    /// Creates the graph, checking that all links are in range, no node is linked from
    /// two places (this also excludes cycles) and every node is reachable from the root.
    pub fn new(nodes: Vec<SceneNode>, root: usize) -> Result<Self, AnimationError> {
        let n = nodes.len();
        if root >= n {
            return Err(AnimationError::InvalidGraphReference { node: root, reference: root });
        }

        let mut linked = vec![false; n];
        linked[root] = true; // nothing may link back to the root
        for (i, node) in nodes.iter().enumerate() {
            for reference in node.sibling.iter().chain(node.child.iter()) {
                if *reference >= n || linked[*reference] {
                    return Err(AnimationError::InvalidGraphReference { node: i, reference: *reference });
                }
                linked[*reference] = true;
            }
        }

        // Every node has at most one incoming link, so reachability also rules out
        // cycles detached from the root.
        let mut reached = vec![false; n];
        let mut pending = vec![root];
        while let Some(i) = pending.pop() {
            reached[i] = true;
            pending.extend(nodes[i].child);
            pending.extend(nodes[i].sibling);
        }
        if let Some(orphan) = reached.iter().position(|r| !r) {
            return Err(AnimationError::InvalidGraphReference { node: orphan, reference: orphan });
        }

        Ok(SceneGraph { nodes, root })
    }

    /// Build the robot figure from the current joint state.
    pub fn figure(state: &AnimationState) -> Result<Self, AnimationError> {
        let nodes = PartId::ALL.iter().map(|&id| build_node(id, state)).collect();
        SceneGraph::new(nodes, PartId::Torso.index())
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Node of the body part, None if the graph is smaller than the figure.
    pub fn part(&self, id: PartId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    /// Depth first walk. Calls `visit` with each node id and its accumulated transform.
    /// After return the stack has the same depth and current transform as before.
    pub fn traverse<F>(&self, id: Option<usize>, stack: &mut MatrixStack, visit: &mut F)
    where
        F: FnMut(usize, &Transform),
    {
        let Some(id) = id else { return };
        let node = &self.nodes[id];

        stack.push();
        stack.current *= node.local;
        visit(id, &stack.current);

        self.traverse(node.child, stack, visit);
        stack.pop();

        self.traverse(node.sibling, stack, visit);
    }

    /// Draw all nodes starting from the `initial` transform (normally the root pose).
    pub fn render(&self, initial: &Transform, palette: &Palette, target: &mut dyn DrawTarget) {
        let mut stack = MatrixStack::new(*initial);
        self.traverse(Some(self.root), &mut stack, &mut |id, world| {
            self.nodes[id].render.render(world, palette, target);
        });
    }

    /// Accumulated transform of every node, indexed by node id.
    pub fn world_transforms(&self, initial: &Transform) -> Vec<Transform> {
        let mut worlds = vec![Matrix4::identity(); self.nodes.len()];
        let mut stack = MatrixStack::new(*initial);
        self.traverse(Some(self.root), &mut stack, &mut |id, world| {
            worlds[id] = *world;
        });
        worlds
    }
}

/// Placement of the figure for the state, used as the initial traversal transform.
pub fn figure_base(state: &AnimationState) -> Transform {
    root_transform(&state.root.position, state.root.yaw)
}

/// Constructs the node of the given part from the joint state. Pure function of the state.
pub fn build_node(id: PartId, state: &AnimationState) -> SceneNode {
    use PartId::*;

    let joints = &state.joints;
    let link = |part: PartId| Some(part.index());

    let (local, sibling, child) = match id {
        Torso => (translate(0.0, -3.0, 0.0) * scale(0.7, 1.0, 1.0), None, link(Neck)),
        Neck => (translate(0.0, 2.0, 0.0), link(LeftTread), link(Head)),
        Head => (translate(0.0, 0.6, 0.0) * rotate_x(joints.head_tilt), None, link(LeftEyeOuter)),

        LeftEyeOuter => (translate(-0.7, 0.15, 0.6), link(RightEyeOuter), link(LeftEyeInner)),
        LeftEyeInner => (translate(0.0, -0.01, 0.1), None, link(LeftPupil)),
        LeftPupil => (translate(0.0, 0.0, 1.1), None, None),
        RightEyeOuter => (translate(0.7, 0.15, 0.6), None, link(RightEyeInner)),
        RightEyeInner => (translate(0.0, -0.01, 0.1), None, link(RightPupil)),
        RightPupil => (translate(0.0, 0.0, 1.1), None, None),

        LeftTread => (translate(-1.8, -1.5, 0.0) * rotate_z(90.0), link(RightTread), None),
        RightTread => (translate(1.8, -1.5, 0.0) * rotate_z(90.0), link(LeftShoulder), None),

        LeftShoulder => (translate(-1.8, 0.9, 0.0) * rotate_x(joints.shoulders[0]),
                         link(RightShoulder), link(LeftArm)),
        LeftArm => (translate(0.0, -1.2, 0.0), None, link(LeftWrist)),
        LeftWrist => (translate(0.0, joints.wrists[0], 0.0), None, link(LeftHand)),
        LeftHand => (translate(0.0, 0.05, 0.0), None, link(LeftClaw1)),
        LeftClaw1 => (translate(-0.4, -0.85, 0.0) * rotate_z(45.0), link(LeftClaw2), None),
        LeftClaw2 => (translate(0.4, -0.85, 0.0) * rotate_z(-45.0), None, None),

        RightShoulder => (translate(1.8, 0.9, 0.0) * rotate_x(joints.shoulders[1]), None, link(RightArm)),
        RightArm => (translate(0.0, -1.2, 0.0), None, link(RightWrist)),
        RightWrist => (translate(0.0, joints.wrists[1], 0.0), None, link(RightHand)),
        RightHand => (translate(0.0, 0.05, 0.0), None, link(RightClaw1)),
        RightClaw1 => (translate(-0.4, -0.85, 0.0) * rotate_z(45.0), link(RightClaw2), None),
        RightClaw2 => (translate(0.4, -0.85, 0.0) * rotate_z(-45.0), None, None),
    };

    SceneNode { local, render: id.render(), sibling, child }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BehaviorConfig;
    use crate::render_traits::{DrawLog, Shape};

    fn leaf(sibling: Option<usize>, child: Option<usize>) -> SceneNode {
        SceneNode {
            local: translate(1.0, 0.0, 0.0),
            render: PartId::Torso.render(),
            sibling,
            child,
        }
    }

    #[test]
    fn test_figure_is_valid() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let graph = SceneGraph::figure(&state).unwrap();
        assert_eq!(graph.len(), PART_COUNT);
        assert_eq!(graph.root(), PartId::Torso.index());
    }

    #[test]
    fn test_out_of_range_link_is_rejected() {
        let nodes = vec![leaf(None, Some(1)), leaf(None, Some(7))];
        match SceneGraph::new(nodes, 0) {
            Err(AnimationError::InvalidGraphReference { node, reference }) => {
                assert_eq!(node, 1);
                assert_eq!(reference, 7);
            }
            other => panic!("Expected InvalidGraphReference, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_is_rejected() {
        // 0 -> 1 -> 2 -> 1
        let nodes = vec![leaf(None, Some(1)), leaf(None, Some(2)), leaf(Some(1), None)];
        assert!(matches!(SceneGraph::new(nodes, 0),
            Err(AnimationError::InvalidGraphReference { node: 2, reference: 1 })));
    }

    #[test]
    fn test_link_to_root_is_rejected() {
        let nodes = vec![leaf(None, Some(1)), leaf(Some(0), None)];
        assert!(SceneGraph::new(nodes, 0).is_err());
    }

    #[test]
    fn test_unreachable_node_is_rejected() {
        let nodes = vec![leaf(None, Some(1)), leaf(None, None), leaf(None, None)];
        assert!(matches!(SceneGraph::new(nodes, 0),
            Err(AnimationError::InvalidGraphReference { node: 2, .. })));
    }

    #[test]
    fn test_siblings_use_parent_transform() {
        // 0 has child 1, 1 has sibling 2. Both 1 and 2 must be one step from 0.
        let nodes = vec![leaf(None, Some(1)), leaf(Some(2), None), leaf(None, None)];
        let graph = SceneGraph::new(nodes, 0).unwrap();
        let worlds = graph.world_transforms(&Matrix4::identity());
        assert_eq!(worlds[0][(0, 3)], 1.0);
        assert_eq!(worlds[1][(0, 3)], 2.0);
        assert_eq!(worlds[2][(0, 3)], 2.0);
    }

    #[test]
    fn test_traverse_absent_id_is_noop() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let graph = SceneGraph::figure(&state).unwrap();
        let mut stack = MatrixStack::new(translate(5.0, 0.0, 0.0));
        let mut visited = 0;
        graph.traverse(None, &mut stack, &mut |_, _| visited += 1);
        assert_eq!(visited, 0);
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current, translate(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_render_draws_every_part_once() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let graph = SceneGraph::figure(&state).unwrap();
        let mut log = DrawLog::new();
        graph.render(&figure_base(&state), &state.palette(), &mut log);
        assert_eq!(log.calls.len(), PART_COUNT);
        assert_eq!(log.count(Shape::Claw), 4);
        assert_eq!(log.count(Shape::Disc), 2);
        assert_eq!(log.count(Shape::Tread), 2);
        assert_eq!(log.count(Shape::Cube), 11);
    }

    #[test]
    fn test_pre_order_visits_torso_first() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let graph = SceneGraph::figure(&state).unwrap();
        let mut order = Vec::new();
        let mut stack = MatrixStack::new(Matrix4::identity());
        graph.traverse(Some(graph.root()), &mut stack, &mut |id, _| order.push(id));
        assert_eq!(order.len(), PART_COUNT);
        assert_eq!(order[0], PartId::Torso.index());
        assert_eq!(order[1], PartId::Neck.index());
        assert_eq!(order[2], PartId::Head.index());
        assert_eq!(*order.last().unwrap(), PartId::RightClaw2.index());
    }
}
