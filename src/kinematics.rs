//! Forward kinematics of the left claw, the effector that carries the object.

use nalgebra::Point3;
use crate::parts::PartId;
use crate::scene_graph::SceneGraph;
use crate::state::RootPose;
use crate::transform::{root_transform, transform_point, Transform};

/// Nodes from the root down to the gripping claw, in composition order.
pub const CLAW_CHAIN: [PartId; 6] = [
    PartId::Torso,
    PartId::LeftShoulder,
    PartId::LeftArm,
    PartId::LeftWrist,
    PartId::LeftHand,
    PartId::LeftClaw1,
];

/// Gripping point in the frame of the claw node.
pub const CLAW_TIP: [f64; 3] = [0.0, -0.65, 0.4];

/// `base` multiplied by the local transforms of the listed nodes, left to right.
/// None if the graph lacks any of them.
pub fn chain_transform(graph: &SceneGraph, base: &Transform, chain: &[PartId]) -> Option<Transform> {
    chain.iter().try_fold(*base, |m, part| Some(m * graph.part(*part)?.local))
}

/// World position of the gripping point for the given figure placement.
pub fn claw_world_position(graph: &SceneGraph, root: &RootPose) -> Option<Point3<f64>> {
    let base = root_transform(&root.position, root.yaw);
    let claw = chain_transform(graph, &base, &CLAW_CHAIN)?;
    let [x, y, z] = CLAW_TIP;
    Some(transform_point(&claw, &Point3::new(x, y, z)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BehaviorConfig;
    use crate::state::AnimationState;
    use crate::scene_graph::SceneNode;
    use crate::utils::assert_matrix_eq;
    use nalgebra::Matrix4;

    #[test]
    fn test_chain_matches_traversal() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let graph = SceneGraph::figure(&state).unwrap();
        let base = root_transform(&state.root.position, state.root.yaw);
        let worlds = graph.world_transforms(&base);
        let chain = chain_transform(&graph, &base, &CLAW_CHAIN).unwrap();
        assert_matrix_eq(&chain, &worlds[PartId::LeftClaw1.index()], 1e-12);
    }

    #[test]
    fn test_empty_chain_is_base() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let graph = SceneGraph::figure(&state).unwrap();
        let base = crate::transform::translate(1.0, 2.0, 3.0);
        assert_eq!(chain_transform(&graph, &base, &[]), Some(base));
        assert_eq!(chain_transform(&graph, &Matrix4::identity(), &[PartId::LeftArm]),
                   Some(graph.part(PartId::LeftArm).unwrap().local));
    }

    #[test]
    fn test_claw_follows_root_translation() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let graph = SceneGraph::figure(&state).unwrap();
        let here = claw_world_position(&graph, &state.root).unwrap();
        let mut moved = state.root;
        moved.position.x += 2.5;
        let there = claw_world_position(&graph, &moved).unwrap();
        assert!((there.x - here.x - 2.5).abs() < 1e-12);
        assert!((there.y - here.y).abs() < 1e-12);
        assert!((there.z - here.z).abs() < 1e-12);
    }

    #[test]
    fn test_claw_is_left_of_and_below_shoulders_at_rest() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let graph = SceneGraph::figure(&state).unwrap();
        let claw = claw_world_position(&graph, &state.root).unwrap();
        // Torso x scale 0.7 pulls the shoulder in to -1.26 relative to the root
        assert!(claw.x < state.root.position.x);
        // Arm held forward (-90) puts the claw in front of the body
        assert!(claw.z > 0.0);
    }

    #[test]
    fn test_chain_through_smaller_graph_is_none() {
        let state = AnimationState::new(&BehaviorConfig::default());
        let torso = SceneNode {
            local: crate::transform::translate(0.0, 1.0, 0.0),
            render: PartId::Torso.render(),
            sibling: None,
            child: None,
        };
        let graph = SceneGraph::new(vec![torso], 0).unwrap();
        assert!(graph.part(PartId::LeftArm).is_none());
        assert!(chain_transform(&graph, &Matrix4::identity(), &[PartId::Torso]).is_some());
        assert_eq!(chain_transform(&graph, &Matrix4::identity(), &CLAW_CHAIN), None);
        assert_eq!(claw_world_position(&graph, &state.root), None);
    }
}
