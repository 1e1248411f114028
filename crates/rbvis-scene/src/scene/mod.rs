//! Retained scene graph.
//!
//! Nodes live in a flat table keyed by id; parent/child relations are
//! kept in separate maps. The kinematics updater mutates node transforms
//! in place, the host renderer walks the tree read-only.

mod node;

pub use node::*;

use std::collections::HashMap;

use glam::Mat4;

/// Scene-graph structural errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node {0} is not part of the scene")]
    NodeNotFound(NodeId),
    #[error("attaching node {0} would create a cycle")]
    WouldCreateCycle(NodeId),
}

/// Flat node arena plus parent/child indexes.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    parent: HashMap<NodeId, NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node without a parent.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Add a node as a child of `parent`. If `parent` is not in the scene
    /// the node is added unparented.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add_node(node);
        if self.nodes.contains_key(&parent) {
            self.children.entry(parent).or_default().push(id);
            self.parent.insert(id, parent);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Re-parent an existing node under another existing node.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCreateCycle(child));
        }
        self.detach(child);
        self.children.entry(parent).or_default().push(child);
        self.parent.insert(child, parent);
        Ok(())
    }

    /// Remove a node from its parent, keeping it in the scene.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.parent.remove(&child)
            && let Some(siblings) = self.children.get_mut(&parent)
        {
            siblings.retain(|id| *id != child);
        }
    }

    /// Remove a node and all of its descendants.
    pub fn remove_subtree(&mut self, id: NodeId) {
        self.detach(id);

        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            let current = to_remove[i];
            if let Some(children) = self.children.get(&current) {
                to_remove.extend(children.iter().copied());
            }
            i += 1;
        }

        for node_id in to_remove {
            self.nodes.remove(&node_id);
            self.children.remove(&node_id);
            self.parent.remove(&node_id);
        }
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(&id).copied()
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn is_ancestor(&self, maybe_ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == maybe_ancestor {
                return true;
            }
            current = self.parent.get(&id).copied();
        }
        false
    }

    /// World transform of a node, composed root-down through its parent
    /// chain.
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            chain.push(node_id);
            current = self.parent.get(&node_id).copied();
        }

        let mut transform = Mat4::IDENTITY;
        for node_id in chain.into_iter().rev() {
            if let Some(node) = self.nodes.get(&node_id) {
                transform *= node.transform.to_mat4();
            }
        }
        transform
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::transform::Transform;

    use super::*;

    #[test]
    fn add_child_links_both_directions() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::new());
        let child = scene.add_child(root, Node::new());

        assert_eq!(scene.parent_of(child), Some(root));
        assert_eq!(scene.children_of(root), &[child]);
    }

    #[test]
    fn attach_moves_between_parents() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new());
        let b = scene.add_node(Node::new());
        let child = scene.add_child(a, Node::new());

        scene.attach(b, child).unwrap();
        assert_eq!(scene.parent_of(child), Some(b));
        assert!(scene.children_of(a).is_empty());
    }

    #[test]
    fn attach_rejects_cycles_and_unknown_nodes() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::new());
        let child = scene.add_child(root, Node::new());
        let grandchild = scene.add_child(child, Node::new());

        assert_eq!(
            scene.attach(grandchild, root),
            Err(SceneError::WouldCreateCycle(root))
        );
        assert_eq!(
            scene.attach(root, root),
            Err(SceneError::WouldCreateCycle(root))
        );

        let stranger = Node::new().id;
        assert_eq!(
            scene.attach(root, stranger),
            Err(SceneError::NodeNotFound(stranger))
        );
    }

    #[test]
    fn remove_subtree_takes_descendants_along() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::new());
        let child = scene.add_child(root, Node::new());
        let grandchild = scene.add_child(child, Node::new());
        let sibling = scene.add_child(root, Node::new());

        scene.remove_subtree(child);

        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert!(scene.contains(sibling));
        assert_eq!(scene.children_of(root), &[sibling]);
    }

    #[test]
    fn world_transform_composes_parent_chain() {
        let mut scene = Scene::new();
        let root = scene.add_node(
            Node::new().with_transform(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0))),
        );
        let child = scene.add_child(
            root,
            Node::new().with_transform(Transform::from_translation(Vec3::new(0.0, 2.0, 0.0))),
        );

        let p = scene.world_transform(child).transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 0.0));
    }
}
