use std::collections::BTreeMap;

use lightbox_common::NodeId;
use thiserror::Error;

use crate::helper::{LightHelper, Refreshable};
use crate::light::{Light, LightParam};
use crate::object::Mesh;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("node {0} is not in the scene")]
    NodeNotFound(NodeId),
    #[error("node {id} is not a {expected}")]
    WrongNodeType { id: NodeId, expected: &'static str },
    #[error("{light} lights have no {param} parameter")]
    UnsupportedParam {
        light: &'static str,
        param: LightParam,
    },
}

/// A node owned by the scene graph.
#[derive(Debug, Clone)]
pub enum Node {
    Light(Light),
    Mesh(Mesh),
    Helper(LightHelper),
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Light(_) => "light",
            Self::Mesh(_) => "mesh",
            Self::Helper(_) => "helper",
        }
    }
}

/// Mutable container of every renderable or lightable node.
///
/// Uses BTreeMap so iteration order follows id allocation order on every
/// platform.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
    /// Helpers waiting for a shape refresh at the next frame boundary.
    pending_refresh: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node and return its id.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.insert_with_id(id, node);
        id
    }

    /// Add a node under a known id (used to put a node back).
    pub fn insert_with_id(&mut self, id: NodeId, node: Node) {
        self.next_id = self.next_id.max(id.0 + 1);
        tracing::trace!("insert {} {id}", node.kind_name());
        self.nodes.insert(id, node);
    }

    /// Remove a node. Returns it if it existed.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.pending_refresh.retain(|pending| *pending != id);
        self.nodes.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn lights(&self) -> impl Iterator<Item = (NodeId, &Light)> {
        self.nodes().filter_map(|(id, node)| match node {
            Node::Light(light) => Some((id, light)),
            _ => None,
        })
    }

    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &Mesh)> {
        self.nodes().filter_map(|(id, node)| match node {
            Node::Mesh(mesh) => Some((id, mesh)),
            _ => None,
        })
    }

    pub fn helpers(&self) -> impl Iterator<Item = (NodeId, &LightHelper)> {
        self.nodes().filter_map(|(id, node)| match node {
            Node::Helper(helper) => Some((id, helper)),
            _ => None,
        })
    }

    pub fn light(&self, id: NodeId) -> Result<&Light, SceneError> {
        match self.get(id) {
            Some(Node::Light(light)) => Ok(light),
            Some(_) => Err(SceneError::WrongNodeType {
                id,
                expected: "light",
            }),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    pub fn light_mut(&mut self, id: NodeId) -> Result<&mut Light, SceneError> {
        match self.get_mut(id) {
            Some(Node::Light(light)) => Ok(light),
            Some(_) => Err(SceneError::WrongNodeType {
                id,
                expected: "light",
            }),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    pub fn mesh(&self, id: NodeId) -> Result<&Mesh, SceneError> {
        match self.get(id) {
            Some(Node::Mesh(mesh)) => Ok(mesh),
            Some(_) => Err(SceneError::WrongNodeType {
                id,
                expected: "mesh",
            }),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Result<&mut Mesh, SceneError> {
        match self.get_mut(id) {
            Some(Node::Mesh(mesh)) => Ok(mesh),
            Some(_) => Err(SceneError::WrongNodeType {
                id,
                expected: "mesh",
            }),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    pub fn helper(&self, id: NodeId) -> Result<&LightHelper, SceneError> {
        match self.get(id) {
            Some(Node::Helper(helper)) => Ok(helper),
            Some(_) => Err(SceneError::WrongNodeType {
                id,
                expected: "helper",
            }),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    /// Queue a helper for a single shape refresh at the next frame boundary.
    pub fn schedule_refresh(&mut self, id: NodeId) {
        if !self.pending_refresh.contains(&id) {
            self.pending_refresh.push(id);
        }
    }

    pub fn pending_refreshes(&self) -> usize {
        self.pending_refresh.len()
    }

    /// Refresh every queued helper from its light's current state.
    /// Returns the number of helpers refreshed.
    pub fn apply_refreshes(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_refresh);
        let mut refreshed = 0;
        for id in pending {
            let light_id = match self.helper(id) {
                Ok(helper) => helper.light(),
                Err(err) => {
                    tracing::warn!("skipping helper refresh: {err}");
                    continue;
                }
            };
            let light = match self.light(light_id) {
                Ok(light) => *light,
                Err(err) => {
                    tracing::warn!("helper {id} has no light to follow: {err}");
                    continue;
                }
            };
            if let Some(Node::Helper(helper)) = self.nodes.get_mut(&id) {
                helper.refresh(&light);
                refreshed += 1;
            }
        }
        refreshed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::HelperKind;
    use glam::Vec3;
    use lightbox_common::Color;

    #[test]
    fn ids_follow_insertion_order() {
        let mut graph = SceneGraph::new();
        let a = graph.insert(Node::Light(Light::ambient(Color::WHITE, 0.5)));
        let b = graph.insert(Node::Light(Light::ambient(Color::WHITE, 0.5)));
        assert!(a < b);
        let ids: Vec<NodeId> = graph.nodes().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut graph = SceneGraph::new();
        let a = graph.insert(Node::Light(Light::ambient(Color::WHITE, 0.5)));
        graph.remove(a);
        let b = graph.insert(Node::Light(Light::ambient(Color::WHITE, 0.5)));
        assert_ne!(a, b);
    }

    #[test]
    fn typed_access_reports_wrong_type() {
        let mut graph = SceneGraph::new();
        let light = graph.insert(Node::Light(Light::ambient(Color::WHITE, 0.5)));
        assert!(graph.light(light).is_ok());
        assert!(matches!(
            graph.mesh(light),
            Err(SceneError::WrongNodeType { expected: "mesh", .. })
        ));
        assert!(matches!(
            graph.light(NodeId(99)),
            Err(SceneError::NodeNotFound(NodeId(99)))
        ));
    }

    #[test]
    fn refresh_uses_light_state_at_frame_boundary() {
        let mut graph = SceneGraph::new();
        let light = graph.insert(Node::Light(
            Light::point(Color::WHITE, 0.5, 5.0, 2.0).with_position(Vec3::ZERO),
        ));
        let helper = graph.insert(Node::Helper(LightHelper::new(
            light,
            HelperKind::Point { size: 0.2 },
        )));
        graph.schedule_refresh(helper);
        graph.schedule_refresh(helper);
        assert_eq!(graph.pending_refreshes(), 1);

        // The light moves before the frame boundary; the refresh sees it.
        graph.light_mut(light).unwrap().position = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(graph.apply_refreshes(), 1);
        assert_eq!(graph.pending_refreshes(), 0);

        let lines = graph.helper(helper).unwrap().lines();
        assert!(lines.iter().all(|l| (l.start.x - 1.0).abs() <= 0.2 + 1e-5));
    }

    #[test]
    fn removing_a_helper_drops_its_pending_refresh() {
        let mut graph = SceneGraph::new();
        let light = graph.insert(Node::Light(Light::ambient(Color::WHITE, 0.5)));
        let helper = graph.insert(Node::Helper(LightHelper::new(light, HelperKind::Spot)));
        graph.schedule_refresh(helper);
        graph.remove(helper);
        assert_eq!(graph.pending_refreshes(), 0);
        assert_eq!(graph.apply_refreshes(), 0);
    }
}
