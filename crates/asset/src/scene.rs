//! Owned scene graph produced by the importer: nodes in an arena, addressed by index.

use std::path::PathBuf;

use crate::mesh::MeshData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: String,
    /// Indices into [`SceneGraph::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<NodeId>,
}

/// A texture reference as written in the material file, plus where it resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRef {
    pub raw: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Vec<TextureRef>,
    pub specular: Vec<TextureRef>,
    pub emission: Vec<TextureRef>,
    pub shininess: Option<f32>,
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<Material>,
}

impl SceneGraph {
    pub const ROOT: NodeId = NodeId(0);

    /// Graph holding only an empty root node.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![SceneNode {
                name: root_name.into(),
                ..SceneNode::default()
            }],
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn add_node(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            name: name.into(),
            ..SceneNode::default()
        });
        if let Some(p) = self.nodes.get_mut(parent.0 as usize) {
            p.children.push(id);
        }
        id
    }

    /// Store `mesh` and attach it to `node`. Returns the mesh index.
    pub fn add_mesh(&mut self, node: NodeId, mesh: MeshData) -> usize {
        let index = self.meshes.len();
        self.meshes.push(mesh);
        if let Some(n) = self.nodes.get_mut(node.0 as usize) {
            n.meshes.push(index);
        }
        index
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Mesh indices in depth-first order: a node's own meshes before its
    /// children, children in insertion order. Iterative, so deep files
    /// cannot exhaust the call stack.
    pub fn mesh_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.meshes.len());
        let mut stack = vec![Self::ROOT];

        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            order.extend_from_slice(&node.meshes);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    pub fn material_of(&self, mesh: usize) -> Option<&Material> {
        self.meshes
            .get(mesh)?
            .material
            .and_then(|m| self.materials.get(m))
    }
}
