//! Scene node definition.

use std::path::PathBuf;

use uuid::Uuid;

use crate::transform::Transform;

/// Identifier of a node within a [`Scene`](super::Scene).
pub type NodeId = Uuid;

/// Reference to a mesh file. Decoding the file is left to the host
/// renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSource {
    pub path: PathBuf,
}

/// Phong-style material parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient color, RGBA.
    pub ambient: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// A node in the retained scene graph: a local transform plus optional
/// mesh and material components.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<MeshSource>,
    pub material: Option<Material>,
    pub visible: bool,
}

impl Node {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            transform: Transform::IDENTITY,
            mesh: None,
            material: None,
            visible: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, path: impl Into<PathBuf>) -> Self {
        self.mesh = Some(MeshSource { path: path.into() });
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
