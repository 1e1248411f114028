//! Descriptor loading and scene binding.
//!
//! `stage` builds a complete scene for a descriptor file without touching
//! any existing wrapper state; the wrapper swaps the staged result in
//! only once the whole load has succeeded, so a failed reload never
//! leaves a half-built scene behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{Mat3, Quat, Vec3};

use rbvis_core::{
    LoadError, MeshSearchPaths, Model, ROOT_BODY, VisualDef, VisualDescriptor,
};

use crate::scene::{Material, Node, NodeId, Scene};
use crate::transform::Transform;

/// Baseline rotation applied to every mesh, composed before the
/// user-specified rotation.
const MESH_BASE_CORRECTION_DEG: f32 = 90.0;

/// Rotation aligning the model root with the renderer's up convention.
const ROOT_UP_CORRECTION_DEG: f32 = -90.0;

/// What to do when a visual frame names a segment missing from the joint
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedSegmentPolicy {
    /// Log a warning and skip the frame's visuals.
    #[default]
    Skip,
    /// Fail the whole load.
    Fail,
}

/// Loader behavior knobs.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directories searched for relative mesh references. The
    /// descriptor's own directory is always tried last.
    pub search_paths: MeshSearchPaths,
    pub unresolved_segments: UnresolvedSegmentPolicy,
}

/// Fully staged load result.
pub(crate) struct StagedModel {
    pub scene: Scene,
    pub model: Model,
    pub axis_transform: Mat3,
    pub root: NodeId,
    pub segment_nodes: HashMap<String, NodeId>,
}

pub(crate) fn stage(path: &Path, options: &LoadOptions) -> Result<StagedModel, LoadError> {
    if !path.is_file() {
        return Err(LoadError::InvalidFile(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Io(e.to_string()))?;

    // The descriptor is consumed twice: joint tree first, render metadata
    // second. Either failure aborts the load before any state changes.
    let model = Model::parse(&text)?;
    let descriptor = VisualDescriptor::parse(&text)?;

    let mut search = options.search_paths.clone();
    if let Some(parent) = path.parent() {
        search.push_dir(parent);
    }

    let axis_transform = descriptor.configuration.axis_transform();
    let q = vec![0.0_f32; model.dof_count()];

    let mut scene = Scene::new();
    let root = scene.add_node(Node::new().with_name("model"));
    let mut segment_nodes = HashMap::new();

    for frame in &descriptor.frames {
        let Some(body) = model.body_id(&frame.name) else {
            match options.unresolved_segments {
                UnresolvedSegmentPolicy::Skip => {
                    tracing::warn!(
                        segment = %frame.name,
                        "visual frame has no joint-tree entry, skipping"
                    );
                    continue;
                }
                UnresolvedSegmentPolicy::Fail => {
                    return Err(LoadError::UnresolvedSegment(frame.name.clone()));
                }
            }
        };

        let segment = scene.add_child(root, Node::new().with_name(frame.name.clone()));
        for visual in &frame.visuals {
            build_visual(&mut scene, segment, visual, axis_transform, &search);
        }

        // Initial pose at the zero configuration. Positions go through
        // the axis transform, orientations do not.
        let translation = axis_transform * model.position(&q, body, Vec3::ZERO);
        let rotation = model.orientation(&q, body);
        if let Some(node) = scene.get_mut(segment) {
            node.transform.translation = translation;
            node.transform.rotation = rotation;
        }

        segment_nodes.insert(frame.name.clone(), segment);
    }

    // Whole-model pose: a constant rotation fits the kinematic up axis to
    // the renderer's. The root position is written as-is, without the
    // axis transform.
    let (root_translation, root_rotation) = model.world_pose(&q, ROOT_BODY);
    let correction = Quat::from_axis_angle(Vec3::X, ROOT_UP_CORRECTION_DEG.to_radians());
    if let Some(node) = scene.get_mut(root) {
        node.transform.rotation = correction * root_rotation;
        node.transform.translation = root_translation;
    }

    tracing::debug!(
        file = %path.display(),
        segments = segment_nodes.len(),
        dofs = model.dof_count(),
        "bound model scene"
    );

    Ok(StagedModel {
        scene,
        model,
        axis_transform,
        root,
        segment_nodes,
    })
}

/// Build the per-visual node pair: scale and mesh centering live on the
/// visual node, rotation and the user translation on the mesh node below
/// it.
fn build_visual(
    scene: &mut Scene,
    segment: NodeId,
    visual: &VisualDef,
    axis: Mat3,
    search: &MeshSearchPaths,
) {
    let mesh_path = match search.resolve(&visual.src) {
        Some(path) => path,
        None => {
            tracing::warn!(src = %visual.src, "mesh not found on any search path");
            PathBuf::from(&visual.src)
        }
    };

    let scale = axis * visual.scale;
    let dimensions = axis * visual.dimensions;
    let translate = axis * visual.translate;
    let mesh_center = axis * visual.mesh_center;

    let visual_node = scene.add_child(
        segment,
        Node::new().with_transform(Transform {
            translation: mesh_center,
            rotation: Quat::IDENTITY,
            scale: dimensions * scale,
        }),
    );

    // The user rotation composes onto the baseline correction; reversing
    // this order changes the result.
    let mut rotation = Quat::from_axis_angle(Vec3::X, MESH_BASE_CORRECTION_DEG.to_radians());
    if let Some(rotate) = &visual.rotate {
        let user_axis = (axis * rotate.axis).normalize();
        rotation = Quat::from_axis_angle(user_axis, rotate.angle.to_radians()) * rotation;
    }

    scene.add_child(
        visual_node,
        Node::new()
            .with_transform(Transform::from_rotation_translation(rotation, translate))
            .with_mesh(mesh_path)
            .with_material(Material {
                ambient: [visual.color.x, visual.color.y, visual.color.z, 1.0],
            }),
    );
}
