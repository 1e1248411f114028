//! The model wrapper: owns the parsed model, the scene graph rendering
//! it, and the registered extensions.
//!
//! Everything runs synchronously on the thread owning the scene graph;
//! an external frame source drives `update_kinematics` and `tick`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Mat3;

use rbvis_core::{KinematicsError, LoadError, Model};

use crate::binder::{self, LoadOptions};
use crate::event::SceneEvent;
use crate::extension::{Extension, ExtensionCx, ExtensionEntry};
use crate::scene::{Node, NodeId, Scene};
use crate::transform::Transform;

/// A loaded rigid-body model bound to a renderable scene.
pub struct ModelWrapper {
    model_file: PathBuf,
    options: LoadOptions,
    scene: Scene,
    model: Model,
    axis_transform: Mat3,
    root: NodeId,
    segment_nodes: HashMap<String, NodeId>,
    extensions: HashMap<String, ExtensionEntry>,
    events: Vec<SceneEvent>,
}

impl ModelWrapper {
    /// Load a model descriptor and bind its render scene.
    pub fn load_from_file(
        path: impl Into<PathBuf>,
        options: LoadOptions,
    ) -> Result<Self, LoadError> {
        let model_file = path.into();
        let staged = binder::stage(&model_file, &options)?;
        tracing::info!(file = %model_file.display(), "loaded model");
        Ok(Self {
            model_file,
            options,
            scene: staged.scene,
            model: staged.model,
            axis_transform: staged.axis_transform,
            root: staged.root,
            segment_nodes: staged.segment_nodes,
            extensions: HashMap::new(),
            events: Vec::new(),
        })
    }

    /// Re-read the descriptor from disk. The load is staged: on failure
    /// the current model and scene stay untouched.
    ///
    /// Extensions stay registered, but any visual they contributed lived
    /// in the replaced scene and is gone; they must rebuild it themselves.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        let staged = binder::stage(&self.model_file, &self.options)?;
        self.scene = staged.scene;
        self.model = staged.model;
        self.axis_transform = staged.axis_transform;
        self.root = staged.root;
        self.segment_nodes = staged.segment_nodes;
        for entry in self.extensions.values_mut() {
            entry.visual = None;
        }
        tracing::info!(file = %self.model_file.display(), "reloaded model");
        Ok(())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Degree-of-freedom count of the loaded model.
    pub fn dof_count(&self) -> usize {
        self.model.dof_count()
    }

    /// Full path of the descriptor file.
    pub fn model_file(&self) -> &Path {
        &self.model_file
    }

    /// Base name of the descriptor file, without directory or extension.
    pub fn file_name(&self) -> Option<&str> {
        self.model_file.file_stem().and_then(|s| s.to_str())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Root node of the model's render subtree.
    pub fn render_root(&self) -> NodeId {
        self.root
    }

    /// Change-of-basis matrix built from the descriptor's axis
    /// configuration.
    pub fn axis_transform(&self) -> Mat3 {
        self.axis_transform
    }

    /// Render node of a named segment.
    pub fn segment_node(&self, name: &str) -> Option<NodeId> {
        self.segment_nodes.get(name).copied()
    }

    /// Current pose transform of a named segment.
    pub fn segment_transform(&self, name: &str) -> Option<&Transform> {
        self.segment_nodes
            .get(name)
            .and_then(|id| self.scene.get(*id))
            .map(|node| &node.transform)
    }

    /// Names of all bound segments (unordered).
    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.segment_nodes.keys().map(String::as_str)
    }

    /// Recompute every bound segment's world pose for the given joint
    /// configuration and write it into the segment's transform.
    ///
    /// World-frame values are written back directly; the axis transform
    /// only applies to the initial bind. Repeated calls with the same
    /// configuration leave the transforms bit-identical.
    pub fn update_kinematics(&mut self, q: &[f32]) -> Result<(), KinematicsError> {
        self.model.check_configuration(q)?;
        for (name, node_id) in &self.segment_nodes {
            let Some(body) = self.model.body_id(name) else {
                continue;
            };
            let (translation, rotation) = self.model.world_pose(q, body);
            if let Some(node) = self.scene.get_mut(*node_id) {
                node.transform.translation = translation;
                node.transform.rotation = rotation;
            }
        }
        Ok(())
    }

    /// Attach an externally built node under the named segment. Unknown
    /// segment names are a silent no-op, mirroring the lenient attachment
    /// policy (load errors, by contrast, are fatal).
    pub fn add_visual(&mut self, segment_name: &str, node: Node) -> Option<NodeId> {
        let parent = *self.segment_nodes.get(segment_name)?;
        let id = self.scene.add_child(parent, node);
        self.events.push(SceneEvent::VisualAdded(id));
        Some(id)
    }

    /// Register an extension, replacing any previous entry with the same
    /// name (the replaced entry's visual subtree is removed as well).
    pub fn add_extension(&mut self, mut extension: Box<dyn Extension>) {
        let name = extension.name().to_string();

        let installed = {
            let mut cx = ExtensionCx {
                model: &self.model,
                scene: &mut self.scene,
                render_root: self.root,
            };
            extension.install(&mut cx)
        };

        if let Some(previous) = self.extensions.remove(&name)
            && let Some(old_visual) = previous.visual
        {
            self.scene.remove_subtree(old_visual);
        }

        let visual = match installed {
            Some(id) => match self.scene.attach(self.root, id) {
                Ok(()) => {
                    self.events.push(SceneEvent::VisualAdded(id));
                    Some(id)
                }
                Err(err) => {
                    tracing::warn!(extension = %name, %err, "discarding extension visual");
                    None
                }
            },
            None => None,
        };

        self.extensions
            .insert(name.clone(), ExtensionEntry { extension, visual });
        self.events.push(SceneEvent::ExtensionAdded(name));
    }

    /// Remove the named extension and its visual subtree. No-op when the
    /// name is not registered.
    pub fn remove_extension(&mut self, name: &str) {
        if let Some(entry) = self.extensions.remove(name)
            && let Some(visual) = entry.visual
        {
            self.scene.remove_subtree(visual);
        }
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Per-frame tick: update every registered extension. Iteration order
    /// across extensions is unspecified.
    pub fn tick(&mut self, current_time: f32) {
        let mut cx = ExtensionCx {
            model: &self.model,
            scene: &mut self.scene,
            render_root: self.root,
        };
        for entry in self.extensions.values_mut() {
            entry.extension.update(current_time, &mut cx);
        }
    }

    /// Drain queued notifications for the host UI.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}
