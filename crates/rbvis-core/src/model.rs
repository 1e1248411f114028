//! Physics pass over a model descriptor: joint-tree parsing and the
//! in-memory model store.

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat3, Quat, Vec3};
use serde::Deserialize;

use crate::error::LoadError;

/// Identifier of a body within a [`Model`]. Body 0 is the base frame.
pub type BodyId = usize;

/// Identifier of the base frame every kinematic chain is rooted in.
pub const ROOT_BODY: BodyId = 0;

/// Name under which the base frame can be looked up.
pub const ROOT_NAME: &str = "ROOT";

#[derive(Debug, Clone, Deserialize)]
struct ModelDoc {
    #[serde(default)]
    frames: Vec<FrameDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct FrameDef {
    name: String,
    #[serde(default = "FrameDef::default_parent")]
    parent: String,
    #[serde(default)]
    joint_frame: JointFrameDef,
    /// One 6-component spatial vector per degree of freedom:
    /// `(wx, wy, wz, vx, vy, vz)`.
    #[serde(default)]
    joint: Vec<[f32; 6]>,
}

impl FrameDef {
    fn default_parent() -> String {
        ROOT_NAME.to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct JointFrameDef {
    #[serde(default)]
    r: Vec3,
    /// Row-major rotation matrix from the parent frame.
    #[serde(default = "JointFrameDef::identity")]
    e: [[f32; 3]; 3],
}

impl JointFrameDef {
    fn identity() -> [[f32; 3]; 3] {
        [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
    }
}

impl Default for JointFrameDef {
    fn default() -> Self {
        Self {
            r: Vec3::ZERO,
            e: Self::identity(),
        }
    }
}

/// A zero-dof frame, welded to a movable body with a constant offset.
#[derive(Debug, Clone)]
pub struct FixedFrame {
    pub name: String,
    /// Movable body this frame rides on.
    pub parent: BodyId,
    /// Offset from the parent's joint frame, with any intermediate fixed
    /// frames folded in.
    pub translation: Vec3,
    pub rotation: Quat,
}

/// One degree of freedom, decoded from a spatial vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dof {
    /// Rotation about a normalized axis.
    Revolute(Vec3),
    /// Translation along an axis.
    Prismatic(Vec3),
}

impl Dof {
    fn from_spatial(sv: [f32; 6]) -> Result<Self, LoadError> {
        let w = Vec3::new(sv[0], sv[1], sv[2]);
        let v = Vec3::new(sv[3], sv[4], sv[5]);
        if w.length_squared() > 0.0 {
            Ok(Dof::Revolute(w.normalize()))
        } else if v.length_squared() > 0.0 {
            Ok(Dof::Prismatic(v))
        } else {
            Err(LoadError::ParseFailure(
                "joint spatial vector is all zeros".to_string(),
            ))
        }
    }
}

/// A single body (segment) of the kinematic tree.
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    /// Parent body; always a lower id than this body's own.
    pub parent: BodyId,
    /// Fixed translation from the parent frame to this body's joint frame.
    pub frame_translation: Vec3,
    /// Fixed rotation from the parent frame to this body's joint frame.
    pub frame_rotation: Quat,
    /// Degrees of freedom, applied after the fixed transform in order.
    pub dofs: Vec<Dof>,
    /// Index of this body's first entry in the joint-configuration vector.
    pub q_offset: usize,
}

/// Parsed kinematic model: movable bodies in descriptor order plus a
/// segment-name index. Zero-dof frames fold their offset into the movable
/// parent at parse time but stay addressable; their ids sit past the
/// movable range. Rebuilt wholesale on every (re)load.
#[derive(Debug, Clone)]
pub struct Model {
    bodies: Vec<Body>,
    fixed: Vec<FixedFrame>,
    name_index: HashMap<String, BodyId>,
    dof_count: usize,
}

impl Model {
    /// Parse the joint tree from a descriptor file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoadError::InvalidFile(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::Io(e.to_string()))?;
        Self::parse(&text)
    }

    /// Parse the joint tree from descriptor text.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let doc: ModelDoc =
            ron::from_str(text).map_err(|e| LoadError::ParseFailure(e.to_string()))?;
        Self::from_doc(doc)
    }

    fn from_doc(doc: ModelDoc) -> Result<Self, LoadError> {
        let mut bodies = vec![Body {
            name: ROOT_NAME.to_string(),
            parent: ROOT_BODY,
            frame_translation: Vec3::ZERO,
            frame_rotation: Quat::IDENTITY,
            dofs: Vec::new(),
            q_offset: 0,
        }];
        let mut name_index = HashMap::from([(ROOT_NAME.to_string(), ROOT_BODY)]);
        // Zero-dof frames are fixed: their offset folds into the movable
        // parent, and they resolve to an id past the movable range.
        let mut fixed: Vec<FixedFrame> = Vec::new();
        let mut fixed_index: HashMap<String, usize> = HashMap::new();
        let mut dof_count = 0;

        for frame in doc.frames {
            if name_index.contains_key(&frame.name) || fixed_index.contains_key(&frame.name) {
                return Err(LoadError::ParseFailure(format!(
                    "duplicate frame name '{}'",
                    frame.name
                )));
            }

            // A frame's parent is either a movable body or a fixed frame
            // carrying an offset from its own movable ancestor.
            let (parent, offset_translation, offset_rotation) =
                if let Some(id) = name_index.get(&frame.parent) {
                    (*id, Vec3::ZERO, Quat::IDENTITY)
                } else if let Some(i) = fixed_index.get(&frame.parent) {
                    let fixed_parent = &fixed[*i];
                    (
                        fixed_parent.parent,
                        fixed_parent.translation,
                        fixed_parent.rotation,
                    )
                } else {
                    return Err(LoadError::ParseFailure(format!(
                        "frame '{}' references unknown parent '{}'",
                        frame.name, frame.parent
                    )));
                };

            let dofs = frame
                .joint
                .into_iter()
                .map(Dof::from_spatial)
                .collect::<Result<Vec<_>, _>>()?;

            // Descriptor stores the rotation row-major; glam wants columns.
            let rotation =
                Quat::from_mat3(&Mat3::from_cols_array_2d(&frame.joint_frame.e).transpose());
            let frame_translation =
                offset_translation + offset_rotation * frame.joint_frame.r;
            let frame_rotation = offset_rotation * rotation;

            if dofs.is_empty() {
                fixed_index.insert(frame.name.clone(), fixed.len());
                fixed.push(FixedFrame {
                    name: frame.name,
                    parent,
                    translation: frame_translation,
                    rotation: frame_rotation,
                });
                continue;
            }

            let id = bodies.len();
            name_index.insert(frame.name.clone(), id);
            let frame_dofs = dofs.len();
            bodies.push(Body {
                name: frame.name,
                parent,
                frame_translation,
                frame_rotation,
                dofs,
                q_offset: dof_count,
            });
            dof_count += frame_dofs;
        }

        // Fixed-frame ids start right after the movable bodies.
        for (i, frame) in fixed.iter().enumerate() {
            name_index.insert(frame.name.clone(), bodies.len() + i);
        }

        tracing::debug!(
            bodies = bodies.len() - 1,
            fixed = fixed.len(),
            dofs = dof_count,
            "parsed joint tree"
        );

        Ok(Self {
            bodies,
            fixed,
            name_index,
            dof_count,
        })
    }

    /// Total degrees of freedom of the model.
    pub fn dof_count(&self) -> usize {
        self.dof_count
    }

    /// Look up a body by segment name.
    pub fn body_id(&self, name: &str) -> Option<BodyId> {
        self.name_index.get(name).copied()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Whether an id refers to a fixed frame rather than a movable body.
    pub fn is_fixed(&self, id: BodyId) -> bool {
        self.fixed_frame(id).is_some()
    }

    /// The fixed frame behind an id, if it refers to one.
    pub fn fixed_frame(&self, id: BodyId) -> Option<&FixedFrame> {
        self.fixed.get(id.checked_sub(self.bodies.len())?)
    }

    /// All bodies, base frame included, in descriptor order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Segment names, movable bodies first and fixed frames after (base
    /// frame excluded).
    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.bodies
            .iter()
            .skip(1)
            .map(|b| b.name.as_str())
            .chain(self.fixed.iter().map(|f| f.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LINK: &str = r#"(
        frames: [
            (
                name: "torso",
                joint_frame: ( r: (0.0, 0.0, 1.0) ),
                joint: [ (0.0, 0.0, 1.0, 0.0, 0.0, 0.0) ],
            ),
            (
                name: "arm",
                parent: "torso",
                joint_frame: ( r: (1.0, 0.0, 0.0) ),
                joint: [
                    (0.0, 1.0, 0.0, 0.0, 0.0, 0.0),
                    (0.0, 0.0, 0.0, 1.0, 0.0, 0.0),
                ],
            ),
        ],
    )"#;

    #[test]
    fn parses_frames_and_counts_dofs() {
        let model = Model::parse(TWO_LINK).unwrap();
        assert_eq!(model.dof_count(), 3);
        assert_eq!(model.bodies().len(), 3);
        assert_eq!(model.segment_names().collect::<Vec<_>>(), ["torso", "arm"]);
    }

    #[test]
    fn name_index_resolves_segments_and_root() {
        let model = Model::parse(TWO_LINK).unwrap();
        assert_eq!(model.body_id(ROOT_NAME), Some(ROOT_BODY));
        assert_eq!(model.body_id("torso"), Some(1));
        assert_eq!(model.body_id("arm"), Some(2));
        assert_eq!(model.body_id("missing"), None);
    }

    #[test]
    fn q_offsets_follow_descriptor_order() {
        let model = Model::parse(TWO_LINK).unwrap();
        assert_eq!(model.body(1).unwrap().q_offset, 0);
        assert_eq!(model.body(2).unwrap().q_offset, 1);
        assert_eq!(model.body(2).unwrap().dofs.len(), 2);
    }

    #[test]
    fn spatial_vectors_decode_into_dofs() {
        let model = Model::parse(TWO_LINK).unwrap();
        assert_eq!(model.body(1).unwrap().dofs, [Dof::Revolute(Vec3::Z)]);
        assert_eq!(
            model.body(2).unwrap().dofs,
            [Dof::Revolute(Vec3::Y), Dof::Prismatic(Vec3::X)]
        );
    }

    #[test]
    fn fixed_frames_merge_into_their_parent() {
        let text = r#"(
            frames: [
                (
                    name: "torso",
                    joint_frame: ( r: (0.0, 0.0, 1.0) ),
                    joint: [ (0.0, 0.0, 1.0, 0.0, 0.0, 0.0) ],
                ),
                (
                    name: "head",
                    parent: "torso",
                    joint_frame: ( r: (0.0, 1.0, 0.0) ),
                ),
                (
                    name: "nod",
                    parent: "head",
                    joint_frame: ( r: (1.0, 0.0, 0.0) ),
                    joint: [ (1.0, 0.0, 0.0, 0.0, 0.0, 0.0) ],
                ),
            ],
        )"#;
        let model = Model::parse(text).unwrap();

        // The fixed frame contributes no dof but stays addressable.
        assert_eq!(model.dof_count(), 2);
        let head = model.body_id("head").unwrap();
        assert!(model.is_fixed(head));
        assert!(model.body(head).is_none());
        assert!(model.segment_names().any(|name| name == "head"));

        let frame = model.fixed_frame(head).unwrap();
        assert_eq!(frame.parent, model.body_id("torso").unwrap());
        assert_eq!(frame.translation, Vec3::new(0.0, 1.0, 0.0));

        // Its offset folds into the child's fixed transform.
        let nod = model.body(model.body_id("nod").unwrap()).unwrap();
        assert_eq!(nod.parent, model.body_id("torso").unwrap());
        assert_eq!(nod.frame_translation, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let text = r#"( frames: [ ( name: "a", parent: "nope" ) ] )"#;
        assert!(matches!(
            Model::parse(text),
            Err(LoadError::ParseFailure(_))
        ));
    }

    #[test]
    fn duplicate_frame_name_is_rejected() {
        let text = r#"( frames: [ ( name: "a" ), ( name: "a" ) ] )"#;
        assert!(matches!(
            Model::parse(text),
            Err(LoadError::ParseFailure(_))
        ));
    }

    #[test]
    fn zero_spatial_vector_is_rejected() {
        let text =
            r#"( frames: [ ( name: "a", joint: [ (0.0, 0.0, 0.0, 0.0, 0.0, 0.0) ] ) ] )"#;
        assert!(matches!(
            Model::parse(text),
            Err(LoadError::ParseFailure(_))
        ));
    }

    #[test]
    fn missing_file_is_invalid() {
        let result = Model::from_file("/definitely/not/here.ron");
        assert!(matches!(result, Err(LoadError::InvalidFile(_))));
    }

    #[test]
    fn directory_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let result = Model::from_file(dir.path());
        assert!(matches!(result, Err(LoadError::InvalidFile(_))));
    }
}
