//! Render-metadata pass over a model descriptor file.
//!
//! A descriptor is a RON document consumed twice: once for the joint tree
//! (see [`crate::model`]) and once here for everything the renderer needs,
//! the coordinate-axis convention and per-segment visual lists. Fields the
//! other pass cares about are ignored.

use glam::{Mat3, Vec3};
use serde::Deserialize;

use crate::error::LoadError;

/// Renderer-facing view of a model descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisualDescriptor {
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub frames: Vec<VisualFrame>,
}

impl VisualDescriptor {
    /// Parse the visual pass from descriptor text.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        ron::from_str(text).map_err(|e| LoadError::ParseFailure(e.to_string()))
    }
}

/// The `configuration` section: which way the model file considers
/// front, up and right.
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    #[serde(default = "Configuration::default_front")]
    pub axis_front: Vec3,
    #[serde(default = "Configuration::default_up")]
    pub axis_up: Vec3,
    #[serde(default = "Configuration::default_right")]
    pub axis_right: Vec3,
}

impl Configuration {
    fn default_front() -> Vec3 {
        Vec3::X
    }

    fn default_up() -> Vec3 {
        Vec3::Y
    }

    fn default_right() -> Vec3 {
        Vec3::Z
    }

    /// Change-of-basis matrix applied to every position, scale and
    /// rotation-axis value read from the descriptor. Columns are
    /// (front, right, up). The axes are taken as-is; degenerate vectors
    /// produce a skewed or singular transform.
    pub fn axis_transform(&self) -> Mat3 {
        Mat3::from_cols(self.axis_front, self.axis_right, self.axis_up)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            axis_front: Self::default_front(),
            axis_up: Self::default_up(),
            axis_right: Self::default_right(),
        }
    }
}

/// Per-segment entry of the `frames` array, reduced to what rendering
/// needs.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualFrame {
    pub name: String,
    #[serde(default)]
    pub visuals: Vec<VisualDef>,
}

/// One renderable shape attached to a segment.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualDef {
    /// Mesh file reference, resolved through the search path at load time.
    pub src: String,
    #[serde(default = "VisualDef::default_color")]
    pub color: Vec3,
    #[serde(default = "VisualDef::default_one")]
    pub scale: Vec3,
    #[serde(default = "VisualDef::default_one")]
    pub dimensions: Vec3,
    #[serde(default)]
    pub translate: Vec3,
    #[serde(default)]
    pub mesh_center: Vec3,
    #[serde(default)]
    pub rotate: Option<RotateDef>,
}

impl VisualDef {
    fn default_color() -> Vec3 {
        Vec3::ONE
    }

    fn default_one() -> Vec3 {
        Vec3::ONE
    }
}

/// Optional extra rotation of a visual, axis-angle in degrees.
#[derive(Debug, Clone, Deserialize)]
pub struct RotateDef {
    #[serde(default)]
    pub angle: f32,
    #[serde(default = "RotateDef::default_axis")]
    pub axis: Vec3,
}

impl RotateDef {
    fn default_axis() -> Vec3 {
        Vec3::X
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_identity_axes() {
        let descriptor = VisualDescriptor::parse("()").unwrap();
        assert!(descriptor.frames.is_empty());
        assert_eq!(descriptor.configuration.axis_front, Vec3::X);
        assert_eq!(descriptor.configuration.axis_up, Vec3::Y);
        assert_eq!(descriptor.configuration.axis_right, Vec3::Z);
        assert_eq!(descriptor.configuration.axis_transform(), Mat3::IDENTITY);
    }

    #[test]
    fn identity_axes_pass_values_through() {
        let axis = Configuration::default().axis_transform();
        let v = Vec3::new(0.5, -2.0, 3.0);
        assert_eq!(axis * v, v);
    }

    #[test]
    fn axis_transform_columns_follow_configuration() {
        let configuration = Configuration {
            axis_front: Vec3::Y,
            axis_up: Vec3::Z,
            axis_right: Vec3::X,
        };
        let axis = configuration.axis_transform();
        // Front is the first column, right the second, up the third.
        assert_eq!(axis * Vec3::X, Vec3::Y);
        assert_eq!(axis * Vec3::Y, Vec3::X);
        assert_eq!(axis * Vec3::Z, Vec3::Z);
    }

    #[test]
    fn visual_defaults() {
        let text = r#"(
            frames: [
                ( name: "torso", visuals: [ ( src: "box.obj" ) ] ),
            ],
        )"#;
        let descriptor = VisualDescriptor::parse(text).unwrap();
        let visual = &descriptor.frames[0].visuals[0];
        assert_eq!(visual.src, "box.obj");
        assert_eq!(visual.color, Vec3::ONE);
        assert_eq!(visual.scale, Vec3::ONE);
        assert_eq!(visual.dimensions, Vec3::ONE);
        assert_eq!(visual.translate, Vec3::ZERO);
        assert_eq!(visual.mesh_center, Vec3::ZERO);
        assert!(visual.rotate.is_none());
    }

    #[test]
    fn rotate_defaults_to_primary_axis() {
        let text = r#"(
            frames: [
                ( name: "arm", visuals: [ ( src: "arm.obj", rotate: Some(( angle: 45.0 )) ) ] ),
            ],
        )"#;
        let descriptor = VisualDescriptor::parse(text).unwrap();
        let rotate = descriptor.frames[0].visuals[0].rotate.as_ref().unwrap();
        assert_eq!(rotate.angle, 45.0);
        assert_eq!(rotate.axis, Vec3::X);
    }

    #[test]
    fn malformed_document_is_a_parse_failure() {
        let result = VisualDescriptor::parse("( frames: 5 )");
        assert!(matches!(result, Err(LoadError::ParseFailure(_))));
    }
}
