//! Forward kinematics over a parsed [`Model`].
//!
//! Poses are accumulated root-to-body, the fixed joint-frame transform
//! first and then each degree of freedom in order. Configuration entries
//! beyond the end of `q` read as zero; callers enforcing the
//! length contract use [`Model::check_configuration`].

use glam::{Quat, Vec3};

use crate::error::KinematicsError;
use crate::model::{BodyId, Dof, Model, ROOT_BODY};

impl Model {
    /// Verify a joint-configuration vector matches the model's
    /// degree-of-freedom count.
    pub fn check_configuration(&self, q: &[f32]) -> Result<(), KinematicsError> {
        if q.len() != self.dof_count() {
            return Err(KinematicsError::DofMismatch {
                expected: self.dof_count(),
                got: q.len(),
            });
        }
        Ok(())
    }

    /// World-frame translation and orientation of a body or fixed frame.
    pub fn world_pose(&self, q: &[f32], body: BodyId) -> (Vec3, Quat) {
        // A fixed frame rides on its movable parent at a constant offset.
        if let Some(fixed) = self.fixed_frame(body) {
            let (translation, rotation) = self.world_pose(q, fixed.parent);
            return (
                translation + rotation * fixed.translation,
                rotation * fixed.rotation,
            );
        }

        // Chain from the body up to the base, then applied in reverse.
        let mut chain = Vec::new();
        let mut current = body;
        while current != ROOT_BODY {
            chain.push(current);
            current = self.body(current).map(|b| b.parent).unwrap_or(ROOT_BODY);
        }

        let mut translation = Vec3::ZERO;
        let mut rotation = Quat::IDENTITY;
        for id in chain.into_iter().rev() {
            let Some(b) = self.body(id) else { continue };
            translation += rotation * b.frame_translation;
            rotation *= b.frame_rotation;
            for (i, dof) in b.dofs.iter().enumerate() {
                let value = q.get(b.q_offset + i).copied().unwrap_or(0.0);
                match dof {
                    Dof::Revolute(axis) => {
                        rotation *= Quat::from_axis_angle(*axis, value);
                    }
                    Dof::Prismatic(axis) => {
                        translation += rotation * (*axis * value);
                    }
                }
            }
        }
        (translation, rotation)
    }

    /// World coordinates of a point given in the body's local frame.
    pub fn position(&self, q: &[f32], body: BodyId, local: Vec3) -> Vec3 {
        let (translation, rotation) = self.world_pose(q, body);
        translation + rotation * local
    }

    /// World-frame orientation of a body.
    pub fn orientation(&self, q: &[f32], body: BodyId) -> Quat {
        self.world_pose(q, body).1
    }
}
