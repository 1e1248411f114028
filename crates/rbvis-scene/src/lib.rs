//! rbvis Scene Binding
//!
//! Binds parsed rigid-body models to a retained scene graph and keeps
//! the two in sync:
//! - Scene: flat node arena with transform/mesh/material components
//! - ModelWrapper: loader, scene binder and kinematics updater
//! - Extension: named per-frame plug-ins contributing behavior or visuals

pub mod binder;
pub mod event;
pub mod extension;
pub mod scene;
pub mod transform;
pub mod wrapper;

pub use binder::{LoadOptions, UnresolvedSegmentPolicy};
pub use event::SceneEvent;
pub use extension::{Extension, ExtensionCx};
pub use scene::*;
pub use transform::Transform;
pub use wrapper::ModelWrapper;
