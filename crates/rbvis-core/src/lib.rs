//! rbvis Core Data Structures
//!
//! This crate contains the model-side half of the visualization pipeline:
//! - Descriptor: render-metadata view of a model file (axes, visuals)
//! - Model: parsed kinematic tree with a segment-name index
//! - Forward kinematics over a joint-configuration vector
//! - Mesh search-path resolution

pub mod descriptor;
pub mod error;
pub mod kinematics;
pub mod model;
pub mod search;

pub use descriptor::*;
pub use error::*;
pub use model::*;
pub use search::*;
