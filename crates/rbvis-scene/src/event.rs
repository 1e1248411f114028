//! Notifications queued for the host UI.

use crate::scene::NodeId;

/// Event emitted by the wrapper and drained by the host once per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// A node was attached outside the initial bind pass.
    VisualAdded(NodeId),
    /// An extension was registered under the given name.
    ExtensionAdded(String),
}
