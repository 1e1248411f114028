//! Pluggable per-frame extensions (animation drivers, force overlays and
//! the like).

use rbvis_core::Model;

use crate::scene::{NodeId, Scene};

/// What an extension sees of its owning wrapper during `install` and
/// `update`. The wrapper itself stays in control of ownership; extensions
/// refer back to it through this context instead of a stored pointer.
pub struct ExtensionCx<'a> {
    pub model: &'a Model,
    pub scene: &'a mut Scene,
    /// Root node of the bound model's render subtree.
    pub render_root: NodeId,
}

/// A named object that is updated once per animation frame and may
/// contribute a visual subtree to the scene.
///
/// Registered extensions are owned by the wrapper. The update order
/// across extensions is unspecified and must not be relied upon.
pub trait Extension {
    /// Registry key; registering a second extension with the same name
    /// replaces the first.
    fn name(&self) -> &str;

    /// Build this extension's visual contribution, if any. Called once at
    /// registration; the returned node is attached under the render root.
    fn install(&mut self, _cx: &mut ExtensionCx<'_>) -> Option<NodeId> {
        None
    }

    /// Per-frame update tick.
    fn update(&mut self, current_time: f32, cx: &mut ExtensionCx<'_>);
}

pub(crate) struct ExtensionEntry {
    pub extension: Box<dyn Extension>,
    /// Root of the visual subtree this extension contributed, if any.
    /// Cleared on reload; the old subtree goes away with the old scene.
    pub visual: Option<NodeId>,
}
