//! The rendering collaborator seen from the engine.

use crate::model::ModelRoot;

/// Receives settled models from the [`CommandStack`](crate::command::CommandStack).
///
/// Turning the tree into visible output is entirely the viewer's business.
pub trait ModelViewer {
    /// Model-changed notification, fired once per execute/undo/redo call
    /// after any animation it started has settled.
    fn update(&mut self, root: &ModelRoot);

    /// Receives the scratch model produced by a Hidden command, for
    /// off-screen work such as bounds measuring.
    fn update_hidden(&mut self, _root: &ModelRoot) {}

    /// Called on every frame an animation advances without finishing.
    fn animation_frame(&mut self, _root: &ModelRoot) {}
}

/// A viewer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullViewer;

impl ModelViewer for NullViewer {
    fn update(&mut self, _root: &ModelRoot) {}
}

/// A viewer that keeps copies of what it was shown. Handy in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingViewer {
    pub updates: Vec<ModelRoot>,
    pub hidden: Vec<ModelRoot>,
    pub animation_frames: usize,
}

impl ModelViewer for RecordingViewer {
    fn update(&mut self, root: &ModelRoot) {
        self.updates.push(root.clone());
    }

    fn update_hidden(&mut self, root: &ModelRoot) {
        self.hidden.push(root.clone());
    }

    fn animation_frame(&mut self, _root: &ModelRoot) {
        self.animation_frames += 1;
    }
}
