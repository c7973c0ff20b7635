//! A headless viewer that stands in for the rendering side.
//!
//! It never draws anything. Instead it logs model updates and answers the
//! engine's measuring requests the way a renderer would: canvas size after
//! the first update, element bounds after a hidden pass.

use std::sync::Arc;

use linework_core::action::{Action, ActionQueue};
use linework_core::features::{CanvasBoundsInitializer, ElementAndBounds, SetBoundsAction};
use linework_core::math::{Bounds, Dimension};
use linework_core::model::ModelRoot;
use linework_core::viewer::ModelViewer;

/// Size reported for every measured element.
pub const ELEMENT_SIZE: Dimension = Dimension {
    width: 40.0,
    height: 40.0,
};

/// Logs what it is shown and posts measurements back to the engine.
#[derive(Debug)]
pub struct LoggingViewer {
    canvas: Bounds,
    initializer: CanvasBoundsInitializer,
    outbox: Option<Arc<ActionQueue>>,
    updates: usize,
    hidden_passes: usize,
    animation_frames: usize,
}

impl LoggingViewer {
    /// Creates a viewer that measures a canvas of `canvas` bounds.
    pub fn new(canvas: Bounds) -> Self {
        Self {
            canvas,
            initializer: CanvasBoundsInitializer,
            outbox: None,
            updates: 0,
            hidden_passes: 0,
            animation_frames: 0,
        }
    }

    /// Sends measurement actions to `outbox` from now on.
    pub fn connect(&mut self, outbox: Arc<ActionQueue>) {
        self.outbox = Some(outbox);
    }

    pub fn canvas(&self) -> Bounds {
        self.canvas
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn hidden_passes(&self) -> usize {
        self.hidden_passes
    }

    pub fn animation_frames(&self) -> usize {
        self.animation_frames
    }

    fn post(&self, action: impl Action) {
        match &self.outbox {
            Some(outbox) => outbox.push(Box::new(action)),
            None => log::debug!("Viewer not connected, dropping `{}`", action.kind()),
        }
    }
}

impl ModelViewer for LoggingViewer {
    fn update(&mut self, root: &ModelRoot) {
        self.updates += 1;
        log::debug!(
            "Model update #{}: {} elements, canvas {:?}",
            self.updates,
            root.len(),
            root.canvas_bounds
        );
        if let Some(action) = self.initializer.check(root, self.canvas) {
            log::info!("Reporting canvas bounds {:?}", action.new_canvas_bounds);
            self.post(action);
        }
    }

    fn update_hidden(&mut self, root: &ModelRoot) {
        self.hidden_passes += 1;
        let bounds: Vec<ElementAndBounds> = root
            .iter()
            .filter(|element| element.is_bounds_aware() && element.revalidate_bounds)
            .filter_map(|element| {
                let position = element.position?;
                Some(ElementAndBounds {
                    element_id: element.id.clone(),
                    new_bounds: Bounds::new(
                        position.x,
                        position.y,
                        ELEMENT_SIZE.width,
                        ELEMENT_SIZE.height,
                    ),
                })
            })
            .collect();
        log::debug!("Hidden pass measured {} elements", bounds.len());
        if !bounds.is_empty() {
            self.post(SetBoundsAction::new(bounds));
        }
    }

    fn animation_frame(&mut self, root: &ModelRoot) {
        self.animation_frames += 1;
        log::trace!("Animation frame {} ({} elements)", self.animation_frames, root.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linework_core::features::InitializeCanvasBoundsAction;
    use linework_core::math::point;
    use linework_core::model::GraphBuilder;

    const CANVAS: Bounds = Bounds::new(0.0, 0.0, 1280.0, 720.0);

    fn connected() -> (LoggingViewer, Arc<ActionQueue>) {
        let outbox = Arc::new(ActionQueue::new());
        let mut viewer = LoggingViewer::new(CANVAS);
        viewer.connect(Arc::clone(&outbox));
        (viewer, outbox)
    }

    #[test]
    fn unmeasured_canvas_is_reported_once() {
        let (mut viewer, outbox) = connected();
        let mut root = ModelRoot::new("graph", "graph");
        viewer.update(&root);
        let posted = outbox.drain();
        assert_eq!(posted.len(), 1);
        let action = posted[0]
            .as_ref()
            .downcast_ref::<InitializeCanvasBoundsAction>()
            .unwrap();
        assert_eq!(action.new_canvas_bounds, CANVAS);

        root.canvas_bounds = CANVAS;
        viewer.update(&root);
        assert!(outbox.is_empty());
        assert_eq!(viewer.updates(), 2);
    }

    #[test]
    fn hidden_pass_measures_stale_nodes() {
        let (mut viewer, outbox) = connected();
        let root = GraphBuilder::new("graph", "graph")
            .node("n0", "node", point(10.0, 20.0))
            .node("n1", "node", point(30.0, 40.0))
            .edge("e0", "edge", "n0", "n1")
            .build()
            .unwrap();
        viewer.update_hidden(&root);

        let posted = outbox.drain();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].kind(), SetBoundsAction::KIND);
        let action = posted[0].as_ref().downcast_ref::<SetBoundsAction>().unwrap();
        assert_eq!(action.bounds.len(), 2);
        let n0 = action
            .bounds
            .iter()
            .find(|entry| entry.element_id.as_str() == "n0")
            .unwrap();
        assert_eq!(n0.new_bounds, Bounds::new(10.0, 20.0, 40.0, 40.0));
    }

    #[test]
    fn nothing_to_measure_posts_nothing() {
        let (mut viewer, outbox) = connected();
        viewer.update_hidden(&ModelRoot::new("graph", "graph"));
        assert!(outbox.is_empty());
        assert_eq!(viewer.hidden_passes(), 1);
    }

    #[test]
    fn disconnected_viewer_drops_measurements() {
        let mut viewer = LoggingViewer::new(CANVAS);
        viewer.update(&ModelRoot::new("graph", "graph"));
        assert_eq!(viewer.updates(), 1);
    }
}
