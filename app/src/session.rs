//! Scripted editing sessions driven by a simulated frame clock.
//!
//! A [`Session`] owns the dispatcher and feeds it one [`Step`] at a time.
//! The next step only starts once the previous one has settled and the
//! viewer's measurement actions have been processed, the way a user would
//! wait for an animation before clicking again.

use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::fmt;
use std::time::{Duration, Instant};

use linework_core::action::Action;
use linework_core::command::{CommandError, CommandStack, Settlement};
use linework_core::config::EngineConfig;
use linework_core::dispatcher::ActionDispatcher;
use linework_core::features::routing::find_handle;
use linework_core::features::{
    ElementMove, HandleMove, MoveAction, MoveRoutingHandleAction, RequestBoundsAction,
    SetModelAction, SwitchEditModeAction, register_default_commands,
};
use linework_core::math::{Bounds, Point, point};
use linework_core::model::{ElementId, GraphBuilder, HandleKind, ModelError, ModelRoot};

use crate::viewer::LoggingViewer;

pub const GRAPH_ID: &str = "graph";
pub const GRAPH_TYPE: &str = "graph";
pub const NODE_TYPE: &str = "node:circle";
pub const EDGE_TYPE: &str = "edge:straight";

/// Canvas the headless viewer pretends to render into.
pub const DEMO_CANVAS: Bounds = Bounds::new(0.0, 0.0, 1280.0, 720.0);

const RING_RADIUS: f64 = 250.0;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

fn canvas_center() -> Point {
    DEMO_CANVAS.center()
}

/// Builds a star graph: `node0` in the middle and `nodes` satellites on a
/// ring, each connected to the centre by a straight edge.
pub fn demo_graph(nodes: usize) -> Result<ModelRoot, ModelError> {
    let center = canvas_center();
    let mut builder = GraphBuilder::new(GRAPH_ID, GRAPH_TYPE).node("node0", NODE_TYPE, center);
    for i in 1..=nodes {
        let angle = TAU * (i - 1) as f64 / nodes as f64;
        let node = format!("node{i}");
        builder = builder
            .node(
                &node,
                NODE_TYPE,
                point(
                    center.x + RING_RADIUS * angle.cos(),
                    center.y + RING_RADIUS * angle.sin(),
                ),
            )
            .edge(&format!("edge{}", i - 1), EDGE_TYPE, "node0", &node);
    }
    builder.build()
}

/// Moves every node of a [`demo_graph`] onto a sunflower spiral.
pub fn scramble_nodes(nodes: usize) -> MoveAction {
    let center = canvas_center();
    let moves = (0..=nodes)
        .map(|i| {
            let angle = i as f64 * GOLDEN_ANGLE;
            let radius = 60.0 + 30.0 * (i % 7) as f64;
            ElementMove {
                element_id: ElementId::new(format!("node{i}")),
                to_position: point(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ),
            }
        })
        .collect();
    MoveAction::new(moves)
}

/// One scripted user interaction.
#[derive(Debug)]
pub enum Step {
    Dispatch(Box<dyn Action>),
    Undo,
    Redo,
    /// Drags the routing handle of `edge` addressed by kind and point index.
    DragHandle {
        edge: String,
        kind: HandleKind,
        index: i32,
        to: Point,
    },
}

impl Step {
    pub fn dispatch(action: impl Action) -> Self {
        Self::Dispatch(Box::new(action))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch(action) => write!(f, "dispatch `{}`", action.kind()),
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
            Self::DragHandle {
                edge,
                kind,
                index,
                to,
            } => write!(
                f,
                "drag {kind} handle {index} of {edge} to ({:.1}, {:.1})",
                to.x, to.y
            ),
        }
    }
}

/// The demo walk-through: load, measure, scramble, edit the route of
/// `edge0`, then step back and forth through the history.
pub fn demo_script(nodes: usize) -> Result<Vec<Step>, ModelError> {
    let graph = demo_graph(nodes)?;
    let center = canvas_center();
    Ok(vec![
        Step::dispatch(SetModelAction::new(graph)),
        Step::dispatch(RequestBoundsAction::default()),
        Step::dispatch(scramble_nodes(nodes)),
        Step::dispatch(SwitchEditModeAction::activate(["edge0"])),
        Step::DragHandle {
            edge: "edge0".to_owned(),
            kind: HandleKind::Line,
            index: -1,
            to: point(center.x + 120.0, center.y - 120.0),
        },
        Step::Undo,
        Step::Undo,
        Step::Redo,
    ])
}

/// Summary of a finished (or interrupted) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub frames: u64,
    pub steps_run: usize,
    pub failed_steps: usize,
    pub settled: usize,
    /// `false` when the frame limit stopped the session early.
    pub completed: bool,
    pub elements: usize,
    pub undo_count: usize,
    pub redo_count: usize,
    pub animation_frames: usize,
}

/// Runs a script against a fresh engine.
pub struct Session {
    dispatcher: ActionDispatcher<LoggingViewer>,
    script: VecDeque<Step>,
    frame_interval: Duration,
    pending: Vec<Settlement>,
    steps_run: usize,
    failed_steps: usize,
    settled: usize,
}

impl Session {
    pub fn new(
        config: &EngineConfig,
        canvas: Bounds,
        frame_interval: Duration,
        script: impl IntoIterator<Item = Step>,
    ) -> Self {
        let mut stack = CommandStack::with_config(
            ModelRoot::new(GRAPH_ID, GRAPH_TYPE),
            LoggingViewer::new(canvas),
            config,
        );
        register_default_commands(stack.registry_mut());
        let mut dispatcher = ActionDispatcher::new(stack);
        let inbox = dispatcher.inbox();
        dispatcher.stack_mut().viewer_mut().connect(inbox);

        Self {
            dispatcher,
            script: script.into_iter().collect(),
            frame_interval,
            pending: Vec::new(),
            steps_run: 0,
            failed_steps: 0,
            settled: 0,
        }
    }

    /// A session running [`demo_script`] on a graph with `nodes` satellites.
    pub fn demo(
        config: &EngineConfig,
        nodes: usize,
        frame_interval: Duration,
    ) -> Result<Self, ModelError> {
        Ok(Self::new(
            config,
            DEMO_CANVAS,
            frame_interval,
            demo_script(nodes)?,
        ))
    }

    pub fn dispatcher(&self) -> &ActionDispatcher<LoggingViewer> {
        &self.dispatcher
    }

    pub fn root(&self) -> &ModelRoot {
        self.dispatcher.root()
    }

    /// Runs frames until the script is exhausted and everything settled,
    /// or until `max_frames` frames have been rendered.
    pub fn run(&mut self, max_frames: Option<u64>) -> SessionReport {
        let inbox = self.dispatcher.inbox();
        let mut now = Instant::now();
        let mut frames = 0;

        let completed = loop {
            if let Some(max_frames) = max_frames
                && frames >= max_frames
            {
                log::info!("Reached max frames limit ({max_frames}), exiting");
                break false;
            }

            let busy = self.dispatcher.on_frame(now);
            frames += 1;
            now += self.frame_interval;
            self.collect_settled();

            if busy || !inbox.is_empty() {
                continue;
            }
            let Some(step) = self.script.pop_front() else {
                break true;
            };
            self.run_step(step);
        };
        self.collect_settled();

        let stack = self.dispatcher.stack();
        SessionReport {
            frames,
            steps_run: self.steps_run,
            failed_steps: self.failed_steps,
            settled: self.settled,
            completed,
            elements: stack.root().len(),
            undo_count: stack.undo_count(),
            redo_count: stack.redo_count(),
            animation_frames: stack.viewer().animation_frames(),
        }
    }

    fn run_step(&mut self, step: Step) {
        self.steps_run += 1;
        log::info!("Step {}: {step}", self.steps_run);
        match self.start(step) {
            Ok(settlement) => self.pending.push(settlement),
            Err(e) => {
                self.failed_steps += 1;
                log::error!("Step {} failed: {e}", self.steps_run);
            }
        }
    }

    fn start(&mut self, step: Step) -> Result<Settlement, CommandError> {
        match step {
            Step::Dispatch(action) => self.dispatcher.dispatch(action.as_ref()),
            Step::Undo => Ok(self.dispatcher.undo()),
            Step::Redo => Ok(self.dispatcher.redo()),
            Step::DragHandle {
                edge,
                kind,
                index,
                to,
            } => {
                let handle = find_handle(self.dispatcher.root(), &edge, kind, index).ok_or_else(
                    || CommandError::InvalidOperation(format!("no {kind} handle {index} on `{edge}`")),
                )?;
                self.dispatcher
                    .dispatch(&MoveRoutingHandleAction::new(vec![HandleMove::new(handle, to)]))
            }
        }
    }

    fn collect_settled(&mut self) {
        let before = self.pending.len();
        self.pending.retain_mut(|settlement| !settlement.is_settled());
        let settled = before - self.pending.len();
        if settled > 0 {
            log::debug!("{settled} call(s) settled");
        }
        self.settled += settled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linework_core::features::routing::has_routing_handles;
    use linework_core::math::almost_equals;

    const FRAME: Duration = Duration::from_millis(16);

    fn instant_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.animation.enabled = false;
        config
    }

    fn position(root: &ModelRoot, id: &str) -> Point {
        root.get(id).and_then(|e| e.position).unwrap()
    }

    #[test]
    fn demo_graph_is_a_star() {
        let root = demo_graph(4).unwrap();
        // root + centre + 4 satellites + 4 edges
        assert_eq!(root.len(), 10);
        let edge = root.get("edge3").unwrap();
        assert_eq!(edge.source.as_ref().unwrap().as_str(), "node0");
        assert_eq!(edge.target.as_ref().unwrap().as_str(), "node4");
        assert!(!root.canvas_bounds.is_valid_dimension());

        let node1 = position(&root, "node1");
        assert!(almost_equals(node1.x, 640.0 + RING_RADIUS));
        assert!(almost_equals(node1.y, 360.0));
    }

    #[test]
    fn scramble_targets_every_node() {
        let action = scramble_nodes(3);
        assert_eq!(action.moves.len(), 4);
        assert!(action.animate);
        assert_eq!(action.moves[0].element_id.as_str(), "node0");
    }

    #[test]
    fn demo_runs_to_completion_without_animation() {
        let mut session = Session::demo(&instant_config(), 3, FRAME).unwrap();
        let report = session.run(None);

        assert!(report.completed);
        assert_eq!(report.steps_run, 8);
        assert_eq!(report.failed_steps, 0);
        assert_eq!(report.settled, 8);
        assert_eq!(report.animation_frames, 0);
        // move + edit mode remain, the drag waits in redo
        assert_eq!(report.undo_count, 2);
        assert_eq!(report.redo_count, 1);
        // root + 4 nodes + 3 edges + one volatile handle on edge0
        assert_eq!(report.elements, 9);

        let root = session.root();
        assert!(root.canvas_bounds.almost_equals(&DEMO_CANVAS));
        assert!(has_routing_handles(root, "edge0"));
        assert_eq!(root.get("edge0").unwrap().routing_points.as_deref(), Some(&[][..]));
        for i in 0..=3 {
            let node = root.get(&format!("node{i}")).unwrap();
            assert!(!node.revalidate_bounds);
            assert!(node.bounds.unwrap().is_valid_dimension());
        }
        let target = &scramble_nodes(3).moves[2];
        let node2 = position(root, "node2");
        assert!(almost_equals(node2.x, target.to_position.x));
        assert!(almost_equals(node2.y, target.to_position.y));
    }

    #[test]
    fn animated_demo_reaches_the_same_model() {
        let mut instant = Session::demo(&instant_config(), 3, FRAME).unwrap();
        let instant_report = instant.run(None);
        let mut animated = Session::demo(&EngineConfig::default(), 3, FRAME).unwrap();
        let animated_report = animated.run(None);

        assert!(animated_report.completed);
        assert_eq!(animated_report.failed_steps, 0);
        assert!(animated_report.animation_frames > 0);
        assert!(animated_report.frames > instant_report.frames);
        assert_eq!(animated_report.elements, instant_report.elements);
        for i in 0..=3 {
            let id = format!("node{i}");
            let a = position(animated.root(), &id);
            let b = position(instant.root(), &id);
            assert!(almost_equals(a.x, b.x) && almost_equals(a.y, b.y));
        }
    }

    #[test]
    fn frame_limit_interrupts_the_session() {
        let mut session = Session::demo(&EngineConfig::default(), 3, FRAME).unwrap();
        let report = session.run(Some(3));
        assert!(!report.completed);
        assert_eq!(report.frames, 3);
        assert!(report.steps_run < 8);
    }

    #[test]
    fn failing_steps_are_counted_and_skipped() {
        let script = vec![
            Step::DragHandle {
                edge: "edge0".to_owned(),
                kind: HandleKind::Junction,
                index: 0,
                to: point(0.0, 0.0),
            },
            Step::dispatch(SetModelAction::new(demo_graph(1).unwrap())),
        ];
        let mut session = Session::new(&instant_config(), DEMO_CANVAS, FRAME, script);
        let report = session.run(None);
        assert!(report.completed);
        assert_eq!(report.steps_run, 2);
        assert_eq!(report.failed_steps, 1);
        assert_eq!(session.root().len(), 4);
    }

    #[test]
    fn step_display() {
        assert_eq!(Step::Undo.to_string(), "undo");
        assert_eq!(
            Step::dispatch(RequestBoundsAction::default()).to_string(),
            "dispatch `requestBounds`"
        );
        let drag = Step::DragHandle {
            edge: "edge0".to_owned(),
            kind: HandleKind::Line,
            index: -1,
            to: point(1.0, 2.5),
        };
        assert_eq!(drag.to_string(), "drag line handle -1 of edge0 to (1.0, 2.5)");
    }
}
