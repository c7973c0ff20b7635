//! Undo/redo command stack.
//!
//! [`CommandStack`] owns the model and manages a linear undo/redo history
//! of [`Command`] trait objects. Executing a new Normal command after
//! undoing clears the redo stack (standard editor behavior).

use std::collections::VecDeque;
use std::time::Instant;

use crate::action::Action;
use crate::animation::{AnimationScheduler, Tick};
use crate::config::EngineConfig;
use crate::model::ModelRoot;
use crate::viewer::{ModelViewer, NullViewer};

use super::{
    Command, CommandError, CommandKind, CommandOutcome, CommandRegistry, Settlement, Settler,
    pending,
};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

enum Operation {
    Execute(Box<dyn Command>),
    Undo,
    Redo,
}

/// Where a command goes once its effect has settled.
enum Completion {
    Record(Box<dyn Command>),
    Discard,
    ToRedo(Box<dyn Command>),
    ToUndo(Box<dyn Command>),
}

struct Queued {
    operation: Operation,
    settler: Settler,
}

struct InFlight {
    completion: Completion,
    settler: Settler,
}

/// Executes commands against the model it owns and keeps their history.
///
/// The undo stack is a bounded [`VecDeque`]: when it exceeds `max_undo`,
/// the oldest command is dropped from the front. The redo stack is an
/// unbounded [`Vec`] (it can never grow larger than the undo stack was).
///
/// Every call returns a [`Settlement`]. Calls made while an animation is in
/// flight are queued and run in submission order once it settles, so two
/// animations never write the same model concurrently. The host drives
/// both through [`on_frame`](Self::on_frame).
///
/// # Example
///
/// ```
/// use linework_core::command::CommandStack;
/// use linework_core::features::{MoveAction, register_default_commands};
/// use linework_core::math::point;
/// use linework_core::model::GraphBuilder;
///
/// let root = GraphBuilder::new("graph", "graph")
///     .node("n0", "node", point(0.0, 0.0))
///     .build()
///     .unwrap();
/// let mut stack = CommandStack::new(root);
/// register_default_commands(stack.registry_mut());
///
/// let action = MoveAction::single("n0", point(4.0, 2.0)).without_animation();
/// let mut settled = stack.execute(&action).unwrap();
/// assert_eq!(settled.peek().unwrap().get("n0").unwrap().position, Some(point(4.0, 2.0)));
///
/// stack.undo();
/// assert_eq!(stack.root().get("n0").unwrap().position, Some(point(0.0, 0.0)));
/// ```
pub struct CommandStack<V: ModelViewer = NullViewer> {
    root: ModelRoot,
    registry: CommandRegistry,
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    max_undo: usize,
    scheduler: AnimationScheduler,
    viewer: V,
    in_flight: Option<InFlight>,
    queue: VecDeque<Queued>,
}

impl CommandStack<NullViewer> {
    /// Creates a stack with an empty registry, no viewer and default timing.
    pub fn new(root: ModelRoot) -> Self {
        Self::with_viewer(root, NullViewer)
    }
}

impl<V: ModelViewer> CommandStack<V> {
    pub fn with_viewer(root: ModelRoot, viewer: V) -> Self {
        Self {
            root,
            registry: CommandRegistry::new(),
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: DEFAULT_MAX_UNDO,
            scheduler: AnimationScheduler::default(),
            viewer,
            in_flight: None,
            queue: VecDeque::new(),
        }
    }

    /// Creates a stack with timing and history limits taken from `config`.
    pub fn with_config(root: ModelRoot, viewer: V, config: &EngineConfig) -> Self {
        Self::with_viewer(root, viewer)
            .with_scheduler(AnimationScheduler::from_config(&config.animation))
            .with_max_undo(config.history.max_undo)
    }

    #[must_use]
    pub fn with_registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: AnimationScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn with_max_undo(mut self, max_undo: usize) -> Self {
        self.max_undo = max_undo;
        self
    }

    /// Builds the command registered for `action` and executes it.
    ///
    /// Resolution happens immediately, so an unknown kind is reported here
    /// and nothing is queued or mutated. Failures inside the command are
    /// logged and the returned settlement resolves to the unchanged model.
    pub fn execute(&mut self, action: &dyn Action) -> Result<Settlement, CommandError> {
        let command = self.registry.create(action)?;
        Ok(self.execute_command(command))
    }

    /// Executes an already constructed command.
    ///
    /// - **Normal** commands are pushed onto the undo stack once settled,
    ///   unless the top entry [merges](Command::merge) them. Either way the
    ///   redo stack is cleared.
    /// - **System** commands clear the redo stack and are never recorded.
    /// - **Hidden** commands run on a scratch copy of the model; the
    ///   settlement resolves to that copy and the viewer receives it via
    ///   [`update_hidden`](ModelViewer::update_hidden). The real model and
    ///   both stacks stay untouched.
    pub fn execute_command(&mut self, command: Box<dyn Command>) -> Settlement {
        self.submit(Operation::Execute(command))
    }

    /// Undoes the most recent command.
    ///
    /// With nothing to undo this is a no-op that still notifies the viewer
    /// and settles with the current model.
    pub fn undo(&mut self) -> Settlement {
        self.submit(Operation::Undo)
    }

    /// Redoes the most recently undone command. No-op if there is none.
    pub fn redo(&mut self) -> Settlement {
        self.submit(Operation::Redo)
    }

    /// Advances the running animation to `now` and, once it settles, runs
    /// queued calls. Returns `true` while work remains.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if self.in_flight.is_some() {
            match self.scheduler.tick(now, &mut self.root) {
                Tick::Running(_) => {
                    self.viewer.animation_frame(&self.root);
                    return true;
                }
                Tick::Finished | Tick::Idle => {
                    if let Some(in_flight) = self.in_flight.take() {
                        self.complete(in_flight.completion, in_flight.settler);
                    }
                }
            }
        }
        self.drain_queue();
        self.is_busy()
    }

    /// Jumps every running and queued call to its final state.
    pub fn settle_all(&mut self) {
        while self.is_busy() {
            if let Some(in_flight) = self.in_flight.take() {
                self.scheduler.finish(&mut self.root);
                self.complete(in_flight.completion, in_flight.settler);
            }
            self.drain_queue();
        }
    }

    /// Returns `true` while an animation is in flight or calls are queued.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || !self.queue.is_empty()
    }

    /// The current model. Mid-animation this is the interpolated state.
    pub fn root(&self) -> &ModelRoot {
        &self.root
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    /// Returns `true` if there are commands that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there are commands that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Returns an iterator over undo descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|c| c.description())
    }

    /// Returns an iterator over redo descriptions, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|c| c.description())
    }

    /// Clears both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn submit(&mut self, operation: Operation) -> Settlement {
        let (settler, settlement) = pending();
        if self.is_busy() {
            log::trace!("Stack busy, queueing call ({} waiting)", self.queue.len());
            self.queue.push_back(Queued { operation, settler });
        } else {
            self.run(operation, settler);
        }
        settlement
    }

    fn drain_queue(&mut self) {
        while self.in_flight.is_none() {
            let Some(queued) = self.queue.pop_front() else {
                break;
            };
            self.run(queued.operation, queued.settler);
        }
    }

    fn run(&mut self, operation: Operation, settler: Settler) {
        match operation {
            Operation::Execute(command) if command.kind() == CommandKind::Hidden => {
                self.run_hidden(command, settler);
            }
            Operation::Execute(mut command) => match command.execute(&mut self.root) {
                Ok(outcome) => {
                    let completion = if command.kind() == CommandKind::System {
                        self.redo_stack.clear();
                        Completion::Discard
                    } else {
                        Completion::Record(command)
                    };
                    self.proceed(outcome, completion, settler);
                }
                Err(err) => {
                    report(command.as_ref(), "execute", &err);
                    self.complete(Completion::Discard, settler);
                }
            },
            Operation::Undo => {
                let Some(mut command) = self.undo_stack.pop_back() else {
                    log::debug!("Nothing to undo");
                    self.complete(Completion::Discard, settler);
                    return;
                };
                match command.undo(&mut self.root) {
                    Ok(outcome) => self.proceed(outcome, Completion::ToRedo(command), settler),
                    Err(err) => {
                        report(command.as_ref(), "undo", &err);
                        self.undo_stack.push_back(command);
                        self.complete(Completion::Discard, settler);
                    }
                }
            }
            Operation::Redo => {
                let Some(mut command) = self.redo_stack.pop() else {
                    log::debug!("Nothing to redo");
                    self.complete(Completion::Discard, settler);
                    return;
                };
                match command.redo(&mut self.root) {
                    Ok(outcome) => self.proceed(outcome, Completion::ToUndo(command), settler),
                    Err(err) => {
                        report(command.as_ref(), "redo", &err);
                        self.redo_stack.push(command);
                        self.complete(Completion::Discard, settler);
                    }
                }
            }
        }
    }

    fn run_hidden(&mut self, mut command: Box<dyn Command>, settler: Settler) {
        let mut scratch = self.root.clone();
        match command.execute(&mut scratch) {
            Ok(CommandOutcome::Done) => {}
            Ok(CommandOutcome::Animate(animation)) => animation.tween(1.0, &mut scratch),
            Err(err) => {
                report(command.as_ref(), "execute", &err);
                settler.settle(self.root.clone());
                return;
            }
        }
        log::trace!("Hidden command `{}` finished", command.description());
        self.viewer.update_hidden(&scratch);
        settler.settle(scratch);
    }

    fn proceed(&mut self, outcome: CommandOutcome, completion: Completion, settler: Settler) {
        match outcome {
            CommandOutcome::Done => self.complete(completion, settler),
            CommandOutcome::Animate(animation) => {
                self.scheduler.drive(animation);
                if self.scheduler.is_instant() {
                    self.scheduler.finish(&mut self.root);
                    self.complete(completion, settler);
                } else {
                    self.in_flight = Some(InFlight {
                        completion,
                        settler,
                    });
                }
            }
        }
    }

    fn complete(&mut self, completion: Completion, settler: Settler) {
        match completion {
            Completion::Record(command) => self.record(command),
            Completion::Discard => {}
            Completion::ToRedo(command) => self.redo_stack.push(command),
            Completion::ToUndo(command) => self.push_undo(command),
        }
        self.viewer.update(&self.root);
        settler.settle(self.root.clone());
    }

    fn record(&mut self, mut command: Box<dyn Command>) {
        self.redo_stack.clear();
        if let Some(last) = self.undo_stack.back_mut() {
            match last.merge(command) {
                None => return,
                Some(returned) => command = returned,
            }
        }
        self.push_undo(command);
    }

    fn push_undo(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push_back(command);
        if self.undo_stack.len() > self.max_undo
            && let Some(evicted) = self.undo_stack.pop_front()
        {
            log::trace!("Undo limit reached, dropping `{}`", evicted.description());
        }
    }
}

fn report(command: &dyn Command, operation: &str, err: &CommandError) {
    match err {
        CommandError::InvalidOperation(_) => {
            log::error!("Cannot {operation} `{}`: {err}", command.description());
        }
        _ => log::warn!("Failed to {operation} `{}`: {err}", command.description()),
    }
}
