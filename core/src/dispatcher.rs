//! The dispatch boundary.
//!
//! [`ActionDispatcher`] is the single entry point the rest of an
//! application uses to change the model. Each action kind can be
//! forwarded to a remote collaborator, translated into another action, or
//! turned into a command, in that order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::action::{Action, ActionQueue};
use crate::command::{CommandError, CommandStack, Settlement};
use crate::model::ModelRoot;
use crate::viewer::{ModelViewer, NullViewer};

/// Translations may chain, but not further than this.
pub const MAX_TRANSLATION_DEPTH: usize = 8;

/// Receives actions that should also reach a remote model source.
pub trait RemoteSink: Send {
    fn forward(&mut self, action: &dyn Action);
}

impl<F> RemoteSink for F
where
    F: FnMut(&dyn Action) + Send,
{
    fn forward(&mut self, action: &dyn Action) {
        self(action)
    }
}

type Translator =
    Box<dyn Fn(&dyn Action) -> Result<Option<Box<dyn Action>>, CommandError> + Send>;
type ForwardFilter = Box<dyn Fn(&dyn Action) -> bool + Send>;

/// Routes actions to the remote sink, translators and the command stack.
pub struct ActionDispatcher<V: ModelViewer = NullViewer> {
    stack: CommandStack<V>,
    translators: HashMap<String, Translator>,
    server_kinds: HashSet<String>,
    forward_filter: Option<ForwardFilter>,
    remote: Option<Box<dyn RemoteSink>>,
    inbox: Arc<ActionQueue>,
}

impl<V: ModelViewer> ActionDispatcher<V> {
    pub fn new(stack: CommandStack<V>) -> Self {
        Self {
            stack,
            translators: HashMap::new(),
            server_kinds: HashSet::new(),
            forward_filter: None,
            remote: None,
            inbox: Arc::new(ActionQueue::new()),
        }
    }

    /// Dispatches `action` and returns the settlement of the resulting call.
    ///
    /// Fails only when nothing handles the kind, or a registered handler
    /// expects another action type. Actions that end up forwarded or
    /// swallowed by a translator, or cut off by the translation depth limit,
    /// settle immediately with the current model.
    pub fn dispatch(&mut self, action: &dyn Action) -> Result<Settlement, CommandError> {
        self.dispatch_at_depth(action, 0)
    }

    fn dispatch_at_depth(
        &mut self,
        action: &dyn Action,
        depth: usize,
    ) -> Result<Settlement, CommandError> {
        let kind = action.kind();
        log::trace!("Dispatching `{kind}`");
        let forwarded = self.forward(action);

        if let Some(translator) = self.translators.get(kind) {
            if depth >= MAX_TRANSLATION_DEPTH {
                log::error!(
                    "Translation of `{kind}` exceeded depth {MAX_TRANSLATION_DEPTH}, dropping it"
                );
                return Ok(Settlement::ready(self.stack.root().clone()));
            }
            return match translator(action)? {
                Some(translated) => self.dispatch_at_depth(translated.as_ref(), depth + 1),
                None => Ok(Settlement::ready(self.stack.root().clone())),
            };
        }

        if self.stack.registry().contains(kind) {
            return self.stack.execute(action);
        }
        if forwarded || self.server_kinds.contains(kind) {
            return Ok(Settlement::ready(self.stack.root().clone()));
        }
        Err(CommandError::UnregisteredActionKind(kind.to_owned()))
    }

    fn forward(&mut self, action: &dyn Action) -> bool {
        if !self.server_kinds.contains(action.kind()) {
            return false;
        }
        if let Some(filter) = &self.forward_filter
            && !filter(action)
        {
            return false;
        }
        let Some(remote) = self.remote.as_mut() else {
            log::debug!("No remote sink for `{}`", action.kind());
            return false;
        };
        remote.forward(action);
        true
    }

    /// Translates actions of `kind` into other actions. Returning `None`
    /// swallows the action.
    pub fn register_translator<A, B>(
        &mut self,
        kind: impl Into<String>,
        translate: impl Fn(&A) -> Option<B> + Send + 'static,
    ) where
        A: Action,
        B: Action,
    {
        let kind = kind.into();
        let expected = kind.clone();
        let translator: Translator = Box::new(move |action: &dyn Action| {
            let action = action
                .downcast_ref::<A>()
                .ok_or_else(|| CommandError::ActionMismatch {
                    kind: expected.clone(),
                })?;
            Ok(translate(action).map(|b| Box::new(b) as Box<dyn Action>))
        });
        self.translators.insert(kind, translator);
    }

    /// Marks `kind` as also handled by the remote model source.
    pub fn register_server_message(&mut self, kind: impl Into<String>) {
        self.server_kinds.insert(kind.into());
    }

    /// Only actions accepted by `filter` are forwarded.
    pub fn set_forward_filter(&mut self, filter: impl Fn(&dyn Action) -> bool + Send + 'static) {
        self.forward_filter = Some(Box::new(filter));
    }

    pub fn set_remote(&mut self, remote: impl RemoteSink + 'static) {
        self.remote = Some(Box::new(remote));
    }

    /// Shared inbox for actions produced off the frame thread.
    pub fn inbox(&self) -> Arc<ActionQueue> {
        Arc::clone(&self.inbox)
    }

    /// Runs one host frame: dispatches everything in the inbox, then
    /// advances the command stack. Returns `true` while work remains.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        for action in self.inbox.drain() {
            if let Err(err) = self.dispatch(action.as_ref()) {
                log::warn!("Dropping queued `{}`: {err}", action.kind());
            }
        }
        self.stack.on_frame(now)
    }

    pub fn undo(&mut self) -> Settlement {
        self.stack.undo()
    }

    pub fn redo(&mut self) -> Settlement {
        self.stack.redo()
    }

    pub fn root(&self) -> &ModelRoot {
        self.stack.root()
    }

    pub fn stack(&self) -> &CommandStack<V> {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut CommandStack<V> {
        &mut self.stack
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::features::{
        MoveAction, SetBoundsAction, SwitchEditModeAction, register_default_commands,
    };
    use crate::math::point;
    use crate::model::GraphBuilder;

    #[derive(Debug)]
    struct Select {
        id: String,
    }

    impl Action for Select {
        fn kind(&self) -> &str {
            "select"
        }
    }

    fn dispatcher() -> ActionDispatcher {
        let root = GraphBuilder::new("graph", "graph")
            .node("a", "node", point(0.0, 0.0))
            .node("b", "node", point(10.0, 0.0))
            .routed_edge("e0", "edge", "a", "b", vec![point(5.0, 5.0)])
            .build()
            .unwrap();
        let mut stack = CommandStack::new(root);
        register_default_commands(stack.registry_mut());
        ActionDispatcher::new(stack)
    }

    #[test]
    fn dispatches_to_commands() {
        let mut dispatcher = dispatcher();
        let action = MoveAction::single("a", point(1.0, 1.0)).without_animation();
        let mut settled = dispatcher.dispatch(&action).unwrap();
        assert!(settled.is_settled());
        assert_eq!(dispatcher.root().get("a").unwrap().position, Some(point(1.0, 1.0)));
        assert!(dispatcher.stack().can_undo());
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let mut dispatcher = dispatcher();
        let err = dispatcher
            .dispatch(&Select { id: "a".into() })
            .unwrap_err();
        assert_eq!(err, CommandError::UnregisteredActionKind("select".into()));
    }

    #[test]
    fn translators_chain_into_commands() {
        let mut dispatcher = dispatcher();
        dispatcher.register_translator("select", |select: &Select| {
            Some(SwitchEditModeAction::activate([select.id.as_str()]))
        });
        dispatcher
            .dispatch(&Select { id: "e0".into() })
            .unwrap();
        assert_eq!(
            dispatcher
                .root()
                .children_of("e0")
                .filter(|e| e.is_routing_handle())
                .count(),
            3
        );
    }

    #[test]
    fn translation_loops_are_cut() {
        let mut dispatcher = dispatcher();
        let before = dispatcher.root().clone();
        dispatcher.register_translator("select", |select: &Select| {
            Some(Select {
                id: select.id.clone(),
            })
        });
        let mut settled = dispatcher.dispatch(&Select { id: "a".into() }).unwrap();
        assert_eq!(settled.try_take(), Some(before.clone()));
        assert_eq!(dispatcher.root(), &before);
        assert!(!dispatcher.stack().can_undo());
    }

    #[test]
    fn server_messages_are_forwarded_through_the_filter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut dispatcher = dispatcher();
        dispatcher.set_remote(move |action: &dyn Action| {
            if let Some(select) = action.downcast_ref::<Select>() {
                sink.lock().unwrap().push(select.id.clone());
            }
        });
        dispatcher.register_server_message("select");
        dispatcher.set_forward_filter(|action| {
            action
                .downcast_ref::<Select>()
                .is_some_and(|select| select.id != "private")
        });

        let mut settled = dispatcher
            .dispatch(&Select { id: "a".into() })
            .unwrap();
        assert!(settled.is_settled());
        dispatcher
            .dispatch(&Select {
                id: "private".into(),
            })
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn inbox_is_drained_on_frame() {
        let mut dispatcher = dispatcher();
        let inbox = dispatcher.inbox();
        let handle = std::thread::spawn(move || {
            inbox.push(Box::new(SetBoundsAction::default()));
            inbox.push(Box::new(Select { id: "a".into() }));
        });
        handle.join().unwrap();
        assert!(!dispatcher.on_frame(Instant::now()));
        assert!(dispatcher.inbox().is_empty());
    }
}
