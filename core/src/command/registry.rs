//! Mapping from action kinds to command factories.

use std::collections::HashMap;
use std::fmt;

use crate::action::Action;

use super::{Command, CommandError};

type Factory = Box<dyn Fn(&dyn Action) -> Result<Box<dyn Command>, CommandError> + Send>;

/// Looks up the command factory for an action by its
/// [`kind`](Action::kind).
///
/// Factories are typed: `register::<A, C>` stores a closure that downcasts
/// the incoming action to `A` and builds a `C` from it. A registration for
/// a kind replaces any earlier one.
#[derive(Default)]
pub struct CommandRegistry {
    factories: HashMap<String, Factory>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ctor` as the factory for actions of `kind`.
    pub fn register<A, C>(
        &mut self,
        kind: impl Into<String>,
        ctor: impl Fn(&A) -> C + Send + 'static,
    ) where
        A: Action,
        C: Command,
    {
        let kind = kind.into();
        let expected = kind.clone();
        let factory: Factory = Box::new(move |action: &dyn Action| {
            let action = action
                .downcast_ref::<A>()
                .ok_or_else(|| CommandError::ActionMismatch {
                    kind: expected.clone(),
                })?;
            Ok(Box::new(ctor(action)) as Box<dyn Command>)
        });
        if self.factories.insert(kind.clone(), factory).is_some() {
            log::debug!("Replaced command factory for `{kind}`");
        }
    }

    /// Returns `true` if a factory is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Returns the factory registered for `kind`.
    pub fn lookup(
        &self,
        kind: &str,
    ) -> Option<&(dyn Fn(&dyn Action) -> Result<Box<dyn Command>, CommandError> + Send)> {
        self.factories.get(kind).map(|factory| factory.as_ref())
    }

    /// Builds the command for `action`.
    pub fn create(&self, action: &dyn Action) -> Result<Box<dyn Command>, CommandError> {
        let kind = action.kind();
        let factory = self
            .lookup(kind)
            .ok_or_else(|| CommandError::UnregisteredActionKind(kind.to_owned()))?;
        factory(action)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutcome, CommandResult};
    use crate::model::ModelRoot;

    #[derive(Debug)]
    struct Rename {
        to: String,
    }

    impl Action for Rename {
        fn kind(&self) -> &str {
            "rename"
        }
    }

    #[derive(Debug)]
    struct Other;

    impl Action for Other {
        fn kind(&self) -> &str {
            "rename"
        }
    }

    #[derive(Debug)]
    struct RenameCommand {
        to: String,
    }

    impl Command for RenameCommand {
        fn description(&self) -> &str {
            &self.to
        }

        fn execute(&mut self, _root: &mut ModelRoot) -> CommandResult {
            Ok(CommandOutcome::Done)
        }

        fn undo(&mut self, _root: &mut ModelRoot) -> CommandResult {
            Ok(CommandOutcome::Done)
        }

        fn redo(&mut self, _root: &mut ModelRoot) -> CommandResult {
            Ok(CommandOutcome::Done)
        }
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register("rename", |action: &Rename| RenameCommand {
            to: action.to.clone(),
        });
        registry
    }

    #[test]
    fn create_builds_registered_command() {
        let registry = registry();
        let command = registry
            .create(&Rename { to: "b".into() })
            .unwrap();
        assert_eq!(command.description(), "b");
        assert!(command.as_ref().downcast_ref::<RenameCommand>().is_some());
    }

    #[test]
    fn unknown_kind_is_reported() {
        #[derive(Debug)]
        struct Fly;
        impl Action for Fly {
            fn kind(&self) -> &str {
                "fly"
            }
        }
        let err = registry().create(&Fly).unwrap_err();
        assert_eq!(err, CommandError::UnregisteredActionKind("fly".into()));
    }

    #[test]
    fn mismatched_action_type_is_reported() {
        let err = registry().create(&Other).unwrap_err();
        assert_eq!(
            err,
            CommandError::ActionMismatch {
                kind: "rename".into()
            }
        );
    }

    #[test]
    fn kinds_are_sorted() {
        let mut registry = registry();
        registry.register("again", |action: &Rename| RenameCommand {
            to: action.to.clone(),
        });
        assert_eq!(registry.kinds(), vec!["again", "rename"]);
        assert!(registry.contains("again"));
        assert!(registry.lookup("nope").is_none());
    }
}
