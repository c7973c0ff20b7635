//! Actions: declarative intent records.
//!
//! An [`Action`] says *what* should happen; the matching
//! [`Command`](crate::command::Command) says *how*. Actions are produced by
//! UI handlers, by the system (bounds measurement) and by remote model
//! sources, and are consumed exactly once when a command is built from them.
//!
//! - [`Action`] - object-safe intent trait keyed by a string kind
//! - [`ActionQueue`] - thread-safe inbox for actions arriving off the frame thread

mod queue;

use std::any::Any;
use std::fmt;

pub use queue::ActionQueue;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all sized `'static` types. Used to
/// recover the concrete action inside a command factory and the concrete
/// command inside [`Command::merge`](crate::command::Command::merge).
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An immutable intent value.
///
/// Implementors are plain data. The `kind` string selects the command
/// factory in the [`CommandRegistry`](crate::command::CommandRegistry) and
/// the translators and forwarding rules in the
/// [`ActionDispatcher`](crate::dispatcher::ActionDispatcher).
///
/// # Example
///
/// ```
/// use linework_core::action::Action;
///
/// #[derive(Debug, Clone)]
/// struct CenterAction {
///     element_ids: Vec<String>,
/// }
///
/// impl CenterAction {
///     const KIND: &'static str = "center";
/// }
///
/// impl Action for CenterAction {
///     fn kind(&self) -> &str {
///         Self::KIND
///     }
/// }
///
/// let action: Box<dyn Action> = Box::new(CenterAction { element_ids: vec![] });
/// assert_eq!(action.kind(), "center");
/// assert!(action.downcast_ref::<CenterAction>().is_some());
/// ```
pub trait Action: fmt::Debug + AsAny + Send {
    /// Discriminant used for command lookup.
    fn kind(&self) -> &str;
}

impl dyn Action {
    /// Downcasts to the concrete action type.
    pub fn downcast_ref<A: Action>(&self) -> Option<&A> {
        self.as_any().downcast_ref::<A>()
    }

    /// Returns `true` if the concrete type is `A`.
    pub fn is<A: Action>(&self) -> bool {
        self.as_any().is::<A>()
    }
}
