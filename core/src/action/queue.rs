//! Thread-safe inbox for actions produced outside the frame loop.
//!
//! [`ActionQueue`] uses interior mutability so that collaborators holding
//! only a shared reference (a remote connection task, a bounds-measuring
//! pass) can still enqueue actions. The
//! [`ActionDispatcher`](crate::dispatcher::ActionDispatcher) drains it at
//! the start of every frame.

use std::fmt;

use parking_lot::Mutex;

use super::Action;

/// A thread-safe queue of pending [`Action`]s.
///
/// [`push()`](Self::push) only requires `&self`, so the queue can be shared
/// behind an `Arc` with any number of producers.
pub struct ActionQueue {
    queue: Mutex<Vec<Box<dyn Action>>>,
}

impl ActionQueue {
    /// Creates a new empty action queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Enqueues an action.
    pub fn push(&self, action: Box<dyn Action>) {
        self.queue.lock().push(action);
    }

    /// Drains all queued actions, returning them in submission order.
    pub fn drain(&self) -> Vec<Box<dyn Action>> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Returns the number of pending actions.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns `true` if there are no queued actions.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionQueue")
            .field("pending", &self.len())
            .finish()
    }
}
