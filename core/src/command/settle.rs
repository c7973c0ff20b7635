//! Deferred command results.
//!
//! Every `execute`, `undo` and `redo` call returns a [`Settlement`]. It
//! resolves to the model root once the call is durably applied, which for
//! animated commands is the frame on which the animation reaches `t = 1`.
//! The handle works with cooperative frame loops: it can be polled with a
//! no-op waker or checked with [`try_take`](Settlement::try_take).

use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc;
use std::task::{Context, Poll};

use crate::model::ModelRoot;

/// Handle to a model state that may not be settled yet.
///
/// # Example
///
/// ```
/// use linework_core::command::Settlement;
/// use linework_core::model::ModelRoot;
///
/// let mut settlement = Settlement::ready(ModelRoot::new("graph", "graph"));
/// assert!(settlement.is_settled());
/// let root = settlement.try_take().unwrap();
/// assert_eq!(root.id().as_str(), "graph");
/// ```
#[derive(Debug)]
pub struct Settlement {
    receiver: mpsc::Receiver<ModelRoot>,
    value: Option<ModelRoot>,
}

/// Sending half of a [`Settlement`], kept by whoever finishes the work.
#[derive(Debug)]
pub(crate) struct Settler {
    sender: mpsc::Sender<ModelRoot>,
}

impl Settler {
    /// Resolves the paired [`Settlement`]. A dropped settlement is fine:
    /// nobody is waiting.
    pub(crate) fn settle(self, root: ModelRoot) {
        let _ = self.sender.send(root);
    }
}

/// Creates an unresolved settlement and its sender.
pub(crate) fn pending() -> (Settler, Settlement) {
    let (sender, receiver) = mpsc::channel();
    (
        Settler { sender },
        Settlement {
            receiver,
            value: None,
        },
    )
}

impl Settlement {
    /// Creates a settlement that is already resolved.
    pub fn ready(root: ModelRoot) -> Self {
        let (settler, settlement) = pending();
        settler.settle(root);
        settlement
    }

    fn fill(&mut self) {
        if self.value.is_none()
            && let Ok(root) = self.receiver.try_recv()
        {
            self.value = Some(root);
        }
    }

    /// Returns `true` once the model is available.
    pub fn is_settled(&mut self) -> bool {
        self.fill();
        self.value.is_some()
    }

    /// Borrows the settled model without consuming it.
    pub fn peek(&mut self) -> Option<&ModelRoot> {
        self.fill();
        self.value.as_ref()
    }

    /// Takes the settled model. Subsequent calls return `None`.
    pub fn try_take(&mut self) -> Option<ModelRoot> {
        self.fill();
        self.value.take()
    }
}

impl Future for Settlement {
    type Output = Option<ModelRoot>;

    /// `Ready(Some(root))` once settled, `Ready(None)` if the producer was
    /// dropped first, `Pending` otherwise.
    ///
    /// Progress comes from the host calling `on_frame`, not from the waker.
    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<ModelRoot>> {
        if let Some(root) = self.value.take() {
            return Poll::Ready(Some(root));
        }
        match self.receiver.try_recv() {
            Ok(root) => Poll::Ready(Some(root)),
            Err(mpsc::TryRecvError::Empty) => Poll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => Poll::Ready(None),
        }
    }
}
