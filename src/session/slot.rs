use crate::action::Reply;
use crate::interpreter::InterpretError;
use crate::session::CallId;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Single-slot result channel for one participant.
///
/// Holds at most one outstanding call. A result is handed over only to the
/// call whose id it carries.
#[derive(Debug, Default)]
pub(crate) struct ResultSlot {
    waiting: Mutex<Option<(CallId, oneshot::Sender<Reply>)>>,
}

impl ResultSlot {
    fn lock(&self) -> MutexGuard<'_, Option<(CallId, oneshot::Sender<Reply>)>> {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve the slot for `call`.
    ///
    /// Fails if another call is still waiting. A waiter whose caller has
    /// gone away no longer counts.
    pub(crate) fn register(&self, call: CallId) -> Result<oneshot::Receiver<Reply>, InterpretError> {
        let mut waiting = self.lock();
        if let Some((pending, sender)) = waiting.as_ref() {
            if !sender.is_closed() {
                return Err(InterpretError::RoutingContractViolation(format!(
                    "call {call} overlaps outstanding call {pending}"
                )));
            }
        }
        let (sender, receiver) = oneshot::channel();
        *waiting = Some((call, sender));
        Ok(receiver)
    }

    /// Hand `reply` to the waiting call. Gives the reply back if no call
    /// with that id is waiting.
    pub(crate) fn deliver(&self, call: CallId, reply: Reply) -> Result<(), Reply> {
        let mut waiting = self.lock();
        match waiting.take() {
            Some((pending, sender)) if pending == call => sender.send(reply),
            other => {
                *waiting = other;
                Err(reply)
            }
        }
    }

    pub(crate) fn cancel(&self, call: CallId) {
        let mut waiting = self.lock();
        if matches!(waiting.as_ref(), Some((pending, _)) if *pending == call) {
            waiting.take();
        }
    }

    /// Drop any waiter; it observes a disconnect.
    pub(crate) fn close(&self) {
        self.lock().take();
    }
}
