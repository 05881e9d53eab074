use crate::action::{FromReply, Reply, Request};
use crate::game::PlayerId;
use crate::interpreter::InterpretError;
use crate::session::slot::ResultSlot;
use crate::session::{execute_delegated, settle, CallId, Command, Executor, Link, Origin, SessionError};
use futures::future::select_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

/// The server's half of a session: one outbound channel and one result
/// slot per participant.
#[derive(Debug)]
pub struct ServerSession {
    outbound: HashMap<PlayerId, mpsc::Sender<Command>>,
    slots: HashMap<PlayerId, ResultSlot>,
    calls: AtomicU64,
}

impl ServerSession {
    /// Open a session over the server ends of the given links.
    ///
    /// The returned router must be run for any round trip to complete.
    pub fn open(links: impl IntoIterator<Item = (PlayerId, Link)>) -> (Arc<Self>, ServerRouter) {
        let mut outbound = HashMap::new();
        let mut slots = HashMap::new();
        let mut inbound = HashMap::new();
        for (id, link) in links {
            outbound.insert(id, link.outbound);
            slots.insert(id, ResultSlot::default());
            inbound.insert(id, link.inbound);
        }

        let session = Arc::new(Self {
            outbound,
            slots,
            calls: AtomicU64::new(1),
        });
        let router = ServerRouter {
            session: Arc::clone(&session),
            inbound,
        };
        (session, router)
    }

    pub fn participants(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.outbound.keys().copied()
    }

    /// Ask `target` to resolve `action` and wait for its answer.
    pub async fn call(&self, target: PlayerId, action: Request) -> Result<Reply, InterpretError> {
        let (outbound, slot) = match (self.outbound.get(&target), self.slots.get(&target)) {
            (Some(outbound), Some(slot)) => (outbound, slot),
            _ => {
                return Err(InterpretError::RoutingContractViolation(format!(
                    "no session link for participant {target}"
                )))
            }
        };

        let call = CallId(self.calls.fetch_add(1, Ordering::Relaxed));
        let answer = slot.register(call)?;
        tracing::debug!(participant = %target, %call, step = action.name(), "delegating to participant");

        let command = Command::ActionDelegate {
            origin: Origin::Server,
            call,
            action,
        };
        if outbound.send(command).await.is_err() {
            slot.cancel(call);
            return Err(InterpretError::Disconnected);
        }
        answer.await.map_err(|_| InterpretError::Disconnected)
    }

    /// [`call`](Self::call), decoding the answer into the expected type.
    pub async fn ask<R: FromReply + Send>(
        &self,
        target: PlayerId,
        action: Request,
    ) -> Result<R, InterpretError> {
        R::from_reply(self.call(target, action).await?)
    }

    async fn reply(&self, target: PlayerId, call: CallId, value: Reply) -> Result<(), InterpretError> {
        let outbound = self
            .outbound
            .get(&target)
            .ok_or(InterpretError::Disconnected)?;
        outbound
            .send(Command::Result {
                origin: Origin::Server,
                call,
                value,
            })
            .await
            .map_err(|_| InterpretError::Disconnected)
    }

    fn deliver(&self, from: PlayerId, call: CallId, value: Reply) -> Result<(), Reply> {
        match self.slots.get(&from) {
            Some(slot) => slot.deliver(call, value),
            None => Err(value),
        }
    }

    fn disconnect(&self, id: PlayerId) {
        if let Some(slot) = self.slots.get(&id) {
            slot.close();
        }
    }
}

enum Wake {
    Inbound(PlayerId, Option<Command>),
    Finished(Result<Result<(), InterpretError>, JoinError>),
}

async fn next_inbound(
    inbound: &mut HashMap<PlayerId, mpsc::Receiver<Command>>,
) -> (PlayerId, Option<Command>) {
    let waits = inbound.iter_mut().map(|(id, receiver)| {
        let id = *id;
        Box::pin(async move { (id, receiver.recv().await) })
    });
    let (ready, _, _) = select_all(waits).await;
    ready
}

/// Receives from every participant and dispatches what arrives.
pub struct ServerRouter {
    session: Arc<ServerSession>,
    inbound: HashMap<PlayerId, mpsc::Receiver<Command>>,
}

impl ServerRouter {
    pub fn session(&self) -> &Arc<ServerSession> {
        &self.session
    }

    /// Route until every participant has disconnected and every walk has
    /// finished, or until a walk fails fatally.
    pub async fn run(mut self, executor: Arc<dyn Executor>) -> Result<(), SessionError> {
        let mut walks = JoinSet::new();
        tracing::info!(participants = self.inbound.len(), "server router started");

        loop {
            let listening = !self.inbound.is_empty();
            let wake = tokio::select! {
                (from, command) = next_inbound(&mut self.inbound), if listening => {
                    Wake::Inbound(from, command)
                }
                Some(finished) = walks.join_next() => Wake::Finished(finished),
                else => break,
            };

            match wake {
                Wake::Inbound(from, None) => {
                    self.inbound.remove(&from);
                    self.session.disconnect(from);
                    tracing::info!(participant = %from, "participant disconnected");
                }
                Wake::Inbound(from, Some(command)) => self.dispatch(from, command, &executor, &mut walks),
                Wake::Finished(finished) => settle(finished)?,
            }
        }

        tracing::info!("server router stopped");
        Ok(())
    }

    fn dispatch(
        &self,
        from: PlayerId,
        command: Command,
        executor: &Arc<dyn Executor>,
        walks: &mut JoinSet<Result<(), InterpretError>>,
    ) {
        match command {
            Command::ActionDelegate { call, action, .. } => {
                tracing::debug!(participant = %from, %call, step = action.name(), "executing delegated action");
                let session = Arc::clone(&self.session);
                let executor = Arc::clone(executor);
                walks.spawn(async move {
                    let (value, outcome) =
                        execute_delegated(executor.as_ref(), Origin::Participant(from), call, action).await;
                    let delivered = session.reply(from, call, value).await;
                    outcome.and(delivered)
                });
            }
            Command::Result { call, value, .. } => {
                if let Err(value) = self.session.deliver(from, call, value) {
                    tracing::warn!(
                        participant = %from,
                        %call,
                        kind = value.kind(),
                        "discarding result with no outstanding call"
                    );
                }
            }
        }
    }
}
