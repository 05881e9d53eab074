use crate::action::{FromReply, Reply, Request};
use crate::game::PlayerId;
use crate::interpreter::InterpretError;
use crate::session::slot::ResultSlot;
use crate::session::{execute_delegated, settle, CallId, Command, Executor, Link, Origin, SessionError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// A participant's half of a session.
#[derive(Debug)]
pub struct ClientSession {
    me: PlayerId,
    outbound: mpsc::Sender<Command>,
    slot: ResultSlot,
    calls: AtomicU64,
}

impl ClientSession {
    /// Open a session over the participant end of a link.
    pub fn open(me: PlayerId, link: Link) -> (Arc<Self>, ClientRouter) {
        let session = Arc::new(Self {
            me,
            outbound: link.outbound,
            slot: ResultSlot::default(),
            calls: AtomicU64::new(1),
        });
        let router = ClientRouter {
            session: Arc::clone(&session),
            inbound: link.inbound,
        };
        (session, router)
    }

    pub fn me(&self) -> PlayerId {
        self.me
    }

    /// Ask the server to resolve `action` and wait for its answer.
    pub async fn call(&self, action: Request) -> Result<Reply, InterpretError> {
        let call = CallId(self.calls.fetch_add(1, Ordering::Relaxed));
        let answer = self.slot.register(call)?;
        tracing::debug!(participant = %self.me, %call, step = action.name(), "delegating to server");

        let command = Command::ActionDelegate {
            origin: Origin::Participant(self.me),
            call,
            action,
        };
        if self.outbound.send(command).await.is_err() {
            self.slot.cancel(call);
            return Err(InterpretError::Disconnected);
        }
        answer.await.map_err(|_| InterpretError::Disconnected)
    }

    pub async fn ask<R: FromReply + Send>(&self, action: Request) -> Result<R, InterpretError> {
        R::from_reply(self.call(action).await?)
    }

    async fn reply(&self, call: CallId, value: Reply) -> Result<(), InterpretError> {
        self.outbound
            .send(Command::Result {
                origin: Origin::Participant(self.me),
                call,
                value,
            })
            .await
            .map_err(|_| InterpretError::Disconnected)
    }
}

/// Receives from the server and dispatches what arrives.
pub struct ClientRouter {
    session: Arc<ClientSession>,
    inbound: mpsc::Receiver<Command>,
}

impl ClientRouter {
    pub fn session(&self) -> &Arc<ClientSession> {
        &self.session
    }

    /// Route until the server hangs up and every walk has finished, or
    /// until a walk fails fatally.
    pub async fn run(mut self, executor: Arc<dyn Executor>) -> Result<(), SessionError> {
        let me = self.session.me;
        let mut walks = JoinSet::new();
        let mut listening = true;

        loop {
            tokio::select! {
                command = self.inbound.recv(), if listening => match command {
                    Some(command) => self.dispatch(command, &executor, &mut walks),
                    None => {
                        listening = false;
                        self.session.slot.close();
                        tracing::info!(participant = %me, "server disconnected");
                    }
                },
                Some(finished) = walks.join_next() => settle(finished)?,
                else => break,
            }
        }

        tracing::debug!(participant = %me, "client router stopped");
        Ok(())
    }

    fn dispatch(
        &self,
        command: Command,
        executor: &Arc<dyn Executor>,
        walks: &mut JoinSet<Result<(), InterpretError>>,
    ) {
        match command {
            Command::ActionDelegate { origin, call, action } => {
                let session = Arc::clone(&self.session);
                let executor = Arc::clone(executor);
                walks.spawn(async move {
                    let (value, outcome) = execute_delegated(executor.as_ref(), origin, call, action).await;
                    let delivered = session.reply(call, value).await;
                    outcome.and(delivered)
                });
            }
            Command::Result { call, value, .. } => {
                if let Err(value) = self.session.slot.deliver(call, value) {
                    tracing::warn!(
                        participant = %self.session.me,
                        %call,
                        kind = value.kind(),
                        "discarding result with no outstanding call"
                    );
                }
            }
        }
    }
}
