//! Sessions: command envelopes, channel pairs and the routers that drive
//! them.
//!
//! Each participant talks to the server over one [`Link`] pair of
//! capacity-1 channels. Router loops only receive: they spawn a walk for
//! every delegated action and hand every result to the call waiting for
//! it. Only walks and callers ever send, so a full channel can never block
//! the loop that would drain the other direction.

mod client;
mod error;
mod server;
mod slot;

pub use client::{ClientRouter, ClientSession};
pub use error::SessionError;
pub use server::{ServerRouter, ServerSession};

use crate::action::{Reply, Request};
use crate::game::PlayerId;
use crate::interpreter::InterpretError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tokio::task::JoinError;

/// Who an action or result is attributed to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Origin {
    Server,
    Participant(PlayerId),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Origin::Server => write!(f, "server"),
            Origin::Participant(id) => write!(f, "participant {id}"),
        }
    }
}

/// Identifies one round trip within a session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CallId(pub u64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The envelope carried over a link.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Command {
    /// Resolve `action` on the receiving side and answer with a `Result`.
    ActionDelegate {
        origin: Origin,
        call: CallId,
        action: Request,
    },
    /// The answer to the delegated action with the same `call`.
    Result {
        origin: Origin,
        call: CallId,
        value: Reply,
    },
}

/// One end of a participant's channel pair.
#[derive(Debug)]
pub struct Link {
    pub outbound: mpsc::Sender<Command>,
    pub inbound: mpsc::Receiver<Command>,
}

impl Link {
    /// Two connected ends: `(server_end, participant_end)`.
    pub fn pair() -> (Link, Link) {
        let (to_participant, from_server) = mpsc::channel(1);
        let (to_server, from_participant) = mpsc::channel(1);
        (
            Link {
                outbound: to_participant,
                inbound: from_participant,
            },
            Link {
                outbound: to_server,
                inbound: from_server,
            },
        )
    }
}

/// Resolves a delegated action on the receiving side.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, origin: Origin, action: Request) -> Result<Reply, InterpretError>;
}

/// Run one delegated action. Failures become a `Failed` reply so the
/// caller is not left waiting; fatal ones are also handed back to end
/// the router.
async fn execute_delegated(
    executor: &dyn Executor,
    origin: Origin,
    call: CallId,
    action: Request,
) -> (Reply, Result<(), InterpretError>) {
    let step = action.name();
    match executor.execute(origin, action).await {
        Ok(value) => (value, Ok(())),
        Err(err) if err.is_fatal() => {
            tracing::error!(%origin, %call, step, error = %err, "delegated action violated routing contract");
            (Reply::Failed(err.to_string()), Err(err))
        }
        Err(err) => {
            tracing::warn!(%origin, %call, step, error = %err, "delegated action failed");
            (Reply::Failed(err.to_string()), Ok(()))
        }
    }
}

/// Fold a finished walk into the router's fate.
fn settle(finished: Result<Result<(), InterpretError>, JoinError>) -> Result<(), SessionError> {
    match finished {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) if err.is_fatal() => Err(SessionError::Interpret(err)),
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "delegated walk could not deliver its result");
            Ok(())
        }
        Err(join) => Err(SessionError::TaskFailed(join.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Outcome;

    #[tokio::test]
    async fn link_pair_is_crossed() {
        let (mut server, mut participant) = Link::pair();

        server
            .outbound
            .send(Command::ActionDelegate {
                origin: Origin::Server,
                call: CallId(1),
                action: Request::SelectPlayer,
            })
            .await
            .unwrap();
        participant
            .outbound
            .send(Command::Result {
                origin: Origin::Participant(PlayerId(1)),
                call: CallId(1),
                value: Reply::Player(PlayerId(2)),
            })
            .await
            .unwrap();

        assert!(matches!(
            participant.inbound.recv().await,
            Some(Command::ActionDelegate { .. })
        ));
        assert!(matches!(server.inbound.recv().await, Some(Command::Result { .. })));
    }

    #[test]
    fn link_holds_one_command() {
        let (server, _participant) = Link::pair();
        let command = Command::Result {
            origin: Origin::Server,
            call: CallId(1),
            value: Reply::Unit,
        };

        assert!(server.outbound.try_send(command.clone()).is_ok());
        assert!(server.outbound.try_send(command).is_err());
    }

    #[test]
    fn envelopes_travel_as_json() {
        let command = Command::Result {
            origin: Origin::Participant(PlayerId(3)),
            call: CallId(9),
            value: Reply::Outcome(Outcome::Failure),
        };
        let json = serde_json::to_string(&command).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }

    #[test]
    fn only_fatal_walk_errors_end_the_router() {
        assert!(settle(Ok(Ok(()))).is_ok());
        assert!(settle(Ok(Err(InterpretError::Disconnected))).is_ok());
        assert!(matches!(
            settle(Ok(Err(InterpretError::StoreClosed))),
            Err(SessionError::Interpret(InterpretError::StoreClosed))
        ));
    }

    #[test]
    fn origins_display() {
        assert_eq!(Origin::Participant(PlayerId(4)).to_string(), "participant 4");
        assert_eq!(CallId(12).to_string(), "#12");
    }
}
