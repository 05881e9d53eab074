//! The server-side interpreter.
//!
//! Server-tagged steps are resolved against the authoritative [`Table`];
//! client-tagged steps are forwarded to one named participant.

use crate::action::{play_turn, FromReply, Outcome, Reply, Request, TurnReport};
use crate::game::{BugReport, Card, GameEvent, GameState, PlayerId, Table};
use crate::interpreter::{Authority, InterpretError, Interpreter, Participant};
use crate::session::{Executor, Origin, ServerSession};
use async_trait::async_trait;
use std::sync::Arc;

pub type ServerInterpreter = Interpreter<TableAuthority, RemoteParticipant>;

/// Resolves server-tagged steps for one acting player by sending events
/// through the table.
pub struct TableAuthority {
    table: Arc<Table>,
    session: Arc<ServerSession>,
    origin: PlayerId,
}

impl TableAuthority {
    pub fn new(table: Arc<Table>, session: Arc<ServerSession>, origin: PlayerId) -> Self {
        Self {
            table,
            session,
            origin,
        }
    }

    pub fn origin(&self) -> PlayerId {
        self.origin
    }

    /// Settle the pending attack on `victim`. `Failure` means the defence
    /// deflected it.
    async fn resolve_attack(
        &self,
        victim: PlayerId,
        defence: Option<Card>,
    ) -> Result<Outcome, InterpretError> {
        let without = GameEvent::ReactWithoutCard {
            origin: self.origin,
            victim,
        };
        match defence {
            Some(card) => {
                let react = GameEvent::ReactWithCard {
                    origin: self.origin,
                    victim,
                    card,
                };
                if self.table.apply_or(react, without).await? {
                    tracing::debug!(victim = %victim, ?card, "attack deflected");
                    return Ok(Outcome::Failure);
                }
                tracing::debug!(victim = %victim, ?card, "defence card not accepted");
            }
            None => {
                self.table.apply(without).await?;
            }
        }
        tracing::debug!(victim = %victim, "attack landed");
        Ok(Outcome::Success)
    }
}

#[async_trait]
impl Authority for TableAuthority {
    async fn draw_cards(&self) -> Result<Vec<Card>, InterpretError> {
        let (before, after) = self
            .table
            .apply(GameEvent::DrawCards {
                origin: self.origin,
            })
            .await?;
        let count = before.draw_pile.len().saturating_sub(after.draw_pile.len());
        Ok(before.draw_pile[..count].to_vec())
    }

    async fn attack_player(
        &self,
        target: PlayerId,
        bug: BugReport,
    ) -> Result<Outcome, InterpretError> {
        self.table
            .apply(GameEvent::ReportBug {
                origin: self.origin,
                victim: target,
                bug,
            })
            .await?;
        tracing::debug!(attacker = %self.origin, victim = %target, ?bug, "bug reported");

        let defence = match self.session.ask::<Option<Card>>(target, Request::SelectResponse).await {
            Ok(defence) => defence,
            Err(err) if !err.is_fatal() => {
                tracing::warn!(victim = %target, error = %err, "victim did not answer, attack stands");
                None
            }
            Err(err) => return Err(err),
        };
        self.resolve_attack(target, defence).await
    }

    async fn defend_attack(&self, defence: Option<Card>) -> Result<Outcome, InterpretError> {
        let pending = self
            .table
            .state()
            .pending_attack
            .filter(|attack| attack.victim == self.origin);
        if pending.is_none() {
            return Err(InterpretError::Rejected(format!(
                "no pending attack against player {}",
                self.origin
            )));
        }

        Ok(match self.resolve_attack(self.origin, defence).await? {
            Outcome::Success => Outcome::Failure,
            Outcome::Failure => Outcome::Success,
        })
    }

    async fn handle_stumbling(&self, via: Option<Card>) -> Result<Outcome, InterpretError> {
        let unanswered = GameEvent::ResolveStumbling {
            origin: self.origin,
            via: None,
        };
        let spent = match via {
            Some(_) => {
                let answered = GameEvent::ResolveStumbling {
                    origin: self.origin,
                    via,
                };
                let spent = self.table.apply_or(answered, unanswered).await?;
                if !spent {
                    tracing::debug!(
                        player = %self.origin,
                        "response card not accepted, taking the hit"
                    );
                }
                spent
            }
            None => {
                self.table.apply(unanswered).await?;
                false
            }
        };

        Ok(if spent {
            Outcome::Success
        } else {
            Outcome::Failure
        })
    }

    async fn discard(&self, cards: Vec<Card>) -> Result<(), InterpretError> {
        self.table
            .apply(GameEvent::Discard {
                origin: self.origin,
                cards,
            })
            .await?;
        Ok(())
    }
}

/// Forwards client-tagged steps to one participant over the session.
///
/// An unbound participant has nobody to forward to; every step it is
/// asked to resolve is a routing contract violation.
pub struct RemoteParticipant {
    session: Arc<ServerSession>,
    target: Option<PlayerId>,
}

impl RemoteParticipant {
    pub fn new(session: Arc<ServerSession>, target: PlayerId) -> Self {
        Self {
            session,
            target: Some(target),
        }
    }

    pub fn unbound(session: Arc<ServerSession>) -> Self {
        Self {
            session,
            target: None,
        }
    }

    async fn ask<R: FromReply + Send>(&self, request: Request) -> Result<R, InterpretError> {
        let Some(target) = self.target else {
            return Err(InterpretError::RoutingContractViolation(format!(
                "{} needs a named participant on the server",
                request.name()
            )));
        };
        self.session.ask(target, request).await
    }
}

#[async_trait]
impl Participant for RemoteParticipant {
    async fn check_stumbling(&self) -> Result<Option<Card>, InterpretError> {
        self.ask(Request::CheckStumbling).await
    }

    async fn select_response(&self) -> Result<Option<Card>, InterpretError> {
        self.ask(Request::SelectResponse).await
    }

    async fn play_card(&self) -> Result<Card, InterpretError> {
        self.ask(Request::PlayCard).await
    }

    async fn select_player(&self) -> Result<PlayerId, InterpretError> {
        self.ask(Request::SelectPlayer).await
    }

    async fn select_attack(&self) -> Result<BugReport, InterpretError> {
        self.ask(Request::SelectAttack).await
    }

    async fn select_discard_cards(&self, amount: usize) -> Result<Vec<Card>, InterpretError> {
        self.ask(Request::SelectDiscardCards { amount }).await
    }

    async fn game_state(&self) -> Result<Arc<GameState>, InterpretError> {
        self.ask(Request::GetGameState).await
    }
}

/// Executes actions delegated by participants against the table.
pub struct TableExecutor {
    table: Arc<Table>,
    session: Arc<ServerSession>,
}

impl TableExecutor {
    pub fn new(table: Arc<Table>, session: Arc<ServerSession>) -> Self {
        Self { table, session }
    }
}

#[async_trait]
impl Executor for TableExecutor {
    async fn execute(&self, origin: Origin, action: Request) -> Result<Reply, InterpretError> {
        let Origin::Participant(player) = origin else {
            return Err(InterpretError::RoutingContractViolation(
                "server received an action attributed to itself".into(),
            ));
        };
        let interpreter: ServerInterpreter = Interpreter::new(
            TableAuthority::new(Arc::clone(&self.table), Arc::clone(&self.session), player),
            RemoteParticipant::unbound(Arc::clone(&self.session)),
        );
        interpreter.run(action.into_program()).await
    }
}

/// Play the current player's turn from the server, then pass the turn on.
pub async fn drive_turn(
    table: &Arc<Table>,
    session: &Arc<ServerSession>,
) -> Result<TurnReport, InterpretError> {
    let player = table
        .state()
        .current_id()
        .ok_or_else(|| InterpretError::Rejected("no players seated".into()))?;
    tracing::info!(player = %player, "driving turn");

    let interpreter: ServerInterpreter = Interpreter::new(
        TableAuthority::new(Arc::clone(table), Arc::clone(session), player),
        RemoteParticipant::new(Arc::clone(session), player),
    );
    let report = interpreter.run(play_turn()).await?;
    table.end_turn(player).await?;
    Ok(report)
}
