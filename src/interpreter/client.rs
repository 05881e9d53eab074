//! The participant-side interpreter.
//!
//! Server-tagged steps are delegated to the server over the session;
//! client-tagged steps are answered from the participant's own view of the
//! table and a [`Chooser`].

use crate::action::{FromReply, Outcome, Reply, Request};
use crate::game::{BugReport, Card, CardKind, GameState, PlayerId};
use crate::interpreter::{Authority, InterpretError, Interpreter, Participant};
use crate::session::{ClientSession, Executor, Origin};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

pub type ClientInterpreter<C> = Interpreter<RemoteAuthority, LocalParticipant<C>>;

/// Forwards server-tagged steps to the server.
pub struct RemoteAuthority {
    session: Arc<ClientSession>,
}

impl RemoteAuthority {
    pub fn new(session: Arc<ClientSession>) -> Self {
        Self { session }
    }

    async fn ask<R: FromReply + Send>(&self, request: Request) -> Result<R, InterpretError> {
        self.session.ask(request).await
    }
}

#[async_trait]
impl Authority for RemoteAuthority {
    async fn draw_cards(&self) -> Result<Vec<Card>, InterpretError> {
        self.ask(Request::DrawCards).await
    }

    async fn attack_player(
        &self,
        target: PlayerId,
        bug: BugReport,
    ) -> Result<Outcome, InterpretError> {
        self.ask(Request::AttackPlayer { target, bug }).await
    }

    async fn defend_attack(&self, defence: Option<Card>) -> Result<Outcome, InterpretError> {
        self.ask(Request::DefendAttack { defence }).await
    }

    async fn handle_stumbling(&self, via: Option<Card>) -> Result<Outcome, InterpretError> {
        self.ask(Request::HandleStumbling { via }).await
    }

    async fn discard(&self, cards: Vec<Card>) -> Result<(), InterpretError> {
        self.ask(Request::Discard { cards }).await
    }
}

/// Has no authority at all. Used where only client-tagged steps may
/// appear.
pub struct NoAuthority;

impl NoAuthority {
    fn refuse<T>(step: &str) -> Result<T, InterpretError> {
        Err(InterpretError::RoutingContractViolation(format!(
            "{step} must be resolved by the server"
        )))
    }
}

#[async_trait]
impl Authority for NoAuthority {
    async fn draw_cards(&self) -> Result<Vec<Card>, InterpretError> {
        Self::refuse("DrawCards")
    }

    async fn attack_player(&self, _: PlayerId, _: BugReport) -> Result<Outcome, InterpretError> {
        Self::refuse("AttackPlayer")
    }

    async fn defend_attack(&self, _: Option<Card>) -> Result<Outcome, InterpretError> {
        Self::refuse("DefendAttack")
    }

    async fn handle_stumbling(&self, _: Option<Card>) -> Result<Outcome, InterpretError> {
        Self::refuse("HandleStumbling")
    }

    async fn discard(&self, _: Vec<Card>) -> Result<(), InterpretError> {
        Self::refuse("Discard")
    }
}

/// Makes a participant's decisions. `None` means there is nothing to
/// choose from.
#[async_trait]
pub trait Chooser: Send + Sync {
    /// A card to answer an attack or a stumbling block with. `None` takes
    /// the hit.
    async fn select_response(&self, state: &GameState, me: PlayerId) -> Option<Card>;

    async fn play_card(&self, state: &GameState, me: PlayerId) -> Option<Card>;

    async fn select_player(&self, state: &GameState, me: PlayerId) -> Option<PlayerId>;

    async fn select_attack(&self, state: &GameState, me: PlayerId) -> Option<BugReport>;

    async fn select_discard_cards(
        &self,
        state: &GameState,
        me: PlayerId,
        amount: usize,
    ) -> Option<Vec<Card>>;
}

/// Always takes the first thing on offer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstChoice;

#[async_trait]
impl Chooser for FirstChoice {
    async fn select_response(&self, state: &GameState, me: PlayerId) -> Option<Card> {
        state
            .player(me)?
            .cards
            .iter()
            .find(|card| card.kind() == CardKind::Excuse)
            .copied()
    }

    async fn play_card(&self, state: &GameState, me: PlayerId) -> Option<Card> {
        state.player(me)?.cards.first().copied()
    }

    async fn select_player(&self, state: &GameState, me: PlayerId) -> Option<PlayerId> {
        state.next_seat(me)
    }

    async fn select_attack(&self, state: &GameState, me: PlayerId) -> Option<BugReport> {
        state.player(me)?.bugs().next()
    }

    async fn select_discard_cards(
        &self,
        state: &GameState,
        me: PlayerId,
        amount: usize,
    ) -> Option<Vec<Card>> {
        let cards = &state.player(me)?.cards;
        let start = cards.len().checked_sub(amount)?;
        Some(cards[start..].to_vec())
    }
}

/// Answers client-tagged steps for `me` from the latest table snapshot.
pub struct LocalParticipant<C> {
    me: PlayerId,
    state: watch::Receiver<Arc<GameState>>,
    chooser: Arc<C>,
}

impl<C: Chooser> LocalParticipant<C> {
    pub fn new(me: PlayerId, state: watch::Receiver<Arc<GameState>>, chooser: Arc<C>) -> Self {
        Self { me, state, chooser }
    }

    pub fn me(&self) -> PlayerId {
        self.me
    }

    fn snapshot(&self) -> Arc<GameState> {
        Arc::clone(&*self.state.borrow())
    }
}

#[async_trait]
impl<C: Chooser> Participant for LocalParticipant<C> {
    async fn check_stumbling(&self) -> Result<Option<Card>, InterpretError> {
        Ok(self.snapshot().pending_stumbling(self.me))
    }

    async fn select_response(&self) -> Result<Option<Card>, InterpretError> {
        let state = self.snapshot();
        Ok(self.chooser.select_response(&state, self.me).await)
    }

    async fn play_card(&self) -> Result<Card, InterpretError> {
        let state = self.snapshot();
        self.chooser
            .play_card(&state, self.me)
            .await
            .ok_or(InterpretError::NoChoice("card"))
    }

    async fn select_player(&self) -> Result<PlayerId, InterpretError> {
        let state = self.snapshot();
        self.chooser
            .select_player(&state, self.me)
            .await
            .ok_or(InterpretError::NoChoice("player"))
    }

    async fn select_attack(&self) -> Result<BugReport, InterpretError> {
        let state = self.snapshot();
        self.chooser
            .select_attack(&state, self.me)
            .await
            .ok_or(InterpretError::NoChoice("bug report"))
    }

    async fn select_discard_cards(&self, amount: usize) -> Result<Vec<Card>, InterpretError> {
        let state = self.snapshot();
        self.chooser
            .select_discard_cards(&state, self.me, amount)
            .await
            .ok_or(InterpretError::NoChoice("cards to discard"))
    }

    async fn game_state(&self) -> Result<Arc<GameState>, InterpretError> {
        Ok(self.snapshot())
    }
}

/// Executes actions the server delegates to this participant.
///
/// Only client-tagged steps can be resolved here.
pub struct LocalExecutor<C> {
    interpreter: Interpreter<NoAuthority, LocalParticipant<C>>,
}

impl<C: Chooser> LocalExecutor<C> {
    pub fn new(participant: LocalParticipant<C>) -> Self {
        Self {
            interpreter: Interpreter::new(NoAuthority, participant),
        }
    }
}

#[async_trait]
impl<C: Chooser> Executor for LocalExecutor<C> {
    async fn execute(&self, origin: Origin, action: Request) -> Result<Reply, InterpretError> {
        if origin != Origin::Server {
            return Err(InterpretError::RoutingContractViolation(format!(
                "participant received an action from {origin}"
            )));
        }
        self.interpreter.run(action.into_program()).await
    }
}
