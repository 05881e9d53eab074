//! Program interpreters.
//!
//! An [`Interpreter`] walks a [`Program`] one step at a time. Server-tagged
//! steps go to its [`Authority`], client-tagged steps to its
//! [`Participant`]. Which of the two resolves locally and which forwards
//! over a session decides whether the interpreter runs on the server or on
//! a participant.

mod client;
mod error;
mod server;

pub use client::{
    ClientInterpreter, Chooser, FirstChoice, LocalExecutor, LocalParticipant, NoAuthority,
    RemoteAuthority,
};
pub use error::InterpretError;
pub use server::{drive_turn, RemoteParticipant, ServerInterpreter, TableAuthority, TableExecutor};

use crate::action::{Outcome, Program, Step};
use crate::game::{BugReport, Card, GameState, PlayerId};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves server-tagged steps.
#[async_trait]
pub trait Authority: Send + Sync {
    async fn draw_cards(&self) -> Result<Vec<Card>, InterpretError>;

    async fn attack_player(
        &self,
        target: PlayerId,
        bug: BugReport,
    ) -> Result<Outcome, InterpretError>;

    async fn defend_attack(&self, defence: Option<Card>) -> Result<Outcome, InterpretError>;

    async fn handle_stumbling(&self, via: Option<Card>) -> Result<Outcome, InterpretError>;

    async fn discard(&self, cards: Vec<Card>) -> Result<(), InterpretError>;
}

/// Resolves client-tagged steps.
#[async_trait]
pub trait Participant: Send + Sync {
    async fn check_stumbling(&self) -> Result<Option<Card>, InterpretError>;

    async fn select_response(&self) -> Result<Option<Card>, InterpretError>;

    async fn play_card(&self) -> Result<Card, InterpretError>;

    async fn select_player(&self) -> Result<PlayerId, InterpretError>;

    async fn select_attack(&self) -> Result<BugReport, InterpretError>;

    async fn select_discard_cards(&self, amount: usize) -> Result<Vec<Card>, InterpretError>;

    async fn game_state(&self) -> Result<Arc<GameState>, InterpretError>;
}

/// Walks programs against one authority and one participant.
pub struct Interpreter<Au, Pa> {
    authority: Au,
    participant: Pa,
}

impl<Au: Authority, Pa: Participant> Interpreter<Au, Pa> {
    pub fn new(authority: Au, participant: Pa) -> Self {
        Self {
            authority,
            participant,
        }
    }

    pub fn authority(&self) -> &Au {
        &self.authority
    }

    pub fn participant(&self) -> &Pa {
        &self.participant
    }

    /// Walk `program` until it is done and return its result.
    ///
    /// The first failing step ends the walk; nothing after it runs.
    pub async fn run<A: Send + 'static>(
        &self,
        program: Program<A>,
    ) -> Result<A, InterpretError> {
        let mut program = program;
        loop {
            if let Some(request) = program.request() {
                tracing::trace!(step = request.name(), side = ?request.side(), "resolving step");
            }
            program = match program.into_step() {
                Step::Done(result) => return Ok(result),
                Step::CheckStumbling(next) => {
                    next.resume(self.participant.check_stumbling().await?)
                }
                Step::SelectResponse(next) => {
                    next.resume(self.participant.select_response().await?)
                }
                Step::PlayCard(next) => next.resume(self.participant.play_card().await?),
                Step::SelectPlayer(next) => next.resume(self.participant.select_player().await?),
                Step::SelectAttack(next) => next.resume(self.participant.select_attack().await?),
                Step::SelectDiscardCards { amount, next } => {
                    next.resume(self.participant.select_discard_cards(amount).await?)
                }
                Step::GetGameState(next) => next.resume(self.participant.game_state().await?),
                Step::DrawCards(next) => next.resume(self.authority.draw_cards().await?),
                Step::AttackPlayer { target, bug, next } => {
                    next.resume(self.authority.attack_player(target, bug).await?)
                }
                Step::DefendAttack { defence, next } => {
                    next.resume(self.authority.defend_attack(defence).await?)
                }
                Step::HandleStumbling { via, next } => {
                    next.resume(self.authority.handle_stumbling(via).await?)
                }
                Step::Discard { cards, next } => next.resume(self.authority.discard(cards).await?),
            };
        }
    }
}
