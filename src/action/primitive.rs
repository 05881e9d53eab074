//! The closed catalog of primitive operations, as plain data.
//!
//! A [`Request`] is a primitive without its continuation: it is what
//! travels over a session when one side asks the other to resolve a step.
//! The answer comes back as a [`Reply`] and is decoded into the type the
//! waiting step expects through [`FromReply`].

use crate::action::program::{self, Program};
use crate::game::{BugReport, Card, GameState, PlayerId};
use crate::interpreter::InterpretError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of an operation that can go either way.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Outcome {
    Success,
    Failure,
}

/// Which party may resolve a primitive.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Side {
    /// Computed authoritatively against the table.
    Server,
    /// Supplied by a participant.
    Client,
}

/// A primitive operation, without its continuation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Request {
    CheckStumbling,
    SelectResponse,
    PlayCard,
    SelectPlayer,
    SelectAttack,
    SelectDiscardCards { amount: usize },
    GetGameState,
    DrawCards,
    AttackPlayer { target: PlayerId, bug: BugReport },
    DefendAttack { defence: Option<Card> },
    HandleStumbling { via: Option<Card> },
    Discard { cards: Vec<Card> },
}

impl Request {
    pub fn side(&self) -> Side {
        match self {
            Self::CheckStumbling
            | Self::SelectResponse
            | Self::PlayCard
            | Self::SelectPlayer
            | Self::SelectAttack
            | Self::SelectDiscardCards { .. }
            | Self::GetGameState => Side::Client,
            Self::DrawCards
            | Self::AttackPlayer { .. }
            | Self::DefendAttack { .. }
            | Self::HandleStumbling { .. }
            | Self::Discard { .. } => Side::Server,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckStumbling => "CheckStumbling",
            Self::SelectResponse => "SelectResponse",
            Self::PlayCard => "PlayCard",
            Self::SelectPlayer => "SelectPlayer",
            Self::SelectAttack => "SelectAttack",
            Self::SelectDiscardCards { .. } => "SelectDiscardCards",
            Self::GetGameState => "GetGameState",
            Self::DrawCards => "DrawCards",
            Self::AttackPlayer { .. } => "AttackPlayer",
            Self::DefendAttack { .. } => "DefendAttack",
            Self::HandleStumbling { .. } => "HandleStumbling",
            Self::Discard { .. } => "Discard",
        }
    }

    /// A one-step program that resolves this request and wraps the result.
    pub fn into_program(self) -> Program<Reply> {
        match self {
            Self::CheckStumbling => program::check_stumbling().map(Reply::MaybeCard),
            Self::SelectResponse => program::select_response().map(Reply::MaybeCard),
            Self::PlayCard => program::play_card().map(Reply::Card),
            Self::SelectPlayer => program::select_player().map(Reply::Player),
            Self::SelectAttack => program::select_attack().map(Reply::Bug),
            Self::SelectDiscardCards { amount } => {
                program::select_discard_cards(amount).map(Reply::Cards)
            }
            Self::GetGameState => {
                program::get_game_state().map(|state| Reply::State(Box::new((*state).clone())))
            }
            Self::DrawCards => program::draw_cards().map(Reply::Cards),
            Self::AttackPlayer { target, bug } => {
                program::attack_player(target, bug).map(Reply::Outcome)
            }
            Self::DefendAttack { defence } => program::defend_attack(defence).map(Reply::Outcome),
            Self::HandleStumbling { via } => program::handle_stumbling(via).map(Reply::Outcome),
            Self::Discard { cards } => program::discard(cards).map(|()| Reply::Unit),
        }
    }
}

/// The answer to a [`Request`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Reply {
    Cards(Vec<Card>),
    Card(Card),
    MaybeCard(Option<Card>),
    Player(PlayerId),
    Bug(BugReport),
    Outcome(Outcome),
    State(Box<GameState>),
    Unit,
    /// The request could not be resolved. Carries the reason.
    Failed(String),
}

impl Reply {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cards(_) => "cards",
            Self::Card(_) => "card",
            Self::MaybeCard(_) => "optional card",
            Self::Player(_) => "player",
            Self::Bug(_) => "bug report",
            Self::Outcome(_) => "outcome",
            Self::State(_) => "game state",
            Self::Unit => "unit",
            Self::Failed(_) => "failure",
        }
    }
}

/// Decodes a [`Reply`] into the type a waiting step expects.
///
/// A reply of any other shape is a [`InterpretError::ResultTypeMismatch`];
/// nothing is ever coerced to a default.
pub trait FromReply: Sized {
    const EXPECTED: &'static str;

    fn from_reply(reply: Reply) -> Result<Self, InterpretError>;
}

fn mismatch<T: FromReply>(reply: Reply) -> InterpretError {
    match reply {
        Reply::Failed(reason) => InterpretError::Remote(reason),
        other => InterpretError::ResultTypeMismatch {
            expected: T::EXPECTED,
            found: other.kind(),
        },
    }
}

macro_rules! from_reply {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl FromReply for $ty {
            const EXPECTED: &'static str = $expected;

            fn from_reply(reply: Reply) -> Result<Self, InterpretError> {
                match reply {
                    Reply::$variant(value) => Ok(value),
                    other => Err(mismatch::<Self>(other)),
                }
            }
        }
    };
}

from_reply!(Vec<Card>, Cards, "cards");
from_reply!(Card, Card, "card");
from_reply!(Option<Card>, MaybeCard, "optional card");
from_reply!(PlayerId, Player, "player");
from_reply!(BugReport, Bug, "bug report");
from_reply!(Outcome, Outcome, "outcome");

impl FromReply for Arc<GameState> {
    const EXPECTED: &'static str = "game state";

    fn from_reply(reply: Reply) -> Result<Self, InterpretError> {
        match reply {
            Reply::State(state) => Ok(Arc::new(*state)),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromReply for () {
    const EXPECTED: &'static str = "unit";

    fn from_reply(reply: Reply) -> Result<Self, InterpretError> {
        match reply {
            Reply::Unit => Ok(()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromReply for Reply {
    const EXPECTED: &'static str = "any reply";

    fn from_reply(reply: Reply) -> Result<Self, InterpretError> {
        Ok(reply)
    }
}
