//! Turn content composed from primitives.

use crate::action::primitive::Outcome;
use crate::action::program::{
    attack_player, check_stumbling, discard, done, draw_cards, get_game_state, handle_stumbling,
    select_attack, select_discard_cards, select_player, select_response, Program,
};
use crate::game::Card;
use crate::program;
use serde::{Deserialize, Serialize};

/// What happened during one walk of [`play_turn`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TurnReport {
    pub stumbling: Outcome,
    pub drawn: Vec<Card>,
    pub attack: Outcome,
    pub discarded: Vec<Card>,
}

/// Deal with a stumbling card in front of the acting player, if there is one.
///
/// The participant may answer with a card; without one the block costs
/// mental health. A player with nothing in front succeeds immediately.
pub fn attempt_to_handle_stumbling() -> Program<Outcome> {
    check_stumbling().and_then(|pending| match pending {
        Some(_) => select_response().and_then(handle_stumbling),
        None => done(Outcome::Success),
    })
}

pub fn attack_another_player() -> Program<Outcome> {
    program! {
        let target = select_player();
        let bug = select_attack();
        attack_player(target, bug)
    }
}

/// Discard down to the acting player's mental health.
///
/// Returns the discarded cards, empty when the hand already fits.
pub fn finish_turn() -> Program<Vec<Card>> {
    get_game_state().and_then(|state| {
        let excess = state
            .current_player()
            .map(|player| player.cards.len().saturating_sub(player.mental_health as usize))
            .unwrap_or(0);
        if excess == 0 {
            return done(Vec::new());
        }
        select_discard_cards(excess)
            .and_then(|cards| discard(cards.clone()).map(move |()| cards))
    })
}

/// A full turn: stumbling, draw, one attack, then discard to hand limit.
pub fn play_turn() -> Program<TurnReport> {
    program! {
        let stumbling = attempt_to_handle_stumbling();
        let drawn = draw_cards();
        let attack = attack_another_player();
        let discarded = finish_turn();
        done(TurnReport {
            stumbling,
            drawn,
            attack,
            discarded,
        })
    }
}
