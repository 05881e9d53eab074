//! Turn rules: the transition table and the payload reducer.

use crate::builder::{BuildErrors, TransitionBuilder};
use crate::core::{Guard, Selector};
use crate::game::cards::{Card, CardKind};
use crate::game::event::{EventKind, GameEvent};
use crate::game::state::{GameState, PendingAttack, PlayerId, Turn};
use crate::machine::{Reducer, TransitionTable};
use async_trait::async_trait;

pub type TurnTable = TransitionTable<Turn, GameEvent, GameState>;

type TurnGuard = Guard<GameState, GameEvent>;

fn origin_is_seated() -> TurnGuard {
    Guard::new(|state: &GameState, event: &GameEvent| state.is_seated(event.origin()))
}

fn origin_is_current() -> TurnGuard {
    Guard::new(|state: &GameState, event: &GameEvent| state.is_current(event.origin()))
}

fn no_pending_attack() -> TurnGuard {
    Guard::new(|state: &GameState, _: &GameEvent| state.pending_attack.is_none())
}

fn nothing_to_stumble_over(state: &GameState, event: &GameEvent) -> bool {
    state.pending_stumbling(event.origin()).is_none()
}

fn resolves_stumbling(state: &GameState, event: &GameEvent) -> bool {
    let GameEvent::ResolveStumbling { origin, via } = event else {
        return false;
    };
    let holds_via = match via {
        Some(card) => state.player(*origin).is_some_and(|player| player.holds(card)),
        None => true,
    };
    state.pending_stumbling(*origin).is_some() && holds_via
}

fn reports_bug(state: &GameState, event: &GameEvent) -> bool {
    let GameEvent::ReportBug { origin, victim, bug } = event else {
        return false;
    };
    let holds_bug = state
        .player(*origin)
        .is_some_and(|player| player.holds(&Card::Bug(*bug)));
    holds_bug && origin != victim && state.is_seated(*victim)
}

fn answers_pending_attack(state: &GameState, event: &GameEvent) -> bool {
    let Some(attack) = state.pending_attack else {
        return false;
    };
    let involved = |origin: &PlayerId| *origin == attack.attacker || *origin == attack.victim;
    match event {
        GameEvent::ReactWithCard {
            origin,
            victim,
            card,
        } => {
            involved(origin)
                && *victim == attack.victim
                && card.kind() == CardKind::Excuse
                && state.player(*victim).is_some_and(|player| player.holds(card))
        }
        GameEvent::ReactWithoutCard { origin, victim } => {
            involved(origin) && *victim == attack.victim
        }
        _ => false,
    }
}

fn holds_discards(state: &GameState, event: &GameEvent) -> bool {
    let GameEvent::Discard { origin, cards } = event else {
        return false;
    };
    state
        .player(*origin)
        .is_some_and(|player| player.holds_all(cards))
}

/// The turn machine.
///
/// Every edge requires the acting player to be seated. All edges except
/// the reactions to an attack also require the acting player to hold the
/// turn.
pub fn turn_table() -> Result<TurnTable, BuildErrors> {
    TransitionTable::builder()
        .global_guard(origin_is_seated())
        .transition(
            TransitionBuilder::new()
                .from(Turn::Stumbling)
                .to(Turn::Draw)
                .via(EventKind::ResolveStumbling)
                .guard(origin_is_current())
                .when(resolves_stumbling),
        )?
        .transition(
            TransitionBuilder::new()
                .from(Turn::Stumbling)
                .to(Turn::Play)
                .via(EventKind::DrawCards)
                .guard(origin_is_current())
                .when(nothing_to_stumble_over),
        )?
        .transition(
            TransitionBuilder::new()
                .from(Turn::Draw)
                .to(Turn::Play)
                .via(EventKind::DrawCards)
                .guard(origin_is_current()),
        )?
        .transition(
            TransitionBuilder::new()
                .from(Turn::Play)
                .to(Turn::Play)
                .via(EventKind::ReportBug)
                .guard(origin_is_current() + no_pending_attack())
                .when(reports_bug),
        )?
        .transition(
            TransitionBuilder::new()
                .from(Turn::Play)
                .to(Turn::Play)
                .via(Selector::any_of([
                    EventKind::ReactWithCard,
                    EventKind::ReactWithoutCard,
                ]))
                .when(answers_pending_attack),
        )?
        .transition(
            TransitionBuilder::new()
                .from(Turn::Play)
                .to(Turn::Play)
                .via(EventKind::Discard)
                .guard(origin_is_current())
                .when(holds_discards),
        )?
        .transition(
            TransitionBuilder::new()
                .from(Turn::Play)
                .to(Turn::Stumbling)
                .via(EventKind::NextTurn)
                .guard(origin_is_current() + no_pending_attack()),
        )?
        .build()
}

fn discard_from_hand(state: &mut GameState, owner: PlayerId, card: Card) {
    if let Some(player) = state.player_mut(owner) {
        if player.take(&card) {
            state.discard_heap.push(card);
        }
    }
}

fn lose_mental_health(state: &mut GameState, victim: PlayerId) {
    if let Some(player) = state.player_mut(victim) {
        player.mental_health = player.mental_health.saturating_sub(1);
    }
}

/// Fold one event into the table. Never mutates `state`.
///
/// Events whose preconditions do not hold leave the affected part of the
/// table unchanged; the turn table's guards keep such events out.
pub fn reduce(state: &GameState, event: GameEvent, draw_count: usize) -> GameState {
    let mut next = state.clone();
    match event {
        GameEvent::DrawCards { origin } => {
            let count = draw_count.min(next.draw_pile.len());
            let drawn: Vec<Card> = next.draw_pile.drain(..count).collect();
            if let Some(player) = next.player_mut(origin) {
                player.cards.extend(drawn);
            }
            next.turn = Turn::Play;
        }
        GameEvent::NextTurn { .. } => {
            if !next.players.is_empty() {
                next.current = (next.current + 1) % next.players.len();
            }
            next.turn = Turn::Stumbling;
            next.pending_attack = None;
        }
        GameEvent::ReportBug { origin, victim, bug } => {
            discard_from_hand(&mut next, origin, Card::Bug(bug));
            next.pending_attack = Some(PendingAttack {
                attacker: origin,
                victim,
                bug,
            });
        }
        GameEvent::ReactWithCard { victim, card, .. } => {
            discard_from_hand(&mut next, victim, card);
            next.pending_attack = None;
        }
        GameEvent::ReactWithoutCard { victim, .. } => {
            lose_mental_health(&mut next, victim);
            next.pending_attack = None;
            next.turn = Turn::Play;
        }
        GameEvent::ResolveStumbling { origin, via } => {
            if let Some(stumbling) = next.pending_stumbling(origin) {
                if let Some(front) = next.front_cards.get_mut(&origin) {
                    if let Some(index) = front.iter().position(|card| *card == stumbling) {
                        front.remove(index);
                        next.discard_heap.push(stumbling);
                    }
                }
            }
            match via {
                Some(card) => discard_from_hand(&mut next, origin, card),
                None => lose_mental_health(&mut next, origin),
            }
            next.turn = Turn::Draw;
        }
        GameEvent::Discard { origin, cards } => {
            for card in cards {
                discard_from_hand(&mut next, origin, card);
            }
        }
    }
    next
}

/// Reducer for the table payload.
#[derive(Clone, Copy, Debug)]
pub struct TurnReducer {
    pub draw_count: usize,
}

#[async_trait]
impl Reducer<GameEvent, GameState> for TurnReducer {
    async fn reduce(&self, state: &GameState, event: GameEvent) -> GameState {
        reduce(state, event, self.draw_count)
    }
}
