//! Table payload: players, piles and whose turn it is.

use crate::game::cards::{BugReport, Card, CardKind, Character, Role};
use crate::phase_enum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

phase_enum! {
    /// Phases of a single player's turn.
    pub enum Turn {
        /// Forced cards in front of the current player must be handled.
        Stumbling,
        Draw,
        Play,
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub character: Character,
    pub mental_health: u32,
    pub prestige: u32,
    pub cards: Vec<Card>,
}

impl Player {
    /// A player with an empty hand and the character's full mental health.
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        role: Role,
        character: Character,
        prestige: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            character,
            mental_health: character.mental_health(),
            prestige,
            cards: Vec::new(),
        }
    }

    pub fn holds(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }

    /// Whether every card is in hand, counting duplicates.
    pub fn holds_all(&self, cards: &[Card]) -> bool {
        let mut hand = self.cards.clone();
        cards.iter().all(|card| match hand.iter().position(|held| held == card) {
            Some(index) => {
                hand.remove(index);
                true
            }
            None => false,
        })
    }

    pub fn bugs(&self) -> impl Iterator<Item = BugReport> + '_ {
        self.cards.iter().filter_map(Card::as_bug)
    }

    pub(crate) fn take(&mut self, card: &Card) -> bool {
        match self.cards.iter().position(|held| held == card) {
            Some(index) => {
                self.cards.remove(index);
                true
            }
            None => false,
        }
    }
}

/// An attack waiting for the victim's reaction.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PendingAttack {
    pub attacker: PlayerId,
    pub victim: PlayerId,
    pub bug: BugReport,
}

/// Immutable snapshot of a table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameState {
    pub id: Uuid,
    pub players: Vec<Player>,
    pub draw_pile: Vec<Card>,
    pub discard_heap: Vec<Card>,
    pub front_cards: BTreeMap<PlayerId, Vec<Card>>,
    pub turn: Turn,
    pub current: usize,
    pub pending_attack: Option<PendingAttack>,
}

impl GameState {
    /// A fresh table at the start of the first player's turn.
    pub fn new(players: Vec<Player>, draw_pile: Vec<Card>) -> Self {
        Self {
            id: Uuid::new_v4(),
            players,
            draw_pile,
            discard_heap: Vec::new(),
            front_cards: BTreeMap::new(),
            turn: Turn::Stumbling,
            current: 0,
            pending_attack: None,
        }
    }

    /// Deal `hand_size` cards from the top of the pile to every player in
    /// seat order.
    pub fn deal(mut self, hand_size: usize) -> Self {
        for _ in 0..hand_size {
            for player in &mut self.players {
                if self.draw_pile.is_empty() {
                    return self;
                }
                player.cards.push(self.draw_pile.remove(0));
            }
        }
        self
    }

    /// Place a card in front of a player.
    pub fn with_front_card(mut self, player: PlayerId, card: Card) -> Self {
        self.front_cards.entry(player).or_default().push(card);
        self
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    pub fn current_id(&self) -> Option<PlayerId> {
        self.current_player().map(|player| player.id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    pub fn is_seated(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    pub fn is_current(&self, id: PlayerId) -> bool {
        self.current_id() == Some(id)
    }

    /// The first stumbling card in front of `id`, if any.
    pub fn pending_stumbling(&self, id: PlayerId) -> Option<Card> {
        self.front_cards
            .get(&id)?
            .iter()
            .find(|card| card.kind() == CardKind::Stumbling)
            .copied()
    }

    /// The seat after `id`, wrapping around the table.
    pub fn next_seat(&self, id: PlayerId) -> Option<PlayerId> {
        let index = self.players.iter().position(|player| player.id == id)?;
        let next = self.players.get((index + 1) % self.players.len())?;
        (next.id != id).then_some(next.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Phase;
    use crate::game::cards::{Excuse, Stumbling};

    fn table() -> GameState {
        GameState::new(
            vec![
                Player::new(PlayerId(1), "Lukas", Role::Manager, Character::KentBeck, 3),
                Player::new(PlayerId(2), "David", Role::Consultant, Character::KonradZuse, 3),
            ],
            vec![
                Card::Bug(BugReport::NullPointer),
                Card::Excuse(Excuse::WorksForMe),
                Card::Bug(BugReport::CoreDump),
            ],
        )
    }

    #[test]
    fn new_table_starts_stumbling_at_first_seat() {
        let state = table();
        assert_eq!(state.turn, Turn::Stumbling);
        assert_eq!(state.turn.name(), "Stumbling");
        assert_eq!(state.current_id(), Some(PlayerId(1)));
        assert_eq!(state.player(PlayerId(2)).unwrap().mental_health, 3);
    }

    #[test]
    fn deal_round_robins_until_pile_runs_out() {
        let state = table().deal(2);

        assert_eq!(state.players[0].cards.len(), 2);
        assert_eq!(state.players[1].cards, vec![Card::Excuse(Excuse::WorksForMe)]);
        assert!(state.draw_pile.is_empty());
    }

    #[test]
    fn pending_stumbling_only_sees_stumbling_cards() {
        let state = table()
            .with_front_card(PlayerId(1), Card::Bug(BugReport::OffByOne))
            .with_front_card(PlayerId(1), Card::Stumbling(Stumbling::FortranMaintenance));

        assert_eq!(
            state.pending_stumbling(PlayerId(1)),
            Some(Card::Stumbling(Stumbling::FortranMaintenance))
        );
        assert_eq!(state.pending_stumbling(PlayerId(2)), None);
    }

    #[test]
    fn holds_all_counts_duplicates() {
        let mut player = Player::new(PlayerId(1), "Hans", Role::EvilCodeMonkey, Character::Dummy, 3);
        player.cards = vec![Card::Bug(BugReport::NullPointer)];

        assert!(player.holds_all(&[Card::Bug(BugReport::NullPointer)]));
        assert!(!player.holds_all(&[
            Card::Bug(BugReport::NullPointer),
            Card::Bug(BugReport::NullPointer),
        ]));
    }

    #[test]
    fn next_seat_wraps() {
        let state = table();
        assert_eq!(state.next_seat(PlayerId(2)), Some(PlayerId(1)));
        assert_eq!(state.next_seat(PlayerId(9)), None);
    }

    #[test]
    fn snapshot_survives_json() {
        let state = table().with_front_card(PlayerId(2), Card::Stumbling(Stumbling::OffTheJobTraining));
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
