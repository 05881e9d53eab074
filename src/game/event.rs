//! Events that drive the turn machine and the table reducer.

use crate::core::Event;
use crate::game::cards::{BugReport, Card};
use crate::game::state::PlayerId;
use serde::{Deserialize, Serialize};

/// Something a seated player did. `origin` is always the acting player.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameEvent {
    DrawCards {
        origin: PlayerId,
    },
    NextTurn {
        origin: PlayerId,
    },
    ReportBug {
        origin: PlayerId,
        victim: PlayerId,
        bug: BugReport,
    },
    ReactWithCard {
        origin: PlayerId,
        victim: PlayerId,
        card: Card,
    },
    ReactWithoutCard {
        origin: PlayerId,
        victim: PlayerId,
    },
    ResolveStumbling {
        origin: PlayerId,
        via: Option<Card>,
    },
    Discard {
        origin: PlayerId,
        cards: Vec<Card>,
    },
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum EventKind {
    DrawCards,
    NextTurn,
    ReportBug,
    ReactWithCard,
    ReactWithoutCard,
    ResolveStumbling,
    Discard,
}

impl GameEvent {
    pub fn origin(&self) -> PlayerId {
        match self {
            Self::DrawCards { origin }
            | Self::NextTurn { origin }
            | Self::ReportBug { origin, .. }
            | Self::ReactWithCard { origin, .. }
            | Self::ReactWithoutCard { origin, .. }
            | Self::ResolveStumbling { origin, .. }
            | Self::Discard { origin, .. } => *origin,
        }
    }
}

impl Event for GameEvent {
    type Tag = EventKind;

    fn tag(&self) -> EventKind {
        match self {
            Self::DrawCards { .. } => EventKind::DrawCards,
            Self::NextTurn { .. } => EventKind::NextTurn,
            Self::ReportBug { .. } => EventKind::ReportBug,
            Self::ReactWithCard { .. } => EventKind::ReactWithCard,
            Self::ReactWithoutCard { .. } => EventKind::ReactWithoutCard,
            Self::ResolveStumbling { .. } => EventKind::ResolveStumbling,
            Self::Discard { .. } => EventKind::Discard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_reports_its_origin() {
        let events = [
            GameEvent::DrawCards { origin: PlayerId(3) },
            GameEvent::ReactWithoutCard {
                origin: PlayerId(3),
                victim: PlayerId(1),
            },
            GameEvent::Discard {
                origin: PlayerId(3),
                cards: Vec::new(),
            },
        ];
        assert!(events.iter().all(|event| event.origin() == PlayerId(3)));
    }

    #[test]
    fn tags_match_variants() {
        let event = GameEvent::ReportBug {
            origin: PlayerId(1),
            victim: PlayerId(2),
            bug: BugReport::CoreDump,
        };
        assert_eq!(event.tag(), EventKind::ReportBug);
    }
}
