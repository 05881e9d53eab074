//! The authoritative table: the turn machine plus its configuration.

use crate::builder::BuildErrors;
use crate::config::{ConfigError, TableConfig};
use crate::game::event::GameEvent;
use crate::game::rules::{turn_table, TurnReducer, TurnTable};
use crate::game::state::{GameState, PlayerId, Turn};
use crate::machine::{Interceptor, StateMachine, TransitionError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

pub type TableMachine = StateMachine<Turn, GameEvent, GameState>;
pub type TableTransitionError = TransitionError<Turn, GameEvent>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildErrors),
}

/// Logs the headline numbers of every committed snapshot.
pub fn logging_interceptor() -> Interceptor<GameState> {
    Arc::new(|state: &GameState| {
        tracing::info!(
            turn = ?state.turn,
            draw_pile = state.draw_pile.len(),
            discard_heap = state.discard_heap.len(),
            current = state.current,
            "table state committed"
        );
    })
}

/// Server-side owner of the turn machine.
///
/// The machine itself does not order concurrent senders, so every event
/// goes through `apply`, which holds a gate for the duration of one send.
pub struct Table {
    machine: TableMachine,
    config: TableConfig,
    gate: Mutex<()>,
}

impl Table {
    /// Open a table on a freshly built turn machine.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: TableConfig, state: GameState) -> Result<Self, TableError> {
        Self::with_model(Arc::new(turn_table()?), config, state)
    }

    /// Open a table on a shared turn machine model.
    pub fn with_model(
        model: Arc<TurnTable>,
        config: TableConfig,
        state: GameState,
    ) -> Result<Self, TableError> {
        config.validate()?;
        let machine = StateMachine::builder()
            .table(model)
            .initial(state.turn.clone())
            .payload(state)
            .reducer(TurnReducer {
                draw_count: config.draw_count,
            })
            .interceptor({
                let log = logging_interceptor();
                move |state: &GameState| log(state)
            })
            .build()?;

        Ok(Self {
            machine,
            config,
            gate: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn machine(&self) -> &TableMachine {
        &self.machine
    }

    pub fn state(&self) -> Arc<GameState> {
        self.machine.payload()
    }

    pub fn phase(&self) -> Turn {
        self.machine.current_phase()
    }

    /// Subscribe to committed snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> {
        self.machine.subscribe()
    }

    /// Send one event and return the snapshots before and after it.
    pub async fn apply(
        &self,
        event: GameEvent,
    ) -> Result<(Arc<GameState>, Arc<GameState>), TableTransitionError> {
        let _turn = self.gate.lock().await;
        let before = self.machine.payload();
        self.machine.send(event).await?;
        Ok((before, self.machine.payload()))
    }

    /// Send `preferred` if the machine accepts it while the gate is held,
    /// otherwise send `fallback`. Returns `true` when `preferred` went out.
    pub async fn apply_or(
        &self,
        preferred: GameEvent,
        fallback: GameEvent,
    ) -> Result<bool, TableTransitionError> {
        let _turn = self.gate.lock().await;
        let fits = self.machine.validate(&preferred).is_ok();
        self.machine
            .send(if fits { preferred } else { fallback })
            .await?;
        Ok(fits)
    }

    /// Hand the turn to the next seat.
    pub async fn end_turn(&self, origin: PlayerId) -> Result<Arc<GameState>, TableTransitionError> {
        let (_, after) = self.apply(GameEvent::NextTurn { origin }).await?;
        tracing::info!(player = %origin, next = ?after.current_id(), "turn ended");
        Ok(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::{BugReport, Card, Character, Role};
    use crate::game::state::Player;

    fn state() -> GameState {
        GameState::new(
            vec![
                Player::new(PlayerId(1), "Lukas", Role::Manager, Character::Dummy, 3),
                Player::new(PlayerId(2), "David", Role::Consultant, Character::Dummy, 3),
            ],
            vec![Card::Bug(BugReport::OffByOne); 6],
        )
    }

    #[tokio::test]
    async fn invalid_config_is_refused() {
        let config = TableConfig {
            draw_count: 0,
            ..TableConfig::default()
        };
        assert!(matches!(Table::new(config, state()), Err(TableError::Config(_))));
    }

    #[tokio::test]
    async fn full_turn_cycles_phases() {
        let table = Table::new(TableConfig::default(), state()).unwrap();

        let (before, after) = table.apply(GameEvent::DrawCards { origin: PlayerId(1) }).await.unwrap();
        assert_eq!(before.draw_pile.len(), 6);
        assert_eq!(after.draw_pile.len(), 4);
        assert_eq!(table.phase(), Turn::Play);

        let after = table.end_turn(PlayerId(1)).await.unwrap();
        assert_eq!(after.current_id(), Some(PlayerId(2)));
        assert_eq!(table.phase(), Turn::Stumbling);
        assert_eq!(
            table.machine().history().get_path(),
            vec![&Turn::Stumbling, &Turn::Play, &Turn::Stumbling]
        );
    }

    #[tokio::test]
    async fn wrong_player_is_refused() {
        let table = Table::new(TableConfig::default(), state()).unwrap();

        let result = table.apply(GameEvent::DrawCards { origin: PlayerId(2) }).await;

        assert!(matches!(result, Err(TransitionError::GuardFailed { .. })));
        assert_eq!(table.phase(), Turn::Stumbling);
    }

    #[tokio::test]
    async fn model_can_be_shared_between_tables() {
        let model = Arc::new(turn_table().unwrap());
        let first = Table::with_model(Arc::clone(&model), TableConfig::default(), state()).unwrap();
        let second = Table::with_model(model, TableConfig::default(), state()).unwrap();

        first.apply(GameEvent::DrawCards { origin: PlayerId(1) }).await.unwrap();

        assert_eq!(first.phase(), Turn::Play);
        assert_eq!(second.phase(), Turn::Stumbling);
        assert_ne!(first.state().id, second.state().id);
    }

    #[tokio::test]
    async fn apply_or_falls_back_when_preferred_is_refused() {
        let table = Table::new(TableConfig::default(), state()).unwrap();

        let sent = table
            .apply_or(
                GameEvent::DrawCards { origin: PlayerId(2) },
                GameEvent::DrawCards { origin: PlayerId(1) },
            )
            .await
            .unwrap();

        assert!(!sent);
        assert_eq!(table.phase(), Turn::Play);
        assert_eq!(table.state().draw_pile.len(), 4);
    }

    #[tokio::test]
    async fn apply_or_prefers_an_accepted_event() {
        let table = Table::new(TableConfig::default(), state()).unwrap();

        let sent = table
            .apply_or(
                GameEvent::DrawCards { origin: PlayerId(1) },
                GameEvent::DrawCards { origin: PlayerId(2) },
            )
            .await
            .unwrap();

        assert!(sent);
        assert_eq!(table.phase(), Turn::Play);
    }
}
