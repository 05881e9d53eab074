//! Turn Session
//!
//! This demo seats three players at one table and plays a few rounds over
//! in-process sessions.
//!
//! Key concepts:
//! - The server drives each turn program, asking the acting player for choices
//! - Attacks ask the victim for a defence over the victim's own link
//! - A participant can also run a program itself and delegate server steps
//! - Refused steps fail a walk without ending the session
//!
//! Run with: cargo run --example turn_session
//! Tune with: TURNSTATE_DRAW_COUNT=3 RUST_LOG=turnstate=trace

use std::sync::Arc;
use turnstate::action::attack_another_player;
use turnstate::config::TableConfig;
use turnstate::game::cards::{playing_deck, Stumbling};
use turnstate::game::{Card, Character, Excuse, GameEvent, GameState, Player, PlayerId, Role, Table};
use turnstate::interpreter::{
    drive_turn, FirstChoice, LocalExecutor, LocalParticipant, RemoteAuthority, TableExecutor,
};
use turnstate::session::{ClientSession, Link, ServerSession};
use turnstate::{logging, Interpreter};

const ROUNDS: usize = 2;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = TableConfig::from_env()?;
    let seats = [
        (PlayerId(1), "Lukas", Role::Manager, Character::KentBeck),
        (PlayerId(2), "David", Role::Consultant, Character::LinusTorvalds),
        (PlayerId(3), "Hans", Role::EvilCodeMonkey, Character::KonradZuse),
    ];
    let players = seats
        .iter()
        .map(|(id, name, role, character)| {
            Player::new(*id, *name, *role, *character, config.starting_prestige)
        })
        .collect();

    let mut state = GameState::new(players, playing_deck())
        .deal(config.hand_size)
        .with_front_card(PlayerId(2), Card::Stumbling(Stumbling::OffTheJobTraining));
    state.players[1].cards.push(Card::Excuse(Excuse::WorksForMe));
    let table = Arc::new(Table::new(config, state)?);

    let mut server_links = Vec::new();
    let mut clients = Vec::new();
    for (id, ..) in seats {
        let (server_end, participant_end) = Link::pair();
        server_links.push((id, server_end));

        let (session, router) = ClientSession::open(id, participant_end);
        let participant = LocalParticipant::new(id, table.subscribe(), Arc::new(FirstChoice));
        tokio::spawn(router.run(Arc::new(LocalExecutor::new(participant))));
        clients.push(session);
    }

    let (server, router) = ServerSession::open(server_links);
    let executor = Arc::new(TableExecutor::new(Arc::clone(&table), Arc::clone(&server)));
    let server_router = tokio::spawn(router.run(executor));

    for _ in 0..ROUNDS * seats.len() {
        let Some(player) = table.state().current_id() else {
            break;
        };
        match drive_turn(&table, &server).await {
            Ok(report) => tracing::info!(%player, ?report, "turn played"),
            Err(err) => {
                tracing::warn!(%player, error = %err, "turn cut short");
                if let Err(err) = table.end_turn(player).await {
                    tracing::warn!(%player, error = %err, "turn could not be passed on");
                    break;
                }
            }
        }
    }

    // The participant whose turn it is attacks on its own initiative.
    let state = table.state();
    if let Some(session) = clients
        .iter()
        .find(|session| state.is_current(session.me()))
    {
        let me = session.me();
        if let Err(err) = table.apply(GameEvent::DrawCards { origin: me }).await {
            tracing::warn!(player = %me, error = %err, "draw refused");
        }
        let interpreter = Interpreter::new(
            RemoteAuthority::new(Arc::clone(session)),
            LocalParticipant::new(me, table.subscribe(), Arc::new(FirstChoice)),
        );
        match interpreter.run(attack_another_player()).await {
            Ok(outcome) => tracing::info!(attacker = %me, ?outcome, "client-initiated attack"),
            Err(err) => tracing::warn!(attacker = %me, error = %err, "attack refused"),
        }
    }

    for player in &table.state().players {
        tracing::info!(
            player = %player.id,
            name = %player.name,
            mental_health = player.mental_health,
            hand = player.cards.len(),
            "final standing"
        );
    }

    server_router.abort();
    Ok(())
}
