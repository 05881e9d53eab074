//! The action algebra.
//!
//! Turn content is written as a [`Program`]: a tree of primitive steps
//! whose shape depends on the results of earlier steps. Building a program
//! performs no effect. An interpreter walks it and resolves each step on
//! the side that owns it (see [`Side`]).

mod primitive;
mod program;
mod turns;

pub use primitive::{FromReply, Outcome, Reply, Request, Side};
pub use program::{
    attack_player, check_stumbling, defend_attack, discard, done, draw_cards, get_game_state,
    handle_stumbling, play_card, select_attack, select_discard_cards, select_player,
    select_response, Next, Program, Step,
};
pub use turns::{attack_another_player, attempt_to_handle_stumbling, finish_turn, play_turn, TurnReport};
