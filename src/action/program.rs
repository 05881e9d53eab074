//! Programs: primitive steps chained by continuations.
//!
//! A [`Program`] describes turn content without running it. It is either
//! finished or one pending primitive plus the queue of continuations that
//! consume that primitive's result. [`Program::and_then`] appends to the
//! queue instead of wrapping the previous continuation, so a walk applies
//! one continuation per step and call depth stays flat however long the
//! chain. The queue is type-erased inside this module only; every value
//! entering or leaving it is typed by the [`Step`] it came from.
//!
//! Programs are built with [`Program::and_then`] or the [`program!`]
//! macro and consumed by exactly one interpreter walk.
//!
//! [`program!`]: crate::program

use crate::action::primitive::{Outcome, Request, Side};
use crate::game::{BugReport, Card, GameState, PlayerId};
use std::any::{self, Any};
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Value = Box<dyn Any + Send>;
type Cont = Box<dyn FnOnce(Value) -> Chain + Send>;

enum Node {
    Done(Value),
    Pending(Request),
}

/// A node and the continuations still waiting on it.
///
/// A `Done` node never has continuations left; [`settle`] keeps it so.
struct Chain {
    node: Node,
    rest: VecDeque<Cont>,
}

fn unerase<T: 'static>(value: Value) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => unreachable!("program value is not a {}", any::type_name::<T>()),
    }
}

/// Feed `value` through queued continuations until a primitive is pending
/// or the queue is empty.
fn settle(value: Value, mut rest: VecDeque<Cont>) -> Chain {
    let mut value = value;
    while let Some(next) = rest.pop_front() {
        let following = next(value);
        for cont in following.rest.into_iter().rev() {
            rest.push_front(cont);
        }
        match following.node {
            Node::Done(result) => value = result,
            pending => return Chain { node: pending, rest },
        }
    }
    Chain {
        node: Node::Done(value),
        rest,
    }
}

pub struct Program<A> {
    chain: Chain,
    result: PhantomData<fn() -> A>,
}

/// The rest of a program, given one primitive's result.
pub struct Next<R, A> {
    rest: VecDeque<Cont>,
    types: PhantomData<fn(R) -> A>,
}

impl<R: Send + 'static, A> Next<R, A> {
    pub fn resume(self, result: R) -> Program<A> {
        Program::from_chain(settle(Box::new(result), self.rest))
    }
}

/// One program node, opened up for an interpreter.
pub enum Step<A> {
    Done(A),
    CheckStumbling(Next<Option<Card>, A>),
    SelectResponse(Next<Option<Card>, A>),
    PlayCard(Next<Card, A>),
    SelectPlayer(Next<PlayerId, A>),
    SelectAttack(Next<BugReport, A>),
    SelectDiscardCards {
        amount: usize,
        next: Next<Vec<Card>, A>,
    },
    GetGameState(Next<Arc<GameState>, A>),
    DrawCards(Next<Vec<Card>, A>),
    AttackPlayer {
        target: PlayerId,
        bug: BugReport,
        next: Next<Outcome, A>,
    },
    DefendAttack {
        defence: Option<Card>,
        next: Next<Outcome, A>,
    },
    HandleStumbling {
        via: Option<Card>,
        next: Next<Outcome, A>,
    },
    Discard {
        cards: Vec<Card>,
        next: Next<(), A>,
    },
}

impl<A> Program<A> {
    fn from_chain(chain: Chain) -> Self {
        Self {
            chain,
            result: PhantomData,
        }
    }

    fn pending(request: Request) -> Self {
        Self::from_chain(Chain {
            node: Node::Pending(request),
            rest: VecDeque::new(),
        })
    }

    pub fn is_done(&self) -> bool {
        matches!(self.chain.node, Node::Done(_))
    }

    /// The pending primitive, or `None` for a finished program.
    pub fn request(&self) -> Option<Request> {
        match &self.chain.node {
            Node::Done(_) => None,
            Node::Pending(request) => Some(request.clone()),
        }
    }

    /// Who must resolve the pending primitive.
    pub fn side(&self) -> Option<Side> {
        match &self.chain.node {
            Node::Done(_) => None,
            Node::Pending(request) => Some(request.side()),
        }
    }
}

impl<A: Send + 'static> Program<A> {
    /// Run `f` on this program's result to get the program that follows.
    pub fn and_then<B, F>(self, f: F) -> Program<B>
    where
        B: 'static,
        F: FnOnce(A) -> Program<B> + Send + 'static,
    {
        let Chain { node, mut rest } = self.chain;
        match node {
            Node::Done(value) => f(unerase(value)),
            pending => {
                rest.push_back(Box::new(move |value: Value| f(unerase(value)).chain));
                Program::from_chain(Chain {
                    node: pending,
                    rest,
                })
            }
        }
    }

    pub fn map<B, F>(self, f: F) -> Program<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        self.and_then(move |result| done(f(result)))
    }

    /// Run this program, drop its result, then run `other`.
    pub fn then<B>(self, other: Program<B>) -> Program<B>
    where
        B: Send + 'static,
    {
        self.and_then(move |_| other)
    }

    /// Open the current node: the result, or the pending primitive with
    /// the continuation that takes its answer.
    pub fn into_step(self) -> Step<A> {
        let Chain { node, rest } = self.chain;
        let request = match node {
            Node::Done(value) => return Step::Done(unerase(value)),
            Node::Pending(request) => request,
        };
        match request {
            Request::CheckStumbling => Step::CheckStumbling(next(rest)),
            Request::SelectResponse => Step::SelectResponse(next(rest)),
            Request::PlayCard => Step::PlayCard(next(rest)),
            Request::SelectPlayer => Step::SelectPlayer(next(rest)),
            Request::SelectAttack => Step::SelectAttack(next(rest)),
            Request::SelectDiscardCards { amount } => Step::SelectDiscardCards {
                amount,
                next: next(rest),
            },
            Request::GetGameState => Step::GetGameState(next(rest)),
            Request::DrawCards => Step::DrawCards(next(rest)),
            Request::AttackPlayer { target, bug } => Step::AttackPlayer {
                target,
                bug,
                next: next(rest),
            },
            Request::DefendAttack { defence } => Step::DefendAttack {
                defence,
                next: next(rest),
            },
            Request::HandleStumbling { via } => Step::HandleStumbling {
                via,
                next: next(rest),
            },
            Request::Discard { cards } => Step::Discard {
                cards,
                next: next(rest),
            },
        }
    }
}

fn next<R, A>(rest: VecDeque<Cont>) -> Next<R, A> {
    Next {
        rest,
        types: PhantomData,
    }
}

impl<A: fmt::Debug + 'static> fmt::Debug for Program<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.chain.node {
            Node::Done(value) => match value.downcast_ref::<A>() {
                Some(result) => f.debug_tuple("Done").field(result).finish(),
                None => f.write_str("Program"),
            },
            Node::Pending(request) => f.debug_tuple("Step").field(request).finish(),
        }
    }
}

pub fn done<A: Send + 'static>(result: A) -> Program<A> {
    Program::from_chain(Chain {
        node: Node::Done(Box::new(result)),
        rest: VecDeque::new(),
    })
}

/// The stumbling card in front of the acting player, if any.
pub fn check_stumbling() -> Program<Option<Card>> {
    Program::pending(Request::CheckStumbling)
}

/// A card to answer with, if the participant wants to.
pub fn select_response() -> Program<Option<Card>> {
    Program::pending(Request::SelectResponse)
}

pub fn play_card() -> Program<Card> {
    Program::pending(Request::PlayCard)
}

pub fn select_player() -> Program<PlayerId> {
    Program::pending(Request::SelectPlayer)
}

pub fn select_attack() -> Program<BugReport> {
    Program::pending(Request::SelectAttack)
}

pub fn select_discard_cards(amount: usize) -> Program<Vec<Card>> {
    Program::pending(Request::SelectDiscardCards { amount })
}

pub fn get_game_state() -> Program<Arc<GameState>> {
    Program::pending(Request::GetGameState)
}

/// Cards drawn into the acting player's hand.
pub fn draw_cards() -> Program<Vec<Card>> {
    Program::pending(Request::DrawCards)
}

/// `Success` when the bug lands, `Failure` when it is deflected.
pub fn attack_player(target: PlayerId, bug: BugReport) -> Program<Outcome> {
    Program::pending(Request::AttackPlayer { target, bug })
}

/// `Success` when the defence holds.
pub fn defend_attack(defence: Option<Card>) -> Program<Outcome> {
    Program::pending(Request::DefendAttack { defence })
}

/// `Success` when a card was spent on the stumbling block.
pub fn handle_stumbling(via: Option<Card>) -> Program<Outcome> {
    Program::pending(Request::HandleStumbling { via })
}

pub fn discard(cards: Vec<Card>) -> Program<()> {
    Program::pending(Request::Discard { cards })
}

/// Sequential notation for programs.
///
/// `let pattern = program;` binds a step's result for the rest of the
/// block, `program;` runs a step for its effect only, and the final
/// expression is the program the block ends with.
///
/// # Example
///
/// ```
/// use turnstate::action::{attack_player, select_attack, select_player, Outcome, Program};
/// use turnstate::program;
///
/// let attack: Program<Outcome> = program! {
///     let target = select_player();
///     let bug = select_attack();
///     attack_player(target, bug)
/// };
/// assert!(!attack.is_done());
/// ```
#[macro_export]
macro_rules! program {
    (let $pattern:pat = $step:expr; $($rest:tt)+) => {
        $crate::action::Program::and_then($step, move |$pattern| $crate::program!($($rest)+))
    };
    ($step:expr; $($rest:tt)+) => {
        $crate::action::Program::and_then($step, move |_| $crate::program!($($rest)+))
    };
    ($last:expr) => {
        $last
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolves every step from fixed answers.
    fn resolve<A: Send + 'static>(mut program: Program<A>, log: &mut Vec<Request>) -> A {
        loop {
            if let Some(request) = program.request() {
                log.push(request);
            }
            program = match program.into_step() {
                Step::Done(result) => return result,
                Step::CheckStumbling(next) => next.resume(None),
                Step::SelectResponse(next) => next.resume(None),
                Step::PlayCard(next) => next.resume(Card::Bug(BugReport::CoreDump)),
                Step::SelectPlayer(next) => next.resume(PlayerId(2)),
                Step::SelectAttack(next) => next.resume(BugReport::OffByOne),
                Step::SelectDiscardCards { amount, next } => {
                    next.resume(vec![Card::Bug(BugReport::NullPointer); amount])
                }
                Step::GetGameState(next) => {
                    next.resume(Arc::new(GameState::new(Vec::new(), Vec::new())))
                }
                Step::DrawCards(next) => next.resume(vec![Card::Bug(BugReport::SystemHangs)]),
                Step::AttackPlayer { next, .. } => next.resume(Outcome::Success),
                Step::DefendAttack { next, .. } => next.resume(Outcome::Failure),
                Step::HandleStumbling { next, .. } => next.resume(Outcome::Success),
                Step::Discard { next, .. } => next.resume(()),
            };
        }
    }

    #[test]
    fn building_does_not_run_anything() {
        let program = select_player().and_then(|_| -> Program<()> {
            panic!("continuation must not run while building")
        });
        assert_eq!(program.request(), Some(Request::SelectPlayer));
    }

    #[test]
    fn and_then_chains_into_the_continuation() {
        let program = select_player().and_then(|target| attack_player(target, BugReport::CoreDump));

        let mut log = Vec::new();
        let outcome = resolve(program, &mut log);

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(
            log,
            vec![
                Request::SelectPlayer,
                Request::AttackPlayer {
                    target: PlayerId(2),
                    bug: BugReport::CoreDump,
                },
            ]
        );
    }

    #[test]
    fn branches_only_contain_the_path_taken() {
        let program = check_stumbling().and_then(|pending| match pending {
            Some(card) => handle_stumbling(Some(card)),
            None => done(Outcome::Success),
        });

        let mut log = Vec::new();
        assert_eq!(resolve(program, &mut log), Outcome::Success);
        assert_eq!(log, vec![Request::CheckStumbling]);
    }

    #[test]
    fn then_discards_the_first_result() {
        let program = draw_cards().then(select_discard_cards(2));

        let mut log = Vec::new();
        let cards = resolve(program, &mut log);

        assert_eq!(cards.len(), 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn macro_binds_and_sequences() {
        let program: Program<(PlayerId, Vec<Card>)> = program! {
            let target = select_player();
            discard(Vec::new());
            let drawn = draw_cards();
            done((target, drawn))
        };

        let mut log = Vec::new();
        let (target, drawn) = resolve(program, &mut log);

        assert_eq!(target, PlayerId(2));
        assert_eq!(drawn, vec![Card::Bug(BugReport::SystemHangs)]);
        assert_eq!(
            log,
            vec![
                Request::SelectPlayer,
                Request::Discard { cards: Vec::new() },
                Request::DrawCards,
            ]
        );
    }

    #[test]
    fn left_nested_chains_resolve_in_order() {
        let mut program = done(0usize);
        for _ in 0..100_000 {
            program = program.and_then(|count| draw_cards().map(move |_| count + 1));
        }

        let mut log = Vec::new();
        assert_eq!(resolve(program, &mut log), 100_000);
        assert_eq!(log.len(), 100_000);
    }

    #[test]
    fn long_unrun_chain_drops_cleanly() {
        let mut program = select_player().map(|_| 0usize);
        for _ in 0..100_000 {
            program = program.and_then(|count| draw_cards().map(move |_| count + 1));
        }
        assert_eq!(program.request(), Some(Request::SelectPlayer));
        drop(program);
    }

    #[test]
    fn resumed_program_stops_at_the_next_pending_step() {
        let program = draw_cards()
            .map(|cards| cards.len())
            .and_then(|drawn| select_discard_cards(drawn).map(move |cards| (drawn, cards)));

        let next = match program.into_step() {
            Step::DrawCards(next) => next,
            _ => panic!("expected a pending draw"),
        };
        let program = next.resume(vec![Card::Bug(BugReport::CoreDump); 2]);

        assert_eq!(program.request(), Some(Request::SelectDiscardCards { amount: 2 }));
    }

    #[test]
    fn debug_shows_pending_step() {
        assert_eq!(format!("{:?}", done(3)), "Done(3)");
        assert_eq!(format!("{:?}", draw_cards()), "Step(DrawCards)");
    }
}
