//! Card catalog.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CardKind {
    BugReport,
    Excuse,
    Solution,
    SpecialAction,
    Stumbling,
}

/// Attacks. Each one costs its victim a point of mental health unless
/// deflected with an excuse.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BugReport {
    NullPointer,
    OffByOne,
    ClassNotFound,
    SystemHangs,
    CoreDump,
    CustomerHatesUi,
}

impl BugReport {
    pub const ALL: [BugReport; 6] = [
        Self::NullPointer,
        Self::OffByOne,
        Self::ClassNotFound,
        Self::SystemHangs,
        Self::CoreDump,
        Self::CustomerHatesUi,
    ];
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Excuse {
    WorksForMe,
    ItsAFeature,
    ImNotResponsible,
}

impl Excuse {
    pub const ALL: [Excuse; 3] = [Self::WorksForMe, Self::ItsAFeature, Self::ImNotResponsible];
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Solution {
    Coffee,
    CodeFixSession,
    RegularExpression,
}

impl Solution {
    pub const ALL: [Solution; 3] = [Self::Coffee, Self::CodeFixSession, Self::RegularExpression];
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum SpecialAction {
    Refactoring,
    Pwnd,
    SystemIntegration,
    StandupMeeting,
    BoringMeeting,
    CoffeeMachine,
    LanParty,
    RedBullDispenser,
    Heisenbug,
}

impl SpecialAction {
    pub const ALL: [SpecialAction; 9] = [
        Self::Refactoring,
        Self::Pwnd,
        Self::SystemIntegration,
        Self::StandupMeeting,
        Self::BoringMeeting,
        Self::CoffeeMachine,
        Self::LanParty,
        Self::RedBullDispenser,
        Self::Heisenbug,
    ];

    fn copies(&self) -> usize {
        match self {
            Self::Refactoring | Self::Pwnd => 4,
            Self::SystemIntegration => 3,
            Self::StandupMeeting | Self::CoffeeMachine | Self::BoringMeeting => 2,
            Self::LanParty | Self::Heisenbug | Self::RedBullDispenser => 1,
        }
    }
}

/// Cards placed in front of a player that must be dealt with before the
/// player may draw.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Stumbling {
    FortranMaintenance,
    OffTheJobTraining,
}

/// Any card that can sit in a hand, on the draw pile or on the heap.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Card {
    Bug(BugReport),
    Excuse(Excuse),
    Solution(Solution),
    Special(SpecialAction),
    Stumbling(Stumbling),
}

impl Card {
    pub fn kind(&self) -> CardKind {
        match self {
            Self::Bug(_) => CardKind::BugReport,
            Self::Excuse(_) => CardKind::Excuse,
            Self::Solution(_) => CardKind::Solution,
            Self::Special(_) => CardKind::SpecialAction,
            Self::Stumbling(_) => CardKind::Stumbling,
        }
    }

    /// The bug report on this card, if it is one.
    pub fn as_bug(&self) -> Option<BugReport> {
        match self {
            Self::Bug(bug) => Some(*bug),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Role {
    Manager,
    Consultant,
    HonestDeveloper,
    EvilCodeMonkey,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Character {
    MarkZuckerberg,
    KentBeck,
    SteveJobs,
    LinusTorvalds,
    KonradZuse,
    Dummy,
}

impl Character {
    /// Mental health a player starts with.
    pub fn mental_health(&self) -> u32 {
        match self {
            Self::MarkZuckerberg | Self::KonradZuse => 3,
            _ => 4,
        }
    }
}

/// The draw pile for a new game: bug reports, solutions, excuses and
/// special actions, in catalog order.
pub fn playing_deck() -> Vec<Card> {
    let bugs = BugReport::ALL.iter().flat_map(|bug| [Card::Bug(*bug); 4]);
    let solutions = Solution::ALL
        .iter()
        .flat_map(|solution| [Card::Solution(*solution); 2]);
    let excuses = Excuse::ALL.iter().flat_map(|excuse| [Card::Excuse(*excuse); 4]);
    let specials = SpecialAction::ALL
        .iter()
        .flat_map(|special| std::iter::repeat(Card::Special(*special)).take(special.copies()));

    bugs.chain(solutions).chain(excuses).chain(specials).collect()
}
