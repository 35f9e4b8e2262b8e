//! Event-to-achievement rules.
//!
//! First-visit rewards live on `SectionId::first_visit_achievement`. This module
//! holds the aggregate rules and the mini-game milestones that callers report.

use std::fmt;
use std::str::FromStr;

use greeting_core::model::AchievementId;
use thiserror::Error;

/// An achievement granted once every prerequisite achievement is held.
#[derive(Debug)]
pub struct DerivedRule {
    pub id: AchievementId,
    pub requires: &'static [AchievementId],
}

impl DerivedRule {
    #[must_use]
    pub fn is_satisfied_by(&self, held: impl Fn(&AchievementId) -> bool) -> bool {
        self.requires.iter().all(held)
    }
}

/// Aggregate rules, evaluated on demand by `ProgressTracker::ensure_derived_achievements`.
///
/// Nothing grants `HeartCollector` or `StarCollector` yet, so `Collector` is
/// currently unreachable.
pub static DERIVED_RULES: &[DerivedRule] = &[
    DerivedRule {
        id: AchievementId::Collector,
        requires: &[
            AchievementId::HeartCollector,
            AchievementId::StarCollector,
            AchievementId::SecretFinder,
        ],
    },
    DerivedRule {
        id: AchievementId::Explorer,
        requires: &[
            AchievementId::FirstVisitGallery,
            AchievementId::FirstVisitReasons,
            AchievementId::FirstVisitWishes,
            AchievementId::FirstVisitGames,
        ],
    },
];

/// Candles on the cake; blowing all of them grants `CandleBlower`.
pub const CANDLE_COUNT: u32 = 5;

/// Mini-games hosted in the games section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MiniGame {
    Memory,
    Quiz,
    Words,
}

impl MiniGame {
    pub const ALL: [MiniGame; 3] = [MiniGame::Memory, MiniGame::Quiz, MiniGame::Words];

    /// Interaction id recorded under the games section when this game is won.
    #[must_use]
    pub fn interaction_id(self) -> &'static str {
        match self {
            MiniGame::Memory => "memory",
            MiniGame::Quiz => "quiz",
            MiniGame::Words => "words",
        }
    }

    #[must_use]
    pub fn achievement(self) -> Option<AchievementId> {
        match self {
            MiniGame::Memory => Some(AchievementId::MemoryMaster),
            MiniGame::Quiz => Some(AchievementId::QuizChampion),
            MiniGame::Words => None,
        }
    }
}

impl fmt::Display for MiniGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interaction_id())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown mini-game: {raw}")]
pub struct ParseMiniGameError {
    pub raw: String,
}

impl FromStr for MiniGame {
    type Err = ParseMiniGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MiniGame::ALL
            .into_iter()
            .find(|game| game.interaction_id() == s.trim())
            .ok_or_else(|| ParseMiniGameError { raw: s.to_string() })
    }
}
