use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::achievement::AchievementId;

/// One of the fixed content areas of the greeting page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionId {
    Landing,
    Menu,
    Gallery,
    Reasons,
    Wishes,
    Games,
    Secret,
    Achievements,
}

impl SectionId {
    /// Every section, in page order.
    pub const ALL: [SectionId; 8] = [
        SectionId::Landing,
        SectionId::Menu,
        SectionId::Gallery,
        SectionId::Reasons,
        SectionId::Wishes,
        SectionId::Games,
        SectionId::Secret,
        SectionId::Achievements,
    ];

    /// Sections that count toward the completion percentage.
    pub const PRIMARY: [SectionId; 4] = [
        SectionId::Gallery,
        SectionId::Reasons,
        SectionId::Wishes,
        SectionId::Games,
    ];

    /// Returns the stable wire identifier used in snapshots and host commands.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Landing => "landing",
            SectionId::Menu => "menu",
            SectionId::Gallery => "gallery",
            SectionId::Reasons => "reasons",
            SectionId::Wishes => "wishes",
            SectionId::Games => "games",
            SectionId::Secret => "secret",
            SectionId::Achievements => "achievements",
        }
    }

    #[must_use]
    pub fn is_primary(self) -> bool {
        Self::PRIMARY.contains(&self)
    }

    /// Number of distinct interactions needed before the section counts as completed.
    #[must_use]
    pub fn completion_threshold(self) -> usize {
        match self {
            SectionId::Gallery => 2,
            SectionId::Reasons => 3,
            SectionId::Wishes | SectionId::Games => 1,
            SectionId::Landing | SectionId::Menu | SectionId::Secret | SectionId::Achievements => 1,
        }
    }

    /// Achievement granted the first time this section is entered, if any.
    #[must_use]
    pub fn first_visit_achievement(self) -> Option<AchievementId> {
        match self {
            SectionId::Gallery => Some(AchievementId::FirstVisitGallery),
            SectionId::Reasons => Some(AchievementId::FirstVisitReasons),
            SectionId::Wishes => Some(AchievementId::FirstVisitWishes),
            SectionId::Games => Some(AchievementId::FirstVisitGames),
            SectionId::Secret => Some(AchievementId::SecretFinder),
            SectionId::Landing | SectionId::Menu | SectionId::Achievements => None,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a raw identifier names no known section.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown section: {raw}")]
pub struct ParseSectionError {
    pub raw: String,
}

impl FromStr for SectionId {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SectionId::ALL
            .into_iter()
            .find(|section| section.as_str() == trimmed)
            .ok_or_else(|| ParseSectionError {
                raw: s.to_string(),
            })
    }
}
