use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── IDENTIFIERS ───────────────────────────────────────────────────────────────
//

/// Identifier of an achievement.
///
/// Ids outside the built-in catalogue are kept as `Custom` so that callers can
/// still record them; they render with generic metadata. A `Custom` id only
/// comes out of `parse`, so it is trimmed and never spells a catalogued id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AchievementId {
    FirstVisitGallery,
    FirstVisitReasons,
    FirstVisitWishes,
    FirstVisitGames,
    SecretFinder,
    CandleBlower,
    MemoryMaster,
    QuizChampion,
    GameMaster,
    HeartCollector,
    StarCollector,
    Collector,
    Explorer,
    Custom(CustomId),
}

/// Payload of `AchievementId::Custom`, built only by `AchievementId::parse`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomId(String);

impl CustomId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AchievementId {
    /// Every catalogued achievement.
    pub const KNOWN: [AchievementId; 13] = [
        AchievementId::FirstVisitGallery,
        AchievementId::FirstVisitReasons,
        AchievementId::FirstVisitWishes,
        AchievementId::FirstVisitGames,
        AchievementId::SecretFinder,
        AchievementId::CandleBlower,
        AchievementId::MemoryMaster,
        AchievementId::QuizChampion,
        AchievementId::GameMaster,
        AchievementId::HeartCollector,
        AchievementId::StarCollector,
        AchievementId::Collector,
        AchievementId::Explorer,
    ];

    /// Resolves a raw id. Never fails: unknown ids become `Custom`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self::KNOWN
            .into_iter()
            .find(|id| id.as_str() == trimmed)
            .unwrap_or_else(|| AchievementId::Custom(CustomId(trimmed.to_string())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            AchievementId::FirstVisitGallery => "first-visit-gallery",
            AchievementId::FirstVisitReasons => "first-visit-reasons",
            AchievementId::FirstVisitWishes => "first-visit-wishes",
            AchievementId::FirstVisitGames => "first-visit-games",
            AchievementId::SecretFinder => "secret-finder",
            AchievementId::CandleBlower => "candle-blower",
            AchievementId::MemoryMaster => "memory-master",
            AchievementId::QuizChampion => "quiz-champion",
            AchievementId::GameMaster => "game-master",
            AchievementId::HeartCollector => "heart-collector",
            AchievementId::StarCollector => "star-collector",
            AchievementId::Collector => "collector",
            AchievementId::Explorer => "explorer",
            AchievementId::Custom(custom) => custom.as_str(),
        }
    }

    /// Display metadata for this achievement.
    #[must_use]
    pub fn metadata(&self) -> AchievementMeta {
        match self {
            AchievementId::FirstVisitGallery => AchievementMeta::new(
                "Memory Lane",
                "Opened the photo gallery for the first time",
                "📸",
            ),
            AchievementId::FirstVisitReasons => AchievementMeta::new(
                "Heart Reader",
                "Started reading the reasons",
                "💌",
            ),
            AchievementId::FirstVisitWishes => AchievementMeta::new(
                "Wish Maker",
                "Visited the birthday wishes",
                "🎂",
            ),
            AchievementId::FirstVisitGames => AchievementMeta::new(
                "Player One",
                "Entered the mini-games corner",
                "🎮",
            ),
            AchievementId::SecretFinder => AchievementMeta::new(
                "Secret Finder",
                "Found the hidden section",
                "🔐",
            ),
            AchievementId::CandleBlower => AchievementMeta::new(
                "Candle Blower",
                "Blew out all five candles",
                "🕯️",
            ),
            AchievementId::MemoryMaster => AchievementMeta::new(
                "Memory Master",
                "Matched every pair in the memory game",
                "🧠",
            ),
            AchievementId::QuizChampion => AchievementMeta::new(
                "Quiz Champion",
                "Finished the quiz",
                "🏅",
            ),
            AchievementId::GameMaster => AchievementMeta::new(
                "Game Master",
                "Completed every mini-game",
                "👑",
            ),
            AchievementId::HeartCollector => AchievementMeta::new(
                "Heart Collector",
                "Collected all the hidden hearts",
                "💖",
            ),
            AchievementId::StarCollector => AchievementMeta::new(
                "Star Collector",
                "Collected all the hidden stars",
                "⭐",
            ),
            AchievementId::Collector => AchievementMeta::new(
                "Ultimate Collector",
                "Gathered every collectible on the page",
                "💎",
            ),
            AchievementId::Explorer => AchievementMeta::new(
                "Explorer",
                "Visited every main section",
                "🧭",
            ),
            AchievementId::Custom(_) => AchievementMeta::generic(),
        }
    }
}

impl From<String> for AchievementId {
    fn from(raw: String) -> Self {
        AchievementId::parse(&raw)
    }
}

impl From<AchievementId> for String {
    fn from(id: AchievementId) -> Self {
        match id {
            AchievementId::Custom(custom) => custom.0,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── METADATA ──────────────────────────────────────────────────────────────────
//

/// Read-only display data for an achievement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AchievementMeta {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

impl AchievementMeta {
    const fn new(title: &'static str, description: &'static str, icon: &'static str) -> Self {
        Self {
            title,
            description,
            icon,
        }
    }

    /// Fallback used for ids that are not in the catalogue.
    #[must_use]
    pub const fn generic() -> Self {
        Self::new(
            "Achievement Unlocked",
            "You discovered something special!",
            "🏆",
        )
    }
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// A granted achievement, stamped with the time it was unlocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AchievementRecord {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

impl AchievementRecord {
    /// Build a record from catalogue metadata.
    #[must_use]
    pub fn unlocked(id: AchievementId, at: DateTime<Utc>) -> Self {
        let meta = id.metadata();
        Self {
            id,
            title: meta.title.to_string(),
            description: meta.description.to_string(),
            icon: meta.icon.to_string(),
            unlocked_at: at,
        }
    }

    /// Rehydrate a record exactly as it was persisted.
    ///
    /// Stored display text wins over the current catalogue so that a record never
    /// changes once granted.
    #[must_use]
    pub fn from_persisted(
        id: AchievementId,
        title: String,
        description: String,
        icon: String,
        unlocked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            icon,
            unlocked_at,
        }
    }
}
