use greeting_core::Clock;
use greeting_core::model::{AchievementId, AchievementRecord, ProgressState, SectionId};
use storage::ProgressStore;
use tracing::{debug, info};

use crate::rules::{CANDLE_COUNT, DERIVED_RULES, MiniGame};

/// Interaction id recorded under the wishes section once every candle is out.
pub const CANDLES_INTERACTION: &str = "candles";

/// Sole owner of a visitor's `ProgressState`.
///
/// Every command that changes the state writes a fresh snapshot through the
/// `ProgressStore` before returning; commands that change nothing do not write.
/// Outside code only ever sees the state through `&ProgressState`.
pub struct ProgressTracker {
    state: ProgressState,
    store: ProgressStore,
}

impl ProgressTracker {
    /// Build a tracker from whatever the store currently holds.
    #[must_use]
    pub fn load(store: ProgressStore) -> Self {
        let state = store.load();
        debug!(
            visited = state.visited_sections().len(),
            achievements = state.achievement_count(),
            "progress loaded"
        );
        Self { state, store }
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.store.clock()
    }

    /// Moves a fixed clock forward; used to space out unlock times. Unlock
    /// stamps and the snapshot's `lastVisit` read the same clock.
    pub fn advance_clock(&mut self, delta: chrono::Duration) {
        self.store.advance_clock(delta);
    }

    //
    // ─── COMMANDS ──────────────────────────────────────────────────────────────
    //

    /// Returns `true` on the first visit to `section`.
    pub fn mark_section_visited(&mut self, section: SectionId) -> bool {
        let added = self.state.visit(section);
        if added {
            debug!(%section, "section visited");
            self.persist();
        }
        added
    }

    pub fn mark_interaction_complete(&mut self, section: SectionId, interaction: &str) -> bool {
        let added = self.state.complete_interaction(section, interaction);
        if added {
            debug!(%section, interaction, "interaction completed");
            self.persist();
        }
        added
    }

    pub fn unlock_secret(&mut self, secret: &str) -> bool {
        let added = self.state.unlock_secret(secret);
        if added {
            debug!(secret, "secret unlocked");
            self.persist();
        }
        added
    }

    pub fn add_collectible(&mut self, section: SectionId, collectible: &str) -> bool {
        let added = self.state.add_collectible(section, collectible);
        if added {
            debug!(%section, collectible, "collectible added");
            self.persist();
        }
        added
    }

    /// Grant `id` unless it is already held.
    ///
    /// Returns the new record, which the caller should announce, or `None` when
    /// the achievement was already unlocked.
    pub fn unlock_achievement(&mut self, id: AchievementId) -> Option<AchievementRecord> {
        if self.state.has_achievement(&id) {
            return None;
        }
        let record = AchievementRecord::unlocked(id, self.store.clock().now());
        if !self.state.grant(record.clone()) {
            return None;
        }
        info!(achievement = %record.id, "achievement unlocked");
        self.persist();
        Some(record)
    }

    /// Evaluate every aggregate rule once and grant those whose prerequisites
    /// are all held. Returns only the newly granted records.
    pub fn ensure_derived_achievements(&mut self) -> Vec<AchievementRecord> {
        let mut unlocked = Vec::new();
        for rule in DERIVED_RULES {
            if self.state.has_achievement(&rule.id) {
                continue;
            }
            if rule.is_satisfied_by(|id| self.state.has_achievement(id)) {
                if let Some(record) = self.unlock_achievement(rule.id.clone()) {
                    unlocked.push(record);
                }
            }
        }
        unlocked
    }

    /// Report how many candles are out. Blowing all of them completes the
    /// wishes section and grants `CandleBlower`.
    pub fn record_candles_blown(&mut self, blown: u32) -> Option<AchievementRecord> {
        if blown < CANDLE_COUNT {
            return None;
        }
        self.mark_interaction_complete(SectionId::Wishes, CANDLES_INTERACTION);
        self.unlock_achievement(AchievementId::CandleBlower)
    }

    /// Report a finished mini-game. Returns the achievements this produced,
    /// including `GameMaster` once every game has been won.
    pub fn record_game_won(&mut self, game: MiniGame) -> Vec<AchievementRecord> {
        let mut unlocked = Vec::new();
        self.mark_interaction_complete(SectionId::Games, game.interaction_id());

        if let Some(id) = game.achievement() {
            unlocked.extend(self.unlock_achievement(id));
        }

        let all_won = MiniGame::ALL.iter().all(|g| {
            self.state
                .interactions(SectionId::Games)
                .any(|done| done == g.interaction_id())
        });
        if all_won {
            unlocked.extend(self.unlock_achievement(AchievementId::GameMaster));
        }
        unlocked
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        self.state.completion_percentage()
    }

    #[must_use]
    pub fn is_section_visited(&self, section: SectionId) -> bool {
        self.state.has_visited(section)
    }

    #[must_use]
    pub fn is_section_completed(&self, section: SectionId) -> bool {
        self.state.is_section_completed(section)
    }

    #[must_use]
    pub fn is_secret_unlocked(&self, secret: &str) -> bool {
        self.state.is_secret_unlocked(secret)
    }

    #[must_use]
    pub fn has_achievement(&self, id: &AchievementId) -> bool {
        self.state.has_achievement(id)
    }

    /// Unlocked achievements, oldest first.
    #[must_use]
    pub fn achievements(&self) -> Vec<&AchievementRecord> {
        let mut records: Vec<_> = self.state.achievements().collect();
        records.sort_by(|a, b| a.unlocked_at.cmp(&b.unlocked_at).then(a.id.cmp(&b.id)));
        records
    }

    #[must_use]
    pub fn collectibles(&self, section: SectionId) -> Vec<&str> {
        self.state.collectibles_in(section).collect()
    }

    #[must_use]
    pub fn interactions(&self, section: SectionId) -> Vec<&str> {
        self.state.interactions(section).collect()
    }

    fn persist(&self) {
        self.store.save(&self.state);
    }
}
