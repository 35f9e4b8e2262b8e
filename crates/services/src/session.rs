use greeting_core::model::{AchievementId, AchievementRecord, SectionId, Transition, TransitionKind};
use greeting_core::Clock;
use storage::ProgressStore;

use crate::error::NavigationError;
use crate::navigation::NavigationController;
use crate::tracker::ProgressTracker;

/// Top-level object for one visit to the page.
///
/// Owns the single `ProgressTracker` and the `NavigationController`; the
/// presentation layer talks to the page only through this type.
pub struct GreetingSession {
    tracker: ProgressTracker,
    navigation: NavigationController,
}

impl GreetingSession {
    /// Load progress from `store` and start navigation on the landing section.
    ///
    /// Entering the achievements gallery re-evaluates aggregate achievements.
    #[must_use]
    pub fn new(store: ProgressStore) -> Self {
        Self::with_navigation(store, NavigationController::with_default_sections())
    }

    #[must_use]
    pub fn with_navigation(store: ProgressStore, mut navigation: NavigationController) -> Self {
        navigation.register_on_enter(
            SectionId::Achievements,
            Box::new(|tracker: &mut ProgressTracker, _: &Transition| {
                tracker.ensure_derived_achievements()
            }),
        );
        Self {
            tracker: ProgressTracker::load(store),
            navigation,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(ProgressStore::in_memory(clock))
    }

    #[must_use]
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ProgressTracker {
        &mut self.tracker
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationController {
        &mut self.navigation
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `NavigationError` if `section` is not registered.
    pub fn navigate_to(
        &mut self,
        section: SectionId,
        kind: TransitionKind,
    ) -> Result<Transition, NavigationError> {
        self.navigation.navigate_to(&mut self.tracker, section, kind)
    }

    /// # Errors
    ///
    /// Returns `NavigationError` if `raw` is unknown or not registered.
    pub fn navigate_to_str(
        &mut self,
        raw: &str,
        kind: TransitionKind,
    ) -> Result<Transition, NavigationError> {
        self.navigation
            .navigate_to_str(&mut self.tracker, raw, kind)
    }

    pub fn go_back(&mut self) -> Option<Transition> {
        self.navigation.go_back(&mut self.tracker)
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.navigation.can_go_back()
    }

    #[must_use]
    pub fn current_section(&self) -> SectionId {
        self.navigation.current()
    }

    //
    // ─── PROGRESS COMMANDS ─────────────────────────────────────────────────────
    //

    pub fn mark_section_visited(&mut self, section: SectionId) -> bool {
        self.tracker.mark_section_visited(section)
    }

    pub fn mark_interaction_complete(&mut self, section: SectionId, interaction: &str) -> bool {
        self.tracker.mark_interaction_complete(section, interaction)
    }

    pub fn unlock_secret(&mut self, secret: &str) -> bool {
        self.tracker.unlock_secret(secret)
    }

    pub fn add_collectible(&mut self, section: SectionId, collectible: &str) -> bool {
        self.tracker.add_collectible(section, collectible)
    }

    pub fn unlock_achievement(&mut self, id: AchievementId) -> Option<AchievementRecord> {
        self.tracker.unlock_achievement(id)
    }
}
