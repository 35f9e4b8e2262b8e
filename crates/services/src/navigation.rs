use std::collections::{BTreeMap, BTreeSet};

use greeting_core::model::{AchievementRecord, SectionId, Transition, TransitionKind};
use tracing::{debug, warn};

use crate::error::NavigationError;
use crate::tracker::ProgressTracker;

/// Extension point run every time a section is entered.
///
/// Handlers see the tracker after the visit has been recorded and return any
/// achievements they unlocked so they reach the presentation layer.
pub type EnterHandler = Box<dyn FnMut(&mut ProgressTracker, &Transition) -> Vec<AchievementRecord>>;

/// Current section plus a back stack over a fixed set of registered sections.
///
/// Navigation state is never persisted: a new controller always starts on the
/// landing section.
pub struct NavigationController {
    registered: BTreeSet<SectionId>,
    current: SectionId,
    history: Vec<SectionId>,
    on_enter: BTreeMap<SectionId, Vec<EnterHandler>>,
}

impl NavigationController {
    /// Landing is always registered since navigation starts there.
    #[must_use]
    pub fn new(sections: impl IntoIterator<Item = SectionId>) -> Self {
        let mut registered: BTreeSet<SectionId> = sections.into_iter().collect();
        registered.insert(SectionId::Landing);
        Self {
            registered,
            current: SectionId::Landing,
            history: Vec::new(),
            on_enter: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_default_sections() -> Self {
        Self::new(SectionId::ALL)
    }

    #[must_use]
    pub fn current(&self) -> SectionId {
        self.current
    }

    #[must_use]
    pub fn history(&self) -> &[SectionId] {
        &self.history
    }

    #[must_use]
    pub fn is_registered(&self, section: SectionId) -> bool {
        self.registered.contains(&section)
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty() && self.current != SectionId::Landing
    }

    /// Append a handler for `section`; handlers run in registration order.
    pub fn register_on_enter(&mut self, section: SectionId, handler: EnterHandler) {
        self.on_enter.entry(section).or_default().push(handler);
    }

    /// Move to `section`, recording the visit and any first-visit reward.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Unregistered` if `section` is not part of this
    /// page. Current section and history are left unchanged.
    pub fn navigate_to(
        &mut self,
        tracker: &mut ProgressTracker,
        section: SectionId,
        kind: TransitionKind,
    ) -> Result<Transition, NavigationError> {
        if !self.is_registered(section) {
            warn!(%section, "navigation to unregistered section refused");
            return Err(NavigationError::Unregistered(section));
        }
        if section != self.current {
            self.history.push(self.current);
        }
        Ok(self.enter(tracker, section, kind))
    }

    /// Like `navigate_to`, for raw ids coming from the host.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::UnknownSection` if `raw` names no section, or
    /// `NavigationError::Unregistered` as `navigate_to` does.
    pub fn navigate_to_str(
        &mut self,
        tracker: &mut ProgressTracker,
        raw: &str,
        kind: TransitionKind,
    ) -> Result<Transition, NavigationError> {
        let section = raw.parse::<SectionId>().map_err(|err| {
            warn!(%err, "navigation to unknown section refused");
            NavigationError::UnknownSection(err.raw)
        })?;
        self.navigate_to(tracker, section, kind)
    }

    /// Return to the most recent history entry.
    ///
    /// The section being left is not pushed, so repeated calls walk the stack
    /// down to empty. Returns `None` when there is nothing to go back to.
    pub fn go_back(&mut self, tracker: &mut ProgressTracker) -> Option<Transition> {
        let previous = self.history.pop()?;
        Some(self.enter(tracker, previous, TransitionKind::Back))
    }

    fn enter(
        &mut self,
        tracker: &mut ProgressTracker,
        section: SectionId,
        kind: TransitionKind,
    ) -> Transition {
        let from = self.current;
        self.current = section;

        let first_visit = tracker.mark_section_visited(section);
        let mut transition = Transition::new(from, section, kind, first_visit);

        if first_visit && !matches!(section, SectionId::Landing | SectionId::Menu) {
            if let Some(id) = section.first_visit_achievement() {
                transition.unlocked.extend(tracker.unlock_achievement(id));
            }
        }

        if let Some(handlers) = self.on_enter.get_mut(&section) {
            for handler in handlers.iter_mut() {
                let unlocked = handler(&mut *tracker, &transition);
                transition.unlocked.extend(unlocked);
            }
        }

        debug!(
            %from,
            to = %section,
            ?kind,
            first_visit,
            depth = self.history.len(),
            "navigated"
        );
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greeting_core::model::AchievementId;
    use greeting_core::time::fixed_clock;
    use storage::ProgressStore;

    fn tracker() -> ProgressTracker {
        ProgressTracker::load(ProgressStore::in_memory(fixed_clock()))
    }

    #[test]
    fn starts_on_landing_without_back() {
        let nav = NavigationController::with_default_sections();
        assert_eq!(nav.current(), SectionId::Landing);
        assert!(nav.history().is_empty());
        assert!(!nav.can_go_back());
    }

    #[test]
    fn first_visit_unlocks_section_achievement_once() {
        let mut tracker = tracker();
        let mut nav = NavigationController::with_default_sections();

        let t = nav
            .navigate_to(&mut tracker, SectionId::Gallery, TransitionKind::Fade)
            .unwrap();
        assert!(t.first_visit);
        assert_eq!(t.unlocked.len(), 1);
        assert_eq!(t.unlocked[0].id, AchievementId::FirstVisitGallery);

        nav.navigate_to(&mut tracker, SectionId::Menu, TransitionKind::Slide)
            .unwrap();
        let again = nav
            .navigate_to(&mut tracker, SectionId::Gallery, TransitionKind::Fade)
            .unwrap();
        assert!(!again.first_visit);
        assert!(again.unlocked.is_empty());
    }

    #[test]
    fn menu_first_visit_grants_nothing() {
        let mut tracker = tracker();
        let mut nav = NavigationController::with_default_sections();
        let t = nav
            .navigate_to(&mut tracker, SectionId::Menu, TransitionKind::Zoom)
            .unwrap();
        assert!(t.first_visit);
        assert!(t.unlocked.is_empty());
        assert_eq!(t.kind, TransitionKind::Zoom);
    }

    #[test]
    fn reentering_current_section_keeps_history() {
        let mut tracker = tracker();
        let mut nav = NavigationController::with_default_sections();
        nav.navigate_to(&mut tracker, SectionId::Menu, TransitionKind::Fade)
            .unwrap();
        let t = nav
            .navigate_to(&mut tracker, SectionId::Menu, TransitionKind::Fade)
            .unwrap();
        assert_eq!(t.from, t.to);
        assert_eq!(nav.history(), &[SectionId::Landing]);
    }

    #[test]
    fn unregistered_section_is_refused() {
        let mut tracker = tracker();
        let mut nav = NavigationController::new([SectionId::Menu, SectionId::Gallery]);
        let err = nav
            .navigate_to(&mut tracker, SectionId::Secret, TransitionKind::Fade)
            .unwrap_err();
        assert_eq!(err, NavigationError::Unregistered(SectionId::Secret));
        assert_eq!(nav.current(), SectionId::Landing);
        assert!(!tracker.is_section_visited(SectionId::Secret));
    }

    #[test]
    fn on_enter_handlers_run_in_order() {
        let mut tracker = tracker();
        let mut nav = NavigationController::with_default_sections();
        nav.register_on_enter(
            SectionId::Wishes,
            Box::new(
                |tracker: &mut ProgressTracker, _: &Transition| -> Vec<AchievementRecord> {
                    tracker
                        .unlock_achievement(AchievementId::CandleBlower)
                        .into_iter()
                        .collect()
                },
            ),
        );
        nav.register_on_enter(
            SectionId::Wishes,
            Box::new(
                |tracker: &mut ProgressTracker, transition: &Transition| -> Vec<AchievementRecord> {
                    assert!(tracker.has_achievement(&AchievementId::CandleBlower));
                    assert_eq!(transition.to, SectionId::Wishes);
                    Vec::new()
                },
            ),
        );

        let t = nav
            .navigate_to(&mut tracker, SectionId::Wishes, TransitionKind::Fade)
            .unwrap();
        let ids: Vec<_> = t.unlocked.iter().map(|r| r.id.clone()).collect();
        assert_eq!(
            ids,
            vec![AchievementId::FirstVisitWishes, AchievementId::CandleBlower]
        );
    }
}
