use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::achievement::{AchievementId, AchievementRecord};
use crate::model::section::SectionId;

/// Canonical, one-way progress of a visitor.
///
/// Every container only grows: no method removes a member. Mutators return
/// `true` when the call actually changed the state, which is the caller's cue
/// to persist and to notify.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    visited_sections: BTreeSet<SectionId>,
    completed_interactions: BTreeMap<SectionId, BTreeSet<String>>,
    unlocked_secrets: BTreeSet<String>,
    achievements: BTreeMap<AchievementId, AchievementRecord>,
    collectibles: BTreeMap<SectionId, BTreeSet<String>>,
    last_visit: Option<DateTime<Utc>>,
}

impl ProgressState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // ─── MUTATION ──────────────────────────────────────────────────────────────
    //

    pub fn visit(&mut self, section: SectionId) -> bool {
        self.visited_sections.insert(section)
    }

    pub fn complete_interaction(&mut self, section: SectionId, interaction: &str) -> bool {
        insert_scoped(&mut self.completed_interactions, section, interaction)
    }

    pub fn unlock_secret(&mut self, secret: &str) -> bool {
        if self.unlocked_secrets.contains(secret) {
            return false;
        }
        self.unlocked_secrets.insert(secret.to_string())
    }

    pub fn add_collectible(&mut self, section: SectionId, collectible: &str) -> bool {
        insert_scoped(&mut self.collectibles, section, collectible)
    }

    /// Insert a record unless one with the same id already exists.
    ///
    /// An existing record is never replaced.
    pub fn grant(&mut self, record: AchievementRecord) -> bool {
        if self.achievements.contains_key(&record.id) {
            return false;
        }
        self.achievements.insert(record.id.clone(), record);
        true
    }

    pub fn set_last_visit(&mut self, at: DateTime<Utc>) {
        self.last_visit = Some(at);
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn has_visited(&self, section: SectionId) -> bool {
        self.visited_sections.contains(&section)
    }

    #[must_use]
    pub fn visited_sections(&self) -> &BTreeSet<SectionId> {
        &self.visited_sections
    }

    /// Interactions recorded for a section; empty when none were recorded.
    pub fn interactions(&self, section: SectionId) -> impl Iterator<Item = &str> {
        scoped(&self.completed_interactions, section)
    }

    #[must_use]
    pub fn interaction_count(&self, section: SectionId) -> usize {
        self.completed_interactions
            .get(&section)
            .map_or(0, BTreeSet::len)
    }

    #[must_use]
    pub fn completed_interactions(&self) -> &BTreeMap<SectionId, BTreeSet<String>> {
        &self.completed_interactions
    }

    #[must_use]
    pub fn is_secret_unlocked(&self, secret: &str) -> bool {
        self.unlocked_secrets.contains(secret)
    }

    #[must_use]
    pub fn unlocked_secrets(&self) -> &BTreeSet<String> {
        &self.unlocked_secrets
    }

    pub fn collectibles_in(&self, section: SectionId) -> impl Iterator<Item = &str> {
        scoped(&self.collectibles, section)
    }

    #[must_use]
    pub fn collectibles(&self) -> &BTreeMap<SectionId, BTreeSet<String>> {
        &self.collectibles
    }

    #[must_use]
    pub fn has_achievement(&self, id: &AchievementId) -> bool {
        self.achievements.contains_key(id)
    }

    #[must_use]
    pub fn achievement(&self, id: &AchievementId) -> Option<&AchievementRecord> {
        self.achievements.get(id)
    }

    pub fn achievements(&self) -> impl Iterator<Item = &AchievementRecord> {
        self.achievements.values()
    }

    #[must_use]
    pub fn achievement_count(&self) -> usize {
        self.achievements.len()
    }

    #[must_use]
    pub fn last_visit(&self) -> Option<DateTime<Utc>> {
        self.last_visit
    }

    /// Percentage of primary sections visited, rounded to the nearest integer.
    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        let total = SectionId::PRIMARY.len();
        let visited = SectionId::PRIMARY
            .iter()
            .filter(|section| self.visited_sections.contains(section))
            .count();
        // total is a non-zero constant, so the ratio stays within 0..=100
        let pct = (100.0 * visited as f64 / total as f64).round();
        pct.clamp(0.0, 100.0) as u8
    }

    #[must_use]
    pub fn is_section_completed(&self, section: SectionId) -> bool {
        self.interaction_count(section) >= section.completion_threshold()
    }
}

fn insert_scoped(
    map: &mut BTreeMap<SectionId, BTreeSet<String>>,
    section: SectionId,
    item: &str,
) -> bool {
    let set = map.entry(section).or_default();
    if set.contains(item) {
        return false;
    }
    set.insert(item.to_string())
}

fn scoped(
    map: &BTreeMap<SectionId, BTreeSet<String>>,
    section: SectionId,
) -> impl Iterator<Item = &str> {
    map.get(&section)
        .into_iter()
        .flat_map(|set| set.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn visit_reports_first_time_only() {
        let mut state = ProgressState::new();
        assert!(state.visit(SectionId::Gallery));
        assert!(!state.visit(SectionId::Gallery));
        assert_eq!(state.visited_sections().len(), 1);
    }

    #[test]
    fn completion_counts_primary_sections_only() {
        let mut state = ProgressState::new();
        state.visit(SectionId::Landing);
        state.visit(SectionId::Menu);
        assert_eq!(state.completion_percentage(), 0);

        state.visit(SectionId::Gallery);
        state.visit(SectionId::Wishes);
        assert_eq!(state.completion_percentage(), 50);

        state.visit(SectionId::Secret);
        assert_eq!(state.completion_percentage(), 50);

        state.visit(SectionId::Reasons);
        assert_eq!(state.completion_percentage(), 75);

        state.visit(SectionId::Games);
        assert_eq!(state.completion_percentage(), 100);
    }

    #[test]
    fn reasons_needs_three_distinct_interactions() {
        let mut state = ProgressState::new();
        assert!(!state.is_section_completed(SectionId::Reasons));

        state.complete_interaction(SectionId::Reasons, "reason-1");
        state.complete_interaction(SectionId::Reasons, "reason-2");
        assert!(!state.is_section_completed(SectionId::Reasons));

        state.complete_interaction(SectionId::Reasons, "reason-3");
        assert!(state.is_section_completed(SectionId::Reasons));

        assert!(!state.complete_interaction(SectionId::Reasons, "reason-3"));
        assert_eq!(state.interaction_count(SectionId::Reasons), 3);
        assert!(state.is_section_completed(SectionId::Reasons));
    }

    #[test]
    fn grant_keeps_first_record() {
        let mut state = ProgressState::new();
        let first = AchievementRecord::unlocked(AchievementId::CandleBlower, fixed_now());
        assert!(state.grant(first.clone()));

        let later = AchievementRecord::unlocked(
            AchievementId::CandleBlower,
            fixed_now() + chrono::Duration::hours(1),
        );
        assert!(!state.grant(later));
        assert_eq!(state.achievement(&AchievementId::CandleBlower), Some(&first));
        assert_eq!(state.achievement_count(), 1);
    }

    #[test]
    fn scoped_sets_are_independent() {
        let mut state = ProgressState::new();
        assert!(state.add_collectible(SectionId::Gallery, "heart-1"));
        assert!(state.add_collectible(SectionId::Wishes, "heart-1"));
        assert!(!state.add_collectible(SectionId::Gallery, "heart-1"));

        let gallery: Vec<&str> = state.collectibles_in(SectionId::Gallery).collect();
        assert_eq!(gallery, vec!["heart-1"]);
        assert_eq!(state.collectibles_in(SectionId::Games).count(), 0);
    }

    #[test]
    fn secrets_are_idempotent() {
        let mut state = ProgressState::new();
        assert!(state.unlock_secret("konami"));
        assert!(!state.unlock_secret("konami"));
        assert!(state.is_secret_unlocked("konami"));
    }
}
