//! Persisted shape of a visitor's progress.
//!
//! Sets are written as JSON arrays and maps as JSON objects so the document stays
//! plain data; `into_state` rebuilds the typed containers on load.

use chrono::{DateTime, Utc};
use greeting_core::model::{AchievementId, AchievementRecord, ProgressState, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    #[serde(default)]
    pub visited_sections: Vec<String>,
    #[serde(default)]
    pub completed_interactions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub unlocked_secrets: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<AchievementEntry>,
    #[serde(default)]
    pub collectibles: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub last_visit: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

impl SnapshotDocument {
    /// Capture `state`, stamping the document with `saved_at`.
    #[must_use]
    pub fn from_state(state: &ProgressState, saved_at: DateTime<Utc>) -> Self {
        let mut achievements: Vec<AchievementEntry> = state
            .achievements()
            .map(|record| AchievementEntry {
                id: record.id.as_str().to_string(),
                title: record.title.clone(),
                description: record.description.clone(),
                icon: record.icon.clone(),
                unlocked_at: record.unlocked_at,
            })
            .collect();
        achievements.sort_by(|a, b| a.unlocked_at.cmp(&b.unlocked_at).then(a.id.cmp(&b.id)));

        Self {
            visited_sections: state
                .visited_sections()
                .iter()
                .map(|section| section.as_str().to_string())
                .collect(),
            completed_interactions: scoped_to_document(state.completed_interactions()),
            unlocked_secrets: state.unlocked_secrets().iter().cloned().collect(),
            achievements,
            collectibles: scoped_to_document(state.collectibles()),
            last_visit: Some(saved_at),
        }
    }

    /// Rebuild a `ProgressState`.
    ///
    /// Section ids this build does not know are dropped; achievement ids outside
    /// the catalogue are kept as custom achievements.
    #[must_use]
    pub fn into_state(self) -> ProgressState {
        let mut state = ProgressState::new();

        for raw in &self.visited_sections {
            if let Some(section) = known_section(raw) {
                state.visit(section);
            }
        }

        for (raw, items) in &self.completed_interactions {
            if let Some(section) = known_section(raw) {
                for item in items {
                    state.complete_interaction(section, item);
                }
            }
        }

        for secret in &self.unlocked_secrets {
            state.unlock_secret(secret);
        }

        for entry in self.achievements {
            let record = AchievementRecord::from_persisted(
                AchievementId::parse(&entry.id),
                entry.title,
                entry.description,
                entry.icon,
                entry.unlocked_at,
            );
            state.grant(record);
        }

        for (raw, items) in &self.collectibles {
            if let Some(section) = known_section(raw) {
                for item in items {
                    state.add_collectible(section, item);
                }
            }
        }

        if let Some(at) = self.last_visit {
            state.set_last_visit(at);
        }

        state
    }
}

fn scoped_to_document(
    scoped: &BTreeMap<SectionId, BTreeSet<String>>,
) -> BTreeMap<String, Vec<String>> {
    scoped
        .iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(section, items)| (section.as_str().to_string(), items.iter().cloned().collect()))
        .collect()
}

fn known_section(raw: &str) -> Option<SectionId> {
    match raw.parse::<SectionId>() {
        Ok(section) => Some(section),
        Err(err) => {
            warn!(%err, "dropping unknown section from snapshot");
            None
        }
    }
}
