use std::sync::Arc;

use chrono::Duration;
use greeting_core::model::{AchievementId, AchievementRecord, ProgressState, SectionId};
use greeting_core::time::{fixed_clock, fixed_now};
use storage::{JsonFileStore, KeyValueStore, ProgressStore, SqliteStore};

fn populated_state() -> ProgressState {
    let mut state = ProgressState::new();
    state.visit(SectionId::Landing);
    state.visit(SectionId::Gallery);
    state.visit(SectionId::Reasons);
    state.complete_interaction(SectionId::Gallery, "photo-1");
    state.complete_interaction(SectionId::Gallery, "photo-2");
    state.complete_interaction(SectionId::Reasons, "reason-4");
    state.unlock_secret("konami");
    state.add_collectible(SectionId::Wishes, "heart-1");
    state.add_collectible(SectionId::Gallery, "star-3");
    state.grant(AchievementRecord::unlocked(
        AchievementId::FirstVisitGallery,
        fixed_now(),
    ));
    state.grant(AchievementRecord::unlocked(
        AchievementId::parse("night-owl"),
        fixed_now() + Duration::minutes(2),
    ));
    state
}

fn assert_same_progress(loaded: &ProgressState, expected: &ProgressState) {
    assert_eq!(loaded.visited_sections(), expected.visited_sections());
    assert_eq!(loaded.completed_interactions(), expected.completed_interactions());
    assert_eq!(loaded.unlocked_secrets(), expected.unlocked_secrets());
    assert_eq!(loaded.collectibles(), expected.collectibles());
    let loaded_records: Vec<_> = loaded.achievements().collect();
    let expected_records: Vec<_> = expected.achievements().collect();
    assert_eq!(loaded_records, expected_records);
}

fn round_trip(backend: Arc<dyn KeyValueStore>) {
    let expected = populated_state();
    let store = ProgressStore::new(Arc::clone(&backend), fixed_clock());
    store.try_save(&expected).expect("save");

    let reopened = ProgressStore::new(backend, fixed_clock());
    let loaded = reopened.try_load().expect("load").expect("snapshot present");
    assert_same_progress(&loaded, &expected);
    assert_eq!(loaded.last_visit(), Some(fixed_now()));
}

#[test]
fn sqlite_round_trips_progress() {
    let store = SqliteStore::open_in_memory().expect("open");
    round_trip(Arc::new(store));
}

#[test]
fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.sqlite3");
    let expected = populated_state();

    {
        let store = SqliteStore::open(&path).expect("open");
        ProgressStore::new(Arc::new(store), fixed_clock()).save(&expected);
    }

    let store = SqliteStore::open(&path).expect("reopen");
    let loaded = ProgressStore::new(Arc::new(store), fixed_clock()).load();
    assert_same_progress(&loaded, &expected);
}

#[test]
fn json_file_round_trips_progress() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).expect("open");
    round_trip(Arc::new(store));
}

#[test]
fn corrupt_file_loads_as_empty_progress() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).expect("open");
    store
        .set(storage::PROGRESS_KEY, r#"{"visitedSections": ["gallery""#)
        .unwrap();

    let progress = ProgressStore::new(Arc::new(store), fixed_clock());
    assert_eq!(progress.load(), ProgressState::new());
}

#[test]
fn clear_removes_snapshot() {
    let store = SqliteStore::open_in_memory().expect("open");
    let progress = ProgressStore::new(Arc::new(store), fixed_clock());
    progress.save(&populated_state());
    progress.clear().unwrap();
    assert!(progress.try_load().unwrap().is_none());
}
