use super::*;
use swarm_core::InactivityMode;

fn fresh() -> RalphState {
    RalphState::new(
        "alpha",
        10,
        PathBuf::from("PROMPT.md"),
        None,
        60,
        InactivityMode::Output,
        None,
        chrono::Utc::now(),
    )
}

#[test]
fn load_on_empty_store_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = RalphStore::open(dir.path(), "alpha").unwrap();
    assert!(store.load().is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = RalphStore::open(dir.path(), "alpha").unwrap();
    store.save(&fresh()).unwrap();

    let loaded = store.load().expect("present");
    assert_eq!(loaded.name, "alpha");
    assert_eq!(loaded.iteration, 1);
}

#[test]
fn mutate_applies_default_on_first_call() {
    let dir = tempfile::tempdir().unwrap();
    let store = RalphStore::open(dir.path(), "alpha").unwrap();

    let state = store.mutate(fresh, |s| s.iteration += 1).unwrap();
    assert_eq!(state.iteration, 2);

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.iteration, 2);
}

#[test]
fn corrupted_state_is_renamed_and_load_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = RalphStore::open(dir.path(), "alpha").unwrap();
    std::fs::write(store.dir().join("state.json"), b"{ not json").unwrap();

    assert!(store.load().is_none());
    assert!(store.dir().join("state.json.corrupted").exists());
}

#[test]
fn clean_removes_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = RalphStore::open(dir.path(), "alpha").unwrap();
    store.save(&fresh()).unwrap();
    assert!(store.dir().exists());

    store.clean().unwrap();
    assert!(!store.dir().exists());
}
