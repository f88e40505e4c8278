use super::*;
use std::path::PathBuf;
use swarm_core::InactivityMode;

fn fresh_state(name: &str) -> RalphState {
    RalphState::new(name, 10, PathBuf::from("/tmp/prompt.md"), None, 60, InactivityMode::Output, None, Utc::now())
}

#[test]
fn pause_then_resume_round_trips_status() {
    let dir = tempfile::tempdir().unwrap();
    let ralph_store = RalphStore::open(dir.path(), "w1").unwrap();
    let log = IterationLog::open(ralph_store.dir());
    ralph_store.save(&fresh_state("w1")).unwrap();

    let paused = pause("w1", &ralph_store, &log).unwrap();
    assert_eq!(paused.status, RalphStatus::Paused);

    let resumed = resume("w1", &ralph_store).unwrap();
    assert_eq!(resumed.status, RalphStatus::Running);
}

#[test]
fn status_of_missing_worker_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let ralph_store = RalphStore::open(dir.path(), "ghost").unwrap();
    let err = status("ghost", &ralph_store).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn list_enumerates_every_ralph_worker() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = EngineConfig { state_dir: dir.path().to_path_buf(), tmux_socket: None };
    for name in ["a", "b"] {
        let store = RalphStore::open(&cfg.state_dir, name).unwrap();
        store.save(&fresh_state(name)).unwrap();
    }
    let states = list(&cfg).unwrap();
    let names: Vec<_> = states.iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn list_on_no_ralph_dir_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = EngineConfig { state_dir: dir.path().to_path_buf(), tmux_socket: None };
    assert!(list(&cfg).unwrap().is_empty());
}

#[test]
fn clean_removes_persisted_state() {
    let dir = tempfile::tempdir().unwrap();
    let ralph_store = RalphStore::open(dir.path(), "w1").unwrap();
    ralph_store.save(&fresh_state("w1")).unwrap();
    clean(&ralph_store).unwrap();
    assert!(ralph_store.load().is_none());
}

#[test]
fn logs_tail_returns_last_n_lines() {
    let dir = tempfile::tempdir().unwrap();
    let ralph_store = RalphStore::open(dir.path(), "w1").unwrap();
    let log = IterationLog::open(ralph_store.dir());
    for i in 0..3 {
        log.append(&IterationEvent::new(Utc::now(), IterationEventKind::Start, i, None::<String>)).unwrap();
    }
    let tail = logs(&log, Some(1)).unwrap();
    assert_eq!(tail.lines().count(), 1);
}
